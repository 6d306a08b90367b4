//! 设施列表

use crate::{App, AppResult};

pub async fn list(app: &App) -> AppResult {
    let dams = app
        .auth()
        .available_facilities(&app.credentials.email, &app.credentials.password)
        .await?;
    if dams.is_empty() {
        println!("No facilities available.");
    }
    for dam in &dams {
        match &dam.company_name {
            Some(company) => println!("{}  {} ({})", dam.domain_id, dam.name, company),
            None => println!("{}  {}", dam.domain_id, dam.name),
        }
    }
    Ok(())
}
