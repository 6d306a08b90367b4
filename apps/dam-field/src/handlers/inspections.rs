//! 例行巡检命令

use crate::cli::InspectionCommand;
use crate::{App, AppResult, today};
use dam_inspection::{RefreshOutcome, SendOutcome};
use domain::{InspectionImage, InspectionStatus, NotInspectedReason};

pub async fn run(app: &App, command: InspectionCommand) -> AppResult {
    let service = app.inspections();
    match command {
        InspectionCommand::List => {
            let ctx = app.local_context().await?;
            let images = service.list(&ctx).await?;
            if images.is_empty() {
                println!("No inspections for {}.", ctx.facility_name);
            }
            for (index, image) in images.iter().enumerate() {
                println!("{}. {}", index + 1, describe(image));
            }
        }
        InspectionCommand::Register { image, label } => {
            let ctx = app.local_context().await?;
            let uri = image_uri(&image)?;
            let image = service.register(&ctx, &uri, &label).await?;
            println!("Registered {}.", image.label);
        }
        InspectionCommand::Status {
            number,
            status,
            reason,
        } => {
            let ctx = app.local_context().await?;
            let status = InspectionStatus::parse(&status)
                .ok_or_else(|| format!("unknown status: {}", status))?;
            let reason = reason
                .map(|reason| {
                    NotInspectedReason::parse(&reason)
                        .ok_or_else(|| format!("unknown reason: {}", reason))
                })
                .transpose()?;
            let image = service
                .record_status(&ctx, to_index(number), status, reason, &today())
                .await?;
            println!("{}", describe(&image));
        }
        InspectionCommand::Image { number, image } => {
            let ctx = app.local_context().await?;
            let uri = image_uri(&image)?;
            let image = service.replace_image(&ctx, to_index(number), &uri).await?;
            println!("{}", describe(&image));
        }
        InspectionCommand::Delete { number } => {
            let ctx = app.local_context().await?;
            if service.delete(&ctx, to_index(number)).await? {
                println!("Inspection {} deleted.", number);
            }
        }
        InspectionCommand::Clear => {
            let ctx = app.local_context().await?;
            if app.confirmer.confirm(
                "Delete inspections",
                &format!("Delete every local inspection of {}?", ctx.facility_name),
            ) {
                service.clear_local(&ctx).await?;
                println!("Local inspections deleted.");
            }
        }
        InspectionCommand::Refresh => {
            let ctx = app.online_context().await?;
            match service.refresh_from_remote(&ctx).await {
                RefreshOutcome::Refreshed { count } => println!("{} inspection(s) loaded.", count),
                RefreshOutcome::AlreadyInProgress => {}
                RefreshOutcome::Failed { message } => return Err(message.into()),
            }
        }
        InspectionCommand::Send => {
            let ctx = app.online_context().await?;
            match service.send(&ctx).await {
                SendOutcome::Failed { message } => return Err(message.into()),
                outcome => tracing::debug!(?outcome, "inspection upload finished"),
            }
        }
    }
    Ok(())
}

fn to_index(number: u64) -> usize {
    number.saturating_sub(1) as usize
}

/// 本地路径转为 `file://` uri；已有 scheme 的保持不变。
fn image_uri(input: &str) -> AppResult<String> {
    let input = input.trim();
    if input.contains("://") || input.starts_with("data:") {
        return Ok(input.to_string());
    }
    let path = std::path::absolute(input)?;
    Ok(format!("file://{}", path.display()))
}

fn describe(image: &InspectionImage) -> String {
    let mut line = image.label.clone();
    match image.status {
        Some(status) => line.push_str(&format!("  [{}]", status)),
        None => line.push_str("  [not reviewed]"),
    }
    if let Some(reason) = image.not_inspected_reason {
        line.push_str(&format!(" {}", reason));
    }
    if let Some(date) = &image.date {
        line.push_str(&format!("  {}", date));
    }
    if !image.uri.starts_with("data:") {
        line.push_str(&format!("  {}", image.uri));
    }
    line
}
