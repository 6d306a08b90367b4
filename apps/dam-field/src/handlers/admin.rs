//! 仪器模板与类型管理

use crate::cli::TemplateAddArgs;
use crate::{App, AppResult};
use dam_remote::{InstrumentApi, TemplateFile};
use domain::instrument::{distinct_types, templates_of_type};
use domain::{InstrumentTemplate, NewInstrumentTemplate};
use std::path::Path;

pub async fn templates(app: &App, type_id: Option<&str>) -> AppResult {
    let ctx = app.online_context().await?;
    let templates = app.client.list_templates().await?;
    let selected: Vec<&InstrumentTemplate> = match type_id {
        Some(type_id) => templates_of_type(&templates, type_id),
        None => templates.iter().collect(),
    };
    println!("{}: {} template(s)", ctx.facility_name, selected.len());
    for instrument_type in distinct_types(&templates) {
        let group: Vec<_> = selected
            .iter()
            .filter(|template| template.instrument_type.domain_id == instrument_type.domain_id)
            .collect();
        if group.is_empty() {
            continue;
        }
        println!("\n{} ({})", instrument_type.name, instrument_type.domain_id);
        for template in group {
            println!("  {}  {}", template.id, template.custom_name);
            for parameter in &template.parameters {
                println!(
                    "    {}  attention: {}  alert: {}",
                    parameter.name,
                    display_threshold(&parameter.attention_value),
                    display_threshold(&parameter.alert_value)
                );
            }
        }
    }
    Ok(())
}

fn display_threshold(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}

pub async fn types(app: &App) -> AppResult {
    app.online_context().await?;
    let types = app.client.list_instrument_types().await?;
    if types.is_empty() {
        println!("No instrument types.");
    }
    for instrument_type in &types {
        let units = instrument_type.measurement_units.join(", ");
        println!("{}  {}  [{}]", instrument_type.domain_id, instrument_type.name, units);
    }
    Ok(())
}

pub async fn template_add(app: &App, args: TemplateAddArgs) -> AppResult {
    app.online_context().await?;
    let template = NewInstrumentTemplate {
        instrument_type_id: args.type_id,
        custom_name: args.name,
        parameters: args.parameters,
    };
    app.client.create_template(&template).await?;
    tracing::info!(name = %template.custom_name, "template created");
    println!("Template {} created.", template.custom_name);
    Ok(())
}

pub async fn template_import(app: &App, path: &Path) -> AppResult {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| format!("not a file: {}", path.display()))?;
    let bytes = tokio::fs::read(path).await?;
    let file = TemplateFile::from_bytes(name, bytes)
        .ok_or_else(|| format!("unsupported file type {}, expected .csv or .xlsx", path.display()))?;

    app.online_context().await?;
    app.client.import_templates(file).await?;
    tracing::info!(path = %path.display(), "templates imported");
    println!("Templates imported from {}.", path.display());
    Ok(())
}
