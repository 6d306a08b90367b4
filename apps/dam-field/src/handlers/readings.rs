//! 读数录入、查看、提交与清理

use crate::cli::RecordArgs;
use crate::{App, AppResult, today};
use dam_remote::InstrumentApi;
use dam_submission::{
    ReadingDraft, ReadingEntryService, RemoteBatchSender, SubmissionOrchestrator,
    SubmissionOutcome,
};
use domain::{InstrumentTemplate, ReadingBatch};
use std::sync::Arc;

fn find_template<'a>(
    templates: &'a [InstrumentTemplate],
    wanted: &str,
) -> Option<&'a InstrumentTemplate> {
    let wanted = wanted.trim();
    templates
        .iter()
        .find(|template| template.id == wanted)
        .or_else(|| {
            templates
                .iter()
                .find(|template| template.custom_name.eq_ignore_ascii_case(wanted))
        })
}

fn reading_date(date: Option<String>) -> AppResult<String> {
    let Some(date) = date else {
        return Ok(today());
    };
    chrono::NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date {}, expected YYYY-MM-DD", date))?;
    Ok(date.trim().to_string())
}

pub async fn record(app: &App, args: RecordArgs) -> AppResult {
    let date = reading_date(args.date)?;
    let ctx = app.online_context().await?;
    let templates = app.client.list_templates().await?;
    let template = find_template(&templates, &args.template)
        .ok_or_else(|| format!("template not found: {}", args.template))?;

    let draft = ReadingDraft {
        values: args.values.into_iter().collect(),
        notes: args.notes,
    };
    let outcome = ReadingEntryService::new(app.readings())
        .record(&ctx, template, &draft, &date)
        .await?;

    println!("Saved reading for {} ({}).", template.custom_name, outcome.reading.date);
    for (name, value) in &outcome.reading.values {
        println!("  {} = {}", name, value);
    }
    for warning in &outcome.warnings {
        println!(
            "  {} {}: {}",
            warning.warning.level, warning.parameter, warning.warning.message
        );
    }
    Ok(())
}

pub async fn pending(app: &App) -> AppResult {
    let ctx = app.local_context().await?;
    let batch = ReadingBatch::new(app.readings().load_all(&ctx).await?);
    if batch.is_empty() {
        println!("No saved readings for {}.", ctx.facility_name);
        return Ok(());
    }
    println!("{}: {} saved reading(s)", ctx.facility_name, batch.len());
    print!("{}", render_by_date(&batch));
    Ok(())
}

/// 按日期分组的待提交读数文本。
fn render_by_date(batch: &ReadingBatch) -> String {
    let mut out = String::new();
    for (date, readings) in batch.by_date() {
        out.push_str(&format!("\n{}\n", date));
        for reading in readings {
            out.push_str(&format!(
                "  {} [{}]\n",
                reading.custom_name, reading.instrument_type_name
            ));
            for (name, value) in &reading.values {
                out.push_str(&format!("    {} = {}\n", name, value));
            }
            if !reading.notes.is_empty() {
                out.push_str(&format!("    notes: {}\n", reading.notes));
            }
        }
    }
    out
}

pub async fn submit(app: &App) -> AppResult {
    let ctx = app.online_context().await?;
    let templates = app.client.list_templates().await?;
    let orchestrator = SubmissionOrchestrator::new(
        app.readings(),
        Arc::new(RemoteBatchSender::new(app.client.clone())),
        app.notifier.clone(),
        app.confirmer.clone(),
    )
    .with_clear_policy(app.clear_policy);

    match orchestrator.submit(&ctx, &templates).await {
        SubmissionOutcome::Failed { message } => Err(message.into()),
        SubmissionOutcome::SentWithoutClearing { message, .. } => Err(message.into()),
        outcome => {
            tracing::debug!(?outcome, "submission finished");
            Ok(())
        }
    }
}

pub async fn clear(app: &App, all: bool) -> AppResult {
    let readings = app.readings();
    if all {
        if !app
            .confirmer
            .confirm("Delete readings", "Delete saved readings of every facility?")
        {
            return Ok(());
        }
        let cleared = readings.clear_all().await?;
        println!("Removed {} reading key(s).", cleared);
        return Ok(());
    }

    let ctx = app.local_context().await?;
    let message = format!("Delete saved readings of {}?", ctx.facility_name);
    if !app.confirmer.confirm("Delete readings", &message) {
        return Ok(());
    }
    let cleared = readings.clear_facility(&ctx).await?;
    println!("Removed {} reading key(s) for {}.", cleared, ctx.facility_name);
    Ok(())
}
