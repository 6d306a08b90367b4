//! 子命令处理

pub mod admin;
pub mod facilities;
pub mod inspections;
pub mod readings;

use crate::cli::Command;
use crate::{App, AppResult};

pub async fn dispatch(app: &App, command: Command) -> AppResult {
    match command {
        Command::Facilities => facilities::list(app).await,
        Command::Templates { type_id } => admin::templates(app, type_id.as_deref()).await,
        Command::Types => admin::types(app).await,
        Command::Record(args) => readings::record(app, args).await,
        Command::Pending => readings::pending(app).await,
        Command::Submit => readings::submit(app).await,
        Command::Clear { all } => readings::clear(app, all).await,
        Command::TemplateAdd(args) => admin::template_add(app, args).await,
        Command::TemplateImport { path } => admin::template_import(app, &path).await,
        Command::Inspections(command) => inspections::run(app, command).await,
    }
}
