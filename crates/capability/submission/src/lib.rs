//! 读数提交能力
//!
//! - `entry`：录入并按模板覆盖保存
//! - `completeness`：未覆盖模板检查
//! - `orchestrator`：批量提交状态机

pub mod completeness;
pub mod entry;
pub mod error;
pub mod orchestrator;

pub use completeness::missing_instruments;
pub use entry::{ParameterWarning, ReadingDraft, ReadingEntryService, RecordOutcome, RestoredReading};
pub use error::SubmissionError;
pub use orchestrator::{
    BatchSender, ClearPolicy, RemoteBatchSender, SubmissionOrchestrator, SubmissionOutcome,
    SubmissionState,
};
