use dam_storage::StorageError;
use domain::DomainError;

/// 读数录入错误。
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("reading has no values or notes")]
    EmptyReading,
    #[error("invalid reading: {0}")]
    Domain(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<DomainError> for SubmissionError {
    fn from(err: DomainError) -> Self {
        SubmissionError::Domain(err.to_string())
    }
}

impl From<StorageError> for SubmissionError {
    fn from(err: StorageError) -> Self {
        SubmissionError::Storage(err.to_string())
    }
}
