use thiserror::Error;

/// 巡检流程错误
#[derive(Debug, Error)]
pub enum InspectionError {
    #[error("current facility does not allow registering inspections")]
    PermissionDenied,
    #[error("image required")]
    MissingImage,
    #[error("label required")]
    MissingLabel,
    #[error("label longer than {0} characters")]
    LabelTooLong(usize),
    #[error("no inspection at index {0}")]
    IndexOutOfRange(usize),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<dam_storage::StorageError> for InspectionError {
    fn from(err: dam_storage::StorageError) -> Self {
        InspectionError::Storage(err.to_string())
    }
}
