/// 远端调用错误。
///
/// `Api` 的显示文本就是从响应体提取出的错误信息，可直接展示给用户。
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("response missing result")]
    MissingResult,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RemoteError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        RemoteError::Transport(err.to_string())
    }
}
