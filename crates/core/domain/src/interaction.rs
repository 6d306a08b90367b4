//! 用户交互接口：提示与确认。
//!
//! 流程只依赖这两个接口，界面实现（终端、测试桩）由调用方注入。

/// 提示级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// 面向用户的阻塞提示。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(NoticeKind::Info, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(NoticeKind::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(NoticeKind::Error, title, message)
    }

    fn with_kind(kind: NoticeKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// 提示输出。
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// 是/否确认。
pub trait Confirmer: Send + Sync {
    fn confirm(&self, title: &str, message: &str) -> bool;
}
