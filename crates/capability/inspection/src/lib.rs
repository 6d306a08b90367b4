//! 例行巡检能力
//!
//! 巡检点是一张本地图片加标签；现场记录状态后批量上传，
//! 上传成功后条目保留图片和标签、清空状态，等待下一轮巡检。

pub mod error;
pub mod service;

pub use error::InspectionError;
pub use service::{
    InspectionService, MAX_LABEL_CHARS, RefreshOutcome, SendOutcome, encode_local_image,
};
