//! 本地存储层
//!
//! 离线采集的读数与巡检按设施分区保存在键值存储中，提交成功前不丢失。
//!
//! 后端：
//! - JsonFileKeyValueStore：默认，单文件 JSON
//! - InMemoryKeyValueStore：测试与临时会话
//! - RedisKeyValueStore：共享调试环境
//!
//! 仓库：
//! - KvReadingRepository：待提交读数
//! - KvInspectionRepository：巡检图片
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use dam_storage::{JsonFileKeyValueStore, KvReadingRepository, ReadingRepository};
//! use domain::FacilityContext;
//! use std::sync::Arc;
//!
//! let store = Arc::new(JsonFileKeyValueStore::open("dam-field-store.json").await?);
//! let readings = KvReadingRepository::new(store);
//! let ctx = FacilityContext::new("Barragem Norte", false);
//! let pending = readings.load_all(&ctx).await?;
//! ```
//!
//! ## 设计约束
//!
//! - 仓库方法显式接收 `FacilityContext`，空设施名直接拒绝
//! - 同一设施同一模板只保留最后一次保存的读数
//! - 无法解析的存储值按空处理，不报错

pub mod error;
pub mod file;
pub mod in_memory;
pub mod inspections;
pub mod keys;
mod models;
pub mod readings;
pub mod redis;
pub mod traits;

pub use error::StorageError;
pub use file::JsonFileKeyValueStore;
pub use in_memory::InMemoryKeyValueStore;
pub use inspections::KvInspectionRepository;
pub use keys::{
    INSPECTION_KEY_PREFIX, READING_KEY_PREFIX, READING_KEY_ROOT, READING_KEY_SEPARATOR,
    inspection_key, is_facility_reading_key, reading_key,
};
pub use readings::KvReadingRepository;
pub use self::redis::RedisKeyValueStore;
pub use traits::{InspectionRepository, KeyValueStore, ReadingRepository};
