//! 远端 API 客户端能力
//!
//! - `api`：流程层依赖的 trait（AccountApi / InstrumentApi / RoutineApi）
//! - `client`：reqwest 实现，Bearer token + x-request-id
//! - `convert`：DTO 与领域模型互转
//! - `error`：RemoteError

pub mod api;
pub mod client;
pub mod convert;
pub mod error;

pub use api::{AccountApi, InstrumentApi, RoutineApi, TemplateFile};
pub use client::HttpApiClient;
pub use error::RemoteError;
