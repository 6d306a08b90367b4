//! 远端 API 接口
//!
//! 流程层只依赖这些 trait，测试中用内存实现替换 HTTP 客户端。

use crate::error::RemoteError;
use api_contract::{RoutineDto, RoutineUploadDto};
use async_trait::async_trait;
use domain::{Dam, InstrumentTemplate, InstrumentType, NewInstrumentTemplate, ReadingBatch};

/// 待导入的模板文件（CSV 或 XLSX）。
#[derive(Debug, Clone)]
pub struct TemplateFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl TemplateFile {
    /// 按扩展名推断 MIME；不支持的扩展名返回 None。
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Option<Self> {
        let name = name.into();
        let lower = name.to_ascii_lowercase();
        let mime = if lower.ends_with(".csv") {
            "text/csv"
        } else if lower.ends_with(".xlsx") {
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        } else {
            return None;
        };
        Some(Self {
            name,
            mime: mime.to_string(),
            bytes,
        })
    }
}

/// 账号与设施选择。
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// 登录，返回并持有 token。
    async fn authenticate(&self, email: &str, password: &str) -> Result<String, RemoteError>;

    async fn list_dams(&self) -> Result<Vec<Dam>, RemoteError>;

    /// 确认设施，返回并持有带设施 claims 的新 token。
    async fn confirm_client(&self, dam_id: &str) -> Result<String, RemoteError>;
}

/// 仪器模板与读数。
#[async_trait]
pub trait InstrumentApi: Send + Sync {
    async fn list_templates(&self) -> Result<Vec<InstrumentTemplate>, RemoteError>;

    async fn list_instrument_types(&self) -> Result<Vec<InstrumentType>, RemoteError>;

    async fn create_template(&self, template: &NewInstrumentTemplate) -> Result<(), RemoteError>;

    async fn import_templates(&self, file: TemplateFile) -> Result<(), RemoteError>;

    /// 单次提交整批读数，不重试。
    async fn send_readings(&self, batch: &ReadingBatch) -> Result<(), RemoteError>;
}

/// 例行巡检。
#[async_trait]
pub trait RoutineApi: Send + Sync {
    async fn list_routines(&self) -> Result<Vec<RoutineDto>, RemoteError>;

    async fn create_routines(&self, routines: Vec<RoutineUploadDto>) -> Result<(), RemoteError>;
}
