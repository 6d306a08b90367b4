pub mod error;
pub mod inspection;
pub mod instrument;
pub mod interaction;
pub mod reading;

pub use error::DomainError;
pub use inspection::{InspectionImage, InspectionStatus, NotInspectedReason};
pub use instrument::{
    Dam, InstrumentParameter, InstrumentTemplate, InstrumentType, NewInstrumentTemplate,
    NewParameter, ParameterId,
};
pub use interaction::{Confirmer, Notice, NoticeKind, Notifier};
pub use reading::{PendingReading, ReadingBatch, ReadingValues};

/// 设施上下文：所有本地数据按设施（大坝）分区。
#[derive(Debug, Clone)]
pub struct FacilityContext {
    pub facility_name: String,
    pub can_register_inspections: bool,
}

impl FacilityContext {
    /// 构造显式设施名与巡检登记权限的上下文。
    pub fn new(facility_name: impl Into<String>, can_register_inspections: bool) -> Self {
        Self {
            facility_name: facility_name.into(),
            can_register_inspections,
        }
    }
}

impl Default for FacilityContext {
    /// 空上下文（仅用于测试或占位）。
    fn default() -> Self {
        Self {
            facility_name: "".to_string(),
            can_register_inspections: false,
        }
    }
}
