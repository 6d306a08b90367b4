//! 本地持久化的 JSON 结构
//!
//! 字段名与移动端历史数据保持一致（camelCase），便于迁移已有存储。

use domain::{InspectionImage, InspectionStatus, NotInspectedReason, PendingReading};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 设施读数键的值：`{"readings": [...]}`
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct StoredReadings {
    #[serde(default)]
    pub readings: Vec<StoredReading>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredReading {
    pub instrument_template_id: String,
    #[serde(default)]
    pub instrument_type_id: String,
    #[serde(default)]
    pub instrument_type_name: String,
    #[serde(default)]
    pub custom_name: String,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub date: String,
}

impl From<&PendingReading> for StoredReading {
    fn from(reading: &PendingReading) -> Self {
        Self {
            instrument_template_id: reading.instrument_template_id.clone(),
            instrument_type_id: reading.instrument_type_id.clone(),
            instrument_type_name: reading.instrument_type_name.clone(),
            custom_name: reading.custom_name.clone(),
            values: reading.values.clone(),
            notes: reading.notes.clone(),
            date: reading.date.clone(),
        }
    }
}

impl From<StoredReading> for PendingReading {
    fn from(stored: StoredReading) -> Self {
        Self {
            instrument_template_id: stored.instrument_template_id,
            instrument_type_id: stored.instrument_type_id,
            instrument_type_name: stored.instrument_type_name,
            custom_name: stored.custom_name,
            values: stored.values,
            notes: stored.notes,
            date: stored.date,
        }
    }
}

/// 巡检键的值为数组，状态与原因以后端标签保存。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredInspection {
    pub uri: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_inspected_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl From<&InspectionImage> for StoredInspection {
    fn from(image: &InspectionImage) -> Self {
        Self {
            uri: image.uri.clone(),
            label: image.label.clone(),
            status: image.status.map(|status| status.as_wire().to_string()),
            not_inspected_reason: image
                .not_inspected_reason
                .map(|reason| reason.as_wire().to_string()),
            date: image.date.clone(),
        }
    }
}

impl From<StoredInspection> for InspectionImage {
    fn from(stored: StoredInspection) -> Self {
        Self {
            uri: stored.uri,
            label: stored.label,
            status: stored
                .status
                .as_deref()
                .filter(|value| !value.is_empty())
                .and_then(InspectionStatus::from_wire),
            not_inspected_reason: stored
                .not_inspected_reason
                .as_deref()
                .and_then(NotInspectedReason::from_wire),
            date: stored.date.filter(|value| !value.is_empty()),
        }
    }
}
