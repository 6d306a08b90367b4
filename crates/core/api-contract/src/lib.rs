//! 远端 API 的 DTO 与响应契约。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 非 2xx 且响应体无可用信息时的默认错误信息。
pub const DEFAULT_ERROR_MESSAGE: &str = "request failed";

/// 标准 API 响应封装。
///
/// 不同接口把数据放在 `result` 或 `value` 中。
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: Option<bool>,
    pub result: Option<T>,
    pub value: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// 取出载荷，优先 `result`。
    pub fn into_payload(self) -> Option<T> {
        self.result.or(self.value)
    }
}

/// 从失败响应体中提取一条可读的错误信息。
///
/// 优先级：`errors[].message`（换行拼接）> `message` > 原始文本 > `detail` > 默认信息。
pub fn error_message(body: &str) -> String {
    let parsed = if body.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
    };

    if let Some(errors) = parsed.get("errors").and_then(Value::as_array) {
        return errors
            .iter()
            .map(|item| {
                item.get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n");
    }
    if let Some(message) = parsed.get("message").and_then(Value::as_str) {
        return message.to_string();
    }
    if let Value::String(raw) = &parsed {
        return raw.clone();
    }
    if let Some(detail) = parsed.get("detail").and_then(Value::as_str) {
        return detail.to_string();
    }
    DEFAULT_ERROR_MESSAGE.to_string()
}

/// 阈值等字段在服务端可能是字符串或数字，统一读成文本。
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

/// 登录请求体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    pub email: String,
    pub password: String,
}

/// 可选设施（大坝）。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamDto {
    pub domain_id: String,
    pub name: String,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// 计量单位。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeasurementUnitDto {
    #[serde(default)]
    pub name: String,
}

/// 仪器类型与计量单位的关联。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentTypeMeasurementUnitDto {
    #[serde(default)]
    pub measurement_unit: MeasurementUnitDto,
}

/// 仪器类型。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentTypeDto {
    pub domain_id: String,
    pub name: String,
    #[serde(default)]
    pub measurement_units: Vec<InstrumentTypeMeasurementUnitDto>,
}

/// 模板参数。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateParameterDto {
    pub domain_id: String,
    pub parameter_name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub attention_value: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub alert_value: String,
}

/// 仪器模板。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentTemplateDto {
    pub domain_id: String,
    pub custom_name: String,
    pub instrument_type: InstrumentTypeDto,
    #[serde(default)]
    pub client_instrument_template_parameter: Vec<TemplateParameterDto>,
}

/// 新建模板的参数。阈值无法解析时发送 null。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateParameterDto {
    pub measurement_unit: u32,
    pub alert_value: Option<f64>,
    pub attention_value: Option<f64>,
    pub parameter_name: String,
}

/// 新建模板请求体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    pub instrument_type_domain_id: String,
    pub custom_name: String,
    pub client_instrument_template_parameter: Vec<CreateTemplateParameterDto>,
}

/// 读数条目（提交与本地存储共用此形状）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingEntryDto {
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

/// 读数批量提交请求体。
#[derive(Debug, Serialize)]
pub struct SendReadingsRequest {
    pub readings: Vec<ReadingEntryDto>,
}

/// 服务端返回的巡检记录。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineDto {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
}

/// 巡检上传条目。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineUploadDto {
    pub label: String,
    pub image_base64: String,
    pub status: Option<String>,
    pub not_inspected_reason: Option<String>,
    pub date: Option<String>,
}

/// 巡检上传请求体。
#[derive(Debug, Serialize)]
pub struct CreateRoutineRequest {
    pub routines: Vec<RoutineUploadDto>,
}
