//! 待提交读数与提交批次。

use crate::error::DomainError;
use crate::instrument::{InstrumentTemplate, ParameterId};
use std::collections::BTreeMap;

/// 按参数 id 组织的读数值，构造时对照模板声明的参数集合校验。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingValues {
    values: BTreeMap<ParameterId, String>,
}

impl ReadingValues {
    /// 以模板校验后构造；未声明的参数 id 返回错误。
    pub fn for_template(
        template: &InstrumentTemplate,
        entries: impl IntoIterator<Item = (ParameterId, String)>,
    ) -> Result<Self, DomainError> {
        let mut values = BTreeMap::new();
        for (id, value) in entries {
            if template.parameter(&id).is_none() {
                return Err(DomainError::UnknownParameter {
                    template_id: template.id.clone(),
                    parameter: id.to_string(),
                });
            }
            values.insert(id, value);
        }
        Ok(Self { values })
    }

    /// 从按参数名存储的映射恢复；模板中不存在的名称被忽略。
    pub fn from_named(template: &InstrumentTemplate, named: &BTreeMap<String, String>) -> Self {
        let values = template
            .parameters
            .iter()
            .filter_map(|param| {
                named
                    .get(&param.name)
                    .map(|value| (param.id.clone(), value.clone()))
            })
            .collect();
        Self { values }
    }

    /// 转换为按参数名组织的映射（存储与传输格式）。
    pub fn to_named(&self, template: &InstrumentTemplate) -> BTreeMap<String, String> {
        template
            .parameters
            .iter()
            .filter_map(|param| {
                self.values
                    .get(&param.id)
                    .map(|value| (param.name.clone(), value.clone()))
            })
            .collect()
    }

    pub fn get(&self, id: &ParameterId) -> Option<&str> {
        self.values.get(id).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParameterId, &str)> {
        self.values.iter().map(|(id, value)| (id, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// 本地保存、尚未提交的一条读数。
///
/// 标识为 (设施, instrument_template_id)：同一模板的后一次保存覆盖前一次。
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReading {
    pub instrument_template_id: String,
    pub instrument_type_id: String,
    pub instrument_type_name: String,
    pub custom_name: String,
    /// 参数名 -> 输入文本（未标准化）。
    pub values: BTreeMap<String, String>,
    pub notes: String,
    /// ISO 日期，YYYY-MM-DD。
    pub date: String,
}

impl PendingReading {
    /// 由模板与校验后的读数值构造。
    pub fn from_template(
        template: &InstrumentTemplate,
        values: &ReadingValues,
        notes: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            instrument_template_id: template.id.clone(),
            instrument_type_id: template.instrument_type.domain_id.clone(),
            instrument_type_name: template.instrument_type.name.clone(),
            custom_name: template.custom_name.clone(),
            values: values.to_named(template),
            notes: notes.into(),
            date: date.into(),
        }
    }

    /// 没有任何值且备注为空的读数视为空读数，不保存也不提交。
    pub fn is_empty(&self) -> bool {
        self.values.values().all(|value| value.trim().is_empty()) && self.notes.trim().is_empty()
    }
}

/// 一次提交的读数批次（值已标准化）。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingBatch {
    pub readings: Vec<PendingReading>,
}

impl ReadingBatch {
    pub fn new(readings: Vec<PendingReading>) -> Self {
        Self { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// 按日期分组（日期升序，组内保持原顺序）。
    pub fn by_date(&self) -> BTreeMap<&str, Vec<&PendingReading>> {
        let mut groups: BTreeMap<&str, Vec<&PendingReading>> = BTreeMap::new();
        for reading in &self.readings {
            groups.entry(reading.date.as_str()).or_default().push(reading);
        }
        groups
    }

    pub fn template_ids(&self) -> Vec<&str> {
        self.readings
            .iter()
            .map(|reading| reading.instrument_template_id.as_str())
            .collect()
    }
}
