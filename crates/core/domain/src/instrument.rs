//! 仪器模板与参数定义。
//!
//! 模板只在服务端持久化，每次会话拉取；录入流程只读。

use std::collections::HashSet;

/// 参数标识（服务端 domainId）。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParameterId(String);

impl ParameterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParameterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 仪器类型（如测压管）。
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentType {
    pub domain_id: String,
    pub name: String,
    pub measurement_units: Vec<String>,
}

/// 模板下的可测量参数。
///
/// 阈值保持文本形式；alert 与 attention 各自独立比较，不强制 alert > attention。
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentParameter {
    pub id: ParameterId,
    pub name: String,
    pub attention_value: String,
    pub alert_value: String,
}

/// 仪器模板：设施上的一个监测点。
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentTemplate {
    pub id: String,
    pub custom_name: String,
    pub instrument_type: InstrumentType,
    pub parameters: Vec<InstrumentParameter>,
}

impl InstrumentTemplate {
    /// 按参数 id 查找。
    pub fn parameter(&self, id: &ParameterId) -> Option<&InstrumentParameter> {
        self.parameters.iter().find(|param| &param.id == id)
    }

    /// 按参数名查找。
    pub fn parameter_by_name(&self, name: &str) -> Option<&InstrumentParameter> {
        self.parameters.iter().find(|param| param.name == name)
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }
}

/// 模板列表中出现过的仪器类型（按首次出现顺序去重）。
pub fn distinct_types(templates: &[InstrumentTemplate]) -> Vec<&InstrumentType> {
    let mut seen = HashSet::new();
    templates
        .iter()
        .filter(|template| seen.insert(template.instrument_type.domain_id.as_str()))
        .map(|template| &template.instrument_type)
        .collect()
}

/// 指定类型下的全部模板。
pub fn templates_of_type<'a>(
    templates: &'a [InstrumentTemplate],
    type_id: &str,
) -> Vec<&'a InstrumentTemplate> {
    templates
        .iter()
        .filter(|template| template.instrument_type.domain_id == type_id)
        .collect()
}

/// 新建模板的参数输入（阈值为用户输入文本）。
#[derive(Debug, Clone, PartialEq)]
pub struct NewParameter {
    pub name: String,
    pub attention_value: String,
    pub alert_value: String,
}

/// 管理端新建模板输入。
#[derive(Debug, Clone, PartialEq)]
pub struct NewInstrumentTemplate {
    pub instrument_type_id: String,
    pub custom_name: String,
    pub parameters: Vec<NewParameter>,
}

/// 当前账号可选择的设施。
#[derive(Debug, Clone, PartialEq)]
pub struct Dam {
    pub domain_id: String,
    pub name: String,
    pub company_name: Option<String>,
}
