//! 领域构造错误

/// 领域对象构造时的校验错误。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 参数 id 不属于该仪器模板。
    UnknownParameter { template_id: String, parameter: String },
    /// 参数名不属于该仪器模板。
    UnknownParameterName { template_id: String, name: String },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::UnknownParameter {
                template_id,
                parameter,
            } => write!(
                f,
                "parameter {} is not declared by template {}",
                parameter, template_id
            ),
            DomainError::UnknownParameterName { template_id, name } => write!(
                f,
                "parameter named {} is not declared by template {}",
                name, template_id
            ),
        }
    }
}

impl std::error::Error for DomainError {}
