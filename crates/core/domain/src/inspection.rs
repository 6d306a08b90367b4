//! 例行巡检（图片）模型。

/// 巡检状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectionStatus {
    Unchanged,
    Decreased,
    Increased,
    New,
    NotInspected,
}

impl InspectionStatus {
    pub const ALL: [InspectionStatus; 5] = [
        InspectionStatus::Unchanged,
        InspectionStatus::Decreased,
        InspectionStatus::Increased,
        InspectionStatus::New,
        InspectionStatus::NotInspected,
    ];

    /// 后端存储的状态标签。
    pub fn as_wire(&self) -> &'static str {
        match self {
            InspectionStatus::Unchanged => "Permaneceu Constante",
            InspectionStatus::Decreased => "Diminuiu",
            InspectionStatus::Increased => "Aumentou",
            InspectionStatus::New => "Nova",
            InspectionStatus::NotInspected => "Não Inspecionado",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_wire() == value)
    }

    /// 接受显示名（不区分大小写、忽略空格）或后端标签。
    pub fn parse(value: &str) -> Option<Self> {
        let compact: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.to_string().replace(' ', "").to_ascii_lowercase() == compact)
            .or_else(|| Self::from_wire(value))
    }
}

impl std::fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InspectionStatus::Unchanged => "Unchanged",
            InspectionStatus::Decreased => "Decreased",
            InspectionStatus::Increased => "Increased",
            InspectionStatus::New => "New",
            InspectionStatus::NotInspected => "Not Inspected",
        };
        f.write_str(name)
    }
}

/// 未巡检原因，仅在状态为 NotInspected 时有效。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotInspectedReason {
    AccessImpossible,
    HealthAndSafety,
}

impl NotInspectedReason {
    pub const ALL: [NotInspectedReason; 2] = [
        NotInspectedReason::AccessImpossible,
        NotInspectedReason::HealthAndSafety,
    ];

    pub fn as_wire(&self) -> &'static str {
        match self {
            NotInspectedReason::AccessImpossible => "Impossibilidade de acesso",
            NotInspectedReason::HealthAndSafety => "Saúde e Segurança do Trabalho",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|reason| reason.as_wire() == value)
    }

    pub fn parse(value: &str) -> Option<Self> {
        let compact: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "access" | "accessimpossible" => Some(NotInspectedReason::AccessImpossible),
            "health" | "safety" | "healthsafety" | "healthandsafety" => {
                Some(NotInspectedReason::HealthAndSafety)
            }
            _ => Self::from_wire(value),
        }
    }
}

impl std::fmt::Display for NotInspectedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotInspectedReason::AccessImpossible => f.write_str("Access impossible"),
            NotInspectedReason::HealthAndSafety => f.write_str("Health & safety"),
        }
    }
}

/// 一个巡检点：本地图片引用、标签、状态与日期。
#[derive(Debug, Clone, PartialEq)]
pub struct InspectionImage {
    pub uri: String,
    pub label: String,
    pub status: Option<InspectionStatus>,
    pub not_inspected_reason: Option<NotInspectedReason>,
    pub date: Option<String>,
}

impl InspectionImage {
    /// 新登记的巡检点：状态 New，无日期。
    pub fn registered(uri: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            label: label.into(),
            status: Some(InspectionStatus::New),
            not_inspected_reason: None,
            date: None,
        }
    }

    /// 设置状态；原因只在 NotInspected 时保留。
    pub fn set_status(
        &mut self,
        status: InspectionStatus,
        reason: Option<NotInspectedReason>,
        date: impl Into<String>,
    ) {
        self.status = Some(status);
        self.not_inspected_reason = match status {
            InspectionStatus::NotInspected => reason,
            _ => None,
        };
        self.date = Some(date.into());
    }

    /// 上传成功后复位为仅保留图片和标签。
    pub fn reset(&mut self) {
        self.status = None;
        self.not_inspected_reason = None;
        self.date = None;
    }

    pub fn is_reviewed(&self) -> bool {
        self.status.is_some()
    }
}
