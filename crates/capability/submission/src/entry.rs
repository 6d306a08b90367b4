//! 读数录入：清洗、格式化、校验后按模板覆盖保存。

use crate::error::SubmissionError;
use dam_normalize::{ThresholdWarning, check_thresholds, format_for_display, sanitize_input};
use dam_storage::ReadingRepository;
use domain::{
    DomainError, FacilityContext, InstrumentTemplate, ParameterId, PendingReading, ReadingValues,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 一次录入的原始输入；键可以是参数名或参数 id。
#[derive(Debug, Clone, Default)]
pub struct ReadingDraft {
    pub values: BTreeMap<String, String>,
    pub notes: String,
}

/// 超阈值的参数。
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterWarning {
    pub parameter: String,
    pub warning: ThresholdWarning,
}

/// 保存结果。
#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub reading: PendingReading,
    pub warnings: Vec<ParameterWarning>,
}

/// 已保存读数在录入界面的恢复形态。
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredReading {
    pub template_id: String,
    pub values: ReadingValues,
    pub notes: String,
    pub date: String,
}

/// 读数录入服务
pub struct ReadingEntryService {
    readings: Arc<dyn ReadingRepository>,
}

impl ReadingEntryService {
    pub fn new(readings: Arc<dyn ReadingRepository>) -> Self {
        Self { readings }
    }

    /// 保存一个模板的读数（同模板覆盖），返回超阈值提示。
    pub async fn record(
        &self,
        ctx: &FacilityContext,
        template: &InstrumentTemplate,
        draft: &ReadingDraft,
        date: &str,
    ) -> Result<RecordOutcome, SubmissionError> {
        let mut entries = Vec::new();
        for (key, raw) in &draft.values {
            let parameter = template
                .parameter(&ParameterId::new(key.as_str()))
                .or_else(|| template.parameter_by_name(key))
                .ok_or_else(|| DomainError::UnknownParameterName {
                    template_id: template.id.clone(),
                    name: key.clone(),
                })?;
            let value = format_for_display(&sanitize_input(raw));
            if value.is_empty() {
                continue;
            }
            entries.push((parameter.id.clone(), value));
        }
        let values = ReadingValues::for_template(template, entries)?;
        let reading = PendingReading::from_template(template, &values, draft.notes.trim(), date);
        if reading.is_empty() {
            return Err(SubmissionError::EmptyReading);
        }

        self.readings
            .upsert(ctx, std::slice::from_ref(&reading))
            .await?;
        dam_telemetry::record_readings_saved(1);
        tracing::info!(
            facility = %ctx.facility_name,
            template = %template.id,
            values = values.len(),
            "reading saved"
        );

        let warnings = values
            .iter()
            .filter_map(|(id, value)| {
                let parameter = template.parameter(id)?;
                check_thresholds(value, parameter).map(|warning| ParameterWarning {
                    parameter: parameter.name.clone(),
                    warning,
                })
            })
            .collect();
        Ok(RecordOutcome { reading, warnings })
    }

    /// 恢复这些模板在当前设施键下已保存的读数。
    pub async fn restore(
        &self,
        ctx: &FacilityContext,
        templates: &[InstrumentTemplate],
    ) -> Result<Vec<RestoredReading>, SubmissionError> {
        let saved = self.readings.load(ctx).await?;
        Ok(templates
            .iter()
            .filter_map(|template| {
                let reading = saved
                    .iter()
                    .find(|reading| reading.instrument_template_id == template.id)?;
                Some(RestoredReading {
                    template_id: template.id.clone(),
                    values: ReadingValues::from_named(template, &reading.values),
                    notes: reading.notes.clone(),
                    date: reading.date.clone(),
                })
            })
            .collect())
    }
}
