//! 批量提交编排
//!
//! 收集 → 标准化 → 完整性确认 → 单次发送 → 清理本地。
//! 状态锁只在同步段持有，不跨 await。

use crate::completeness::missing_instruments;
use async_trait::async_trait;
use dam_normalize::normalize_batch;
use dam_remote::{InstrumentApi, RemoteError};
use dam_storage::ReadingRepository;
use domain::{Confirmer, FacilityContext, InstrumentTemplate, Notice, Notifier, ReadingBatch};
use std::sync::{Arc, Mutex};

/// 提交流程状态。
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Collecting,
    ConfirmingPartial { missing: Vec<String> },
    Ready,
    Sending,
    Success,
    Failure { message: String },
}

/// 一次提交的结果。
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// 已有提交在进行，本次调用被忽略。
    AlreadyInProgress,
    NothingToSend,
    Cancelled,
    Sent { submitted: usize, cleared: usize },
    /// 发送成功但本地清理失败，已保存的读数仍在。
    SentWithoutClearing { submitted: usize, message: String },
    Failed { message: String },
}

/// 成功后清理本地读数的范围。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearPolicy {
    /// 清除设施前缀下的全部读数键。
    #[default]
    All,
    /// 只移除本次提交的模板。
    SubmittedOnly,
}

/// 批次发送接口。
#[async_trait]
pub trait BatchSender: Send + Sync {
    async fn send(&self, batch: &ReadingBatch) -> Result<(), RemoteError>;
}

/// 通过远端仪器接口发送。
pub struct RemoteBatchSender {
    api: Arc<dyn InstrumentApi>,
}

impl RemoteBatchSender {
    pub fn new(api: Arc<dyn InstrumentApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl BatchSender for RemoteBatchSender {
    async fn send(&self, batch: &ReadingBatch) -> Result<(), RemoteError> {
        self.api.send_readings(batch).await
    }
}

/// 离开 Idle 后无论从哪里返回都回到 Idle。
struct IdleOnDrop<'a> {
    state: &'a Mutex<SubmissionState>,
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            *state = SubmissionState::Idle;
        }
    }
}

/// 提交编排器
pub struct SubmissionOrchestrator {
    readings: Arc<dyn ReadingRepository>,
    sender: Arc<dyn BatchSender>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    clear_policy: ClearPolicy,
    state: Mutex<SubmissionState>,
}

impl SubmissionOrchestrator {
    pub fn new(
        readings: Arc<dyn ReadingRepository>,
        sender: Arc<dyn BatchSender>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            readings,
            sender,
            notifier,
            confirmer,
            clear_policy: ClearPolicy::default(),
            state: Mutex::new(SubmissionState::Idle),
        }
    }

    pub fn with_clear_policy(mut self, clear_policy: ClearPolicy) -> Self {
        self.clear_policy = clear_policy;
        self
    }

    /// 当前状态。
    pub fn state(&self) -> SubmissionState {
        self.state
            .lock()
            .map(|state| state.clone())
            .unwrap_or(SubmissionState::Idle)
    }

    fn transition(&self, next: SubmissionState) {
        tracing::debug!(state = ?next, "submission state");
        if let Ok(mut state) = self.state.lock() {
            *state = next;
        }
    }

    /// 原子地离开 Idle；已在进行中时返回 None。
    fn begin(&self) -> Option<IdleOnDrop<'_>> {
        let mut state = self.state.lock().ok()?;
        if *state != SubmissionState::Idle {
            return None;
        }
        *state = SubmissionState::Collecting;
        Some(IdleOnDrop { state: &self.state })
    }

    /// 提交当前设施的全部待提交读数。
    pub async fn submit(
        &self,
        ctx: &FacilityContext,
        templates: &[InstrumentTemplate],
    ) -> SubmissionOutcome {
        let Some(_guard) = self.begin() else {
            tracing::info!(facility = %ctx.facility_name, "submission already in progress");
            return SubmissionOutcome::AlreadyInProgress;
        };

        let saved = match self.readings.load_all(ctx).await {
            Ok(saved) => saved,
            Err(err) => {
                let message = err.to_string();
                self.transition(SubmissionState::Failure {
                    message: message.clone(),
                });
                self.notifier
                    .notify(Notice::error("Could not read saved readings", message.clone()));
                return SubmissionOutcome::Failed { message };
            }
        };
        let pending: Vec<_> = saved
            .into_iter()
            .filter(|reading| !reading.is_empty())
            .collect();
        if pending.is_empty() {
            self.notifier
                .notify(Notice::info("Nothing to send", "No saved readings to send."));
            return SubmissionOutcome::NothingToSend;
        }

        let batch = normalize_batch(&pending);
        let missing = missing_instruments(templates, &batch.readings);
        if !missing.is_empty() {
            tracing::info!(
                facility = %ctx.facility_name,
                missing = missing.len(),
                "submission incomplete"
            );
            self.transition(SubmissionState::ConfirmingPartial {
                missing: missing.clone(),
            });
            let message = format!(
                "The following instruments have no reading:\n\n{}\n\nSend anyway?",
                missing.join("\n")
            );
            if !self.confirmer.confirm("Incomplete readings", &message) {
                dam_telemetry::record_submission_cancelled();
                tracing::info!(facility = %ctx.facility_name, "submission cancelled");
                return SubmissionOutcome::Cancelled;
            }
        }

        self.transition(SubmissionState::Ready);
        self.transition(SubmissionState::Sending);
        dam_telemetry::record_submission_started();
        tracing::info!(
            facility = %ctx.facility_name,
            readings = batch.len(),
            "sending readings"
        );

        if let Err(err) = self.sender.send(&batch).await {
            let message = err.to_string();
            dam_telemetry::record_submission_failed();
            tracing::warn!(facility = %ctx.facility_name, error = %message, "submission failed");
            self.transition(SubmissionState::Failure {
                message: message.clone(),
            });
            self.notifier
                .notify(Notice::error("Could not send readings", message.clone()));
            return SubmissionOutcome::Failed { message };
        }

        self.transition(SubmissionState::Success);
        dam_telemetry::record_submission_succeeded();
        let submitted = batch.len();
        let cleared = match self.clear_policy {
            ClearPolicy::All => self.readings.clear_facility(ctx).await,
            ClearPolicy::SubmittedOnly => {
                let ids: Vec<String> = batch
                    .template_ids()
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                self.readings.remove_templates(ctx, &ids).await
            }
        };
        match cleared {
            Ok(cleared) => {
                dam_telemetry::record_reading_keys_cleared(cleared as u64);
                tracing::info!(
                    facility = %ctx.facility_name,
                    submitted,
                    cleared,
                    "submission completed"
                );
                self.notifier.notify(Notice::success(
                    "Readings sent",
                    format!("{} reading(s) sent successfully.", submitted),
                ));
                SubmissionOutcome::Sent { submitted, cleared }
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(facility = %ctx.facility_name, error = %message, "local cleanup failed");
                self.notifier.notify(Notice::error(
                    "Readings sent, local copy kept",
                    format!("The readings were sent but could not be removed locally: {}", message),
                ));
                SubmissionOutcome::SentWithoutClearing { submitted, message }
            }
        }
    }
}
