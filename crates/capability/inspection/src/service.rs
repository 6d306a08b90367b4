//! 巡检流程：本地列表维护、远端刷新与批量上传。

use crate::error::InspectionError;
use api_contract::{RoutineDto, RoutineUploadDto};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dam_remote::RoutineApi;
use dam_storage::InspectionRepository;
use domain::{
    Confirmer, FacilityContext, InspectionImage, InspectionStatus, Notice, NotInspectedReason,
    Notifier,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 标签最大字符数。
pub const MAX_LABEL_CHARS: usize = 300;

const LOCAL_IMAGE_SCHEME: &str = "file://";
const REMOTE_IMAGE_PREFIX: &str = "data:image/jpeg;base64,";

/// 上传结果。
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    AlreadyInProgress,
    NothingToSend,
    Cancelled,
    /// 没有可读取的本地图片。
    NoLocalImages,
    /// `reset` 为 false 表示上传成功但本地复位失败。
    Sent { count: usize, reset: bool },
    Failed { message: String },
}

/// 远端刷新结果。
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    AlreadyInProgress,
    Refreshed { count: usize },
    Failed { message: String },
}

/// 进行中标志，离开作用域时释放。
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 读取 `file://` 图片并编码为 base64；其他 uri 返回 None。
pub async fn encode_local_image(uri: &str) -> Result<Option<String>, std::io::Error> {
    let Some(path) = uri.strip_prefix(LOCAL_IMAGE_SCHEME) else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(path).await?;
    Ok(Some(STANDARD.encode(bytes)))
}

fn image_from_remote(dto: RoutineDto) -> Option<InspectionImage> {
    let data = dto.image_base64.filter(|data| !data.is_empty())?;
    let label = dto.label.unwrap_or_default();
    if label.is_empty() {
        return None;
    }
    Some(InspectionImage {
        uri: format!("{}{}", REMOTE_IMAGE_PREFIX, data),
        label,
        status: None,
        not_inspected_reason: None,
        date: None,
    })
}

/// 巡检服务
pub struct InspectionService {
    repo: Arc<dyn InspectionRepository>,
    routines: Arc<dyn RoutineApi>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
    refreshing: AtomicBool,
    sending: AtomicBool,
}

impl InspectionService {
    pub fn new(
        repo: Arc<dyn InspectionRepository>,
        routines: Arc<dyn RoutineApi>,
        notifier: Arc<dyn Notifier>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        Self {
            repo,
            routines,
            notifier,
            confirmer,
            refreshing: AtomicBool::new(false),
            sending: AtomicBool::new(false),
        }
    }

    /// 当前设施的巡检列表；尚无数据时写入空列表。
    pub async fn list(&self, ctx: &FacilityContext) -> Result<Vec<InspectionImage>, InspectionError> {
        match self.repo.load(ctx).await? {
            Some(images) => Ok(images),
            None => {
                self.repo.save(ctx, &[]).await?;
                Ok(Vec::new())
            }
        }
    }

    /// 登记新的巡检点，状态为 New。
    pub async fn register(
        &self,
        ctx: &FacilityContext,
        uri: &str,
        label: &str,
    ) -> Result<InspectionImage, InspectionError> {
        if !ctx.can_register_inspections {
            return Err(InspectionError::PermissionDenied);
        }
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(InspectionError::MissingImage);
        }
        let label = label.trim();
        if label.is_empty() {
            return Err(InspectionError::MissingLabel);
        }
        if label.chars().count() > MAX_LABEL_CHARS {
            return Err(InspectionError::LabelTooLong(MAX_LABEL_CHARS));
        }

        let mut images = self.list(ctx).await?;
        let image = InspectionImage::registered(uri, label);
        images.push(image.clone());
        self.repo.save(ctx, &images).await?;
        tracing::info!(facility = %ctx.facility_name, label = %label, "inspection registered");
        Ok(image)
    }

    /// 记录巡检状态与日期。
    pub async fn record_status(
        &self,
        ctx: &FacilityContext,
        index: usize,
        status: InspectionStatus,
        reason: Option<NotInspectedReason>,
        today: &str,
    ) -> Result<InspectionImage, InspectionError> {
        self.update(ctx, index, |image| image.set_status(status, reason, today))
            .await
    }

    /// 替换巡检点图片。
    pub async fn replace_image(
        &self,
        ctx: &FacilityContext,
        index: usize,
        uri: &str,
    ) -> Result<InspectionImage, InspectionError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(InspectionError::MissingImage);
        }
        self.update(ctx, index, |image| image.uri = uri.to_string())
            .await
    }

    async fn update(
        &self,
        ctx: &FacilityContext,
        index: usize,
        apply: impl FnOnce(&mut InspectionImage),
    ) -> Result<InspectionImage, InspectionError> {
        let mut images = self.list(ctx).await?;
        let image = images
            .get_mut(index)
            .ok_or(InspectionError::IndexOutOfRange(index))?;
        apply(image);
        let updated = image.clone();
        self.repo.save(ctx, &images).await?;
        Ok(updated)
    }

    /// 确认后删除一个巡检点；用户取消返回 false。
    pub async fn delete(&self, ctx: &FacilityContext, index: usize) -> Result<bool, InspectionError> {
        let mut images = self.list(ctx).await?;
        let Some(image) = images.get(index) else {
            return Err(InspectionError::IndexOutOfRange(index));
        };
        let message = format!("Delete the inspection \"{}\"?", image.label);
        if !self.confirmer.confirm("Delete inspection", &message) {
            return Ok(false);
        }
        images.remove(index);
        self.repo.save(ctx, &images).await?;
        Ok(true)
    }

    /// 清空本地巡检列表。
    pub async fn clear_local(&self, ctx: &FacilityContext) -> Result<(), InspectionError> {
        self.repo.save(ctx, &[]).await?;
        tracing::info!(facility = %ctx.facility_name, "local inspections cleared");
        Ok(())
    }

    /// 用远端巡检点替换本地列表。
    pub async fn refresh_from_remote(&self, ctx: &FacilityContext) -> RefreshOutcome {
        let Some(_guard) = InFlight::acquire(&self.refreshing) else {
            return RefreshOutcome::AlreadyInProgress;
        };

        if let Err(err) = self.repo.save(ctx, &[]).await {
            return self.refresh_failed(ctx, err.to_string());
        }
        let routines = match self.routines.list_routines().await {
            Ok(routines) => routines,
            Err(err) => return self.refresh_failed(ctx, err.to_string()),
        };
        let images: Vec<InspectionImage> = routines.into_iter().filter_map(image_from_remote).collect();
        if let Err(err) = self.repo.save(ctx, &images).await {
            return self.refresh_failed(ctx, err.to_string());
        }
        tracing::info!(facility = %ctx.facility_name, count = images.len(), "inspections refreshed");
        RefreshOutcome::Refreshed {
            count: images.len(),
        }
    }

    fn refresh_failed(&self, ctx: &FacilityContext, message: String) -> RefreshOutcome {
        tracing::warn!(facility = %ctx.facility_name, error = %message, "inspection refresh failed");
        self.notifier
            .notify(Notice::error("Could not load inspections", message.clone()));
        RefreshOutcome::Failed { message }
    }

    /// 上传本地图片巡检记录，单次 POST。
    pub async fn send(&self, ctx: &FacilityContext) -> SendOutcome {
        let Some(_guard) = InFlight::acquire(&self.sending) else {
            return SendOutcome::AlreadyInProgress;
        };

        let mut images = match self.repo.load(ctx).await {
            Ok(images) => images.unwrap_or_default(),
            Err(err) => return self.send_failed(ctx, err.to_string()),
        };
        if images.is_empty() {
            self.notifier
                .notify(Notice::info("Nothing to send", "No inspections to send."));
            return SendOutcome::NothingToSend;
        }

        let unreviewed = images.iter().filter(|image| !image.is_reviewed()).count();
        if unreviewed > 0 {
            let message = format!(
                "{} anomaly(ies) without monitoring. Send anyway?",
                unreviewed
            );
            if !self.confirmer.confirm("Unreviewed inspections", &message) {
                return SendOutcome::Cancelled;
            }
        }

        let mut routines = Vec::new();
        for image in &images {
            let data = match encode_local_image(&image.uri).await {
                Ok(Some(data)) => data,
                Ok(None) => {
                    tracing::debug!(label = %image.label, "skipping non-local image");
                    continue;
                }
                Err(err) => {
                    return self.send_failed(ctx, format!("could not read {}: {}", image.uri, err));
                }
            };
            routines.push(RoutineUploadDto {
                label: image.label.clone(),
                image_base64: data,
                status: image.status.map(|status| status.as_wire().to_string()),
                not_inspected_reason: image
                    .not_inspected_reason
                    .map(|reason| reason.as_wire().to_string()),
                date: image.date.clone().filter(|date| !date.is_empty()),
            });
        }
        if routines.is_empty() {
            self.notifier
                .notify(Notice::info("Nothing to send", "No local images to send."));
            return SendOutcome::NoLocalImages;
        }

        let count = routines.len();
        tracing::info!(facility = %ctx.facility_name, count, "sending inspections");
        if let Err(err) = self.routines.create_routines(routines).await {
            return self.send_failed(ctx, err.to_string());
        }
        dam_telemetry::record_inspections_sent(count as u64);

        images.iter_mut().for_each(InspectionImage::reset);
        let reset = match self.repo.save(ctx, &images).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(facility = %ctx.facility_name, error = %err, "inspection reset failed");
                false
            }
        };
        self.notifier.notify(Notice::success(
            "Inspections sent",
            format!("{} inspection(s) sent successfully.", count),
        ));
        SendOutcome::Sent { count, reset }
    }

    fn send_failed(&self, ctx: &FacilityContext, message: String) -> SendOutcome {
        tracing::warn!(facility = %ctx.facility_name, error = %message, "inspection upload failed");
        self.notifier
            .notify(Notice::error("Could not send inspections", message.clone()));
        SendOutcome::Failed { message }
    }
}
