//! 追踪、请求 ID 与进程内计数器。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 计数器快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub readings_saved: u64,
    pub submissions_started: u64,
    pub submissions_succeeded: u64,
    pub submissions_failed: u64,
    pub submissions_cancelled: u64,
    pub reading_keys_cleared: u64,
    pub inspections_sent: u64,
    pub http_requests: u64,
    pub http_failures: u64,
    pub http_latency_ms_total: u64,
    pub http_latency_ms_count: u64,
}

/// 进程内计数器。
pub struct TelemetryMetrics {
    readings_saved: AtomicU64,
    submissions_started: AtomicU64,
    submissions_succeeded: AtomicU64,
    submissions_failed: AtomicU64,
    submissions_cancelled: AtomicU64,
    reading_keys_cleared: AtomicU64,
    inspections_sent: AtomicU64,
    http_requests: AtomicU64,
    http_failures: AtomicU64,
    http_latency_ms_total: AtomicU64,
    http_latency_ms_count: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            readings_saved: AtomicU64::new(0),
            submissions_started: AtomicU64::new(0),
            submissions_succeeded: AtomicU64::new(0),
            submissions_failed: AtomicU64::new(0),
            submissions_cancelled: AtomicU64::new(0),
            reading_keys_cleared: AtomicU64::new(0),
            inspections_sent: AtomicU64::new(0),
            http_requests: AtomicU64::new(0),
            http_failures: AtomicU64::new(0),
            http_latency_ms_total: AtomicU64::new(0),
            http_latency_ms_count: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            readings_saved: self.readings_saved.load(Ordering::Relaxed),
            submissions_started: self.submissions_started.load(Ordering::Relaxed),
            submissions_succeeded: self.submissions_succeeded.load(Ordering::Relaxed),
            submissions_failed: self.submissions_failed.load(Ordering::Relaxed),
            submissions_cancelled: self.submissions_cancelled.load(Ordering::Relaxed),
            reading_keys_cleared: self.reading_keys_cleared.load(Ordering::Relaxed),
            inspections_sent: self.inspections_sent.load(Ordering::Relaxed),
            http_requests: self.http_requests.load(Ordering::Relaxed),
            http_failures: self.http_failures.load(Ordering::Relaxed),
            http_latency_ms_total: self.http_latency_ms_total.load(Ordering::Relaxed),
            http_latency_ms_count: self.http_latency_ms_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局计数器实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info，可用 RUST_LOG 覆盖）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录本地保存的读数条数。
pub fn record_readings_saved(count: u64) {
    metrics().readings_saved.fetch_add(count, Ordering::Relaxed);
}

/// 记录一次提交开始。
pub fn record_submission_started() {
    metrics()
        .submissions_started
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_submission_succeeded() {
    metrics()
        .submissions_succeeded
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_submission_failed() {
    metrics()
        .submissions_failed
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录用户在不完整提示处取消的次数。
pub fn record_submission_cancelled() {
    metrics()
        .submissions_cancelled
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录清除的读数键数量。
pub fn record_reading_keys_cleared(count: u64) {
    metrics()
        .reading_keys_cleared
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录上传的巡检条数。
pub fn record_inspections_sent(count: u64) {
    metrics()
        .inspections_sent
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录一次 HTTP 请求及其耗时（毫秒）。
pub fn record_http_request(latency_ms: u64, success: bool) {
    let metrics = metrics();
    metrics.http_requests.fetch_add(1, Ordering::Relaxed);
    if !success {
        metrics.http_failures.fetch_add(1, Ordering::Relaxed);
    }
    metrics
        .http_latency_ms_total
        .fetch_add(latency_ms, Ordering::Relaxed);
    metrics
        .http_latency_ms_count
        .fetch_add(1, Ordering::Relaxed);
}
