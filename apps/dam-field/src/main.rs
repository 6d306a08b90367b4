//! 大坝监测现场客户端：离线采集读数与巡检，联网后批量提交。

mod cli;
mod handlers;
mod terminal;

use clap::Parser;
use cli::Cli;
use dam_auth::{AuthService, Session};
use dam_config::{AppConfig, StoreBackend};
use dam_inspection::InspectionService;
use dam_remote::HttpApiClient;
use dam_storage::{
    InMemoryKeyValueStore, InspectionRepository, JsonFileKeyValueStore, KeyValueStore,
    KvInspectionRepository, KvReadingRepository, ReadingRepository, RedisKeyValueStore,
};
use dam_submission::ClearPolicy;
use dam_telemetry::init_tracing;
use domain::{Confirmer, FacilityContext, Notifier};
use std::sync::Arc;
use std::time::Duration;
use terminal::{TerminalConfirmer, TerminalNotifier};

pub type AppResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// 命令行与环境变量合并后的登录信息。
struct Credentials {
    email: String,
    password: String,
    facility: Option<String>,
    dam_name: Option<String>,
}

/// 一次命令执行共享的依赖。
pub struct App {
    credentials: Credentials,
    clear_policy: ClearPolicy,
    store: Arc<dyn KeyValueStore>,
    client: Arc<HttpApiClient>,
    notifier: Arc<dyn Notifier>,
    confirmer: Arc<dyn Confirmer>,
}

impl App {
    async fn build(config: AppConfig, cli: &Cli) -> AppResult<Self> {
        let store = open_store(&config.store_backend).await?;
        let client = Arc::new(HttpApiClient::new(
            config.api_url.clone(),
            config.http_timeout_seconds.map(Duration::from_secs),
        )?);
        let clear_policy = if config.clear_submitted_only {
            ClearPolicy::SubmittedOnly
        } else {
            ClearPolicy::All
        };
        let credentials = Credentials {
            email: cli.email.clone().or(config.email).unwrap_or_default(),
            password: cli.password.clone().or(config.password).unwrap_or_default(),
            facility: cli.facility.clone().or(config.facility),
            dam_name: cli
                .dam_name
                .clone()
                .filter(|name| !name.trim().is_empty()),
        };
        Ok(Self {
            credentials,
            clear_policy,
            store,
            client,
            notifier: Arc::new(TerminalNotifier),
            confirmer: Arc::new(TerminalConfirmer::new(cli.yes)),
        })
    }

    fn auth(&self) -> AuthService {
        AuthService::new(self.client.clone())
    }

    /// 登录并确认设施。
    async fn session(&self) -> AppResult<Session> {
        let session = self
            .auth()
            .login(
                &self.credentials.email,
                &self.credentials.password,
                self.credentials.facility.as_deref(),
            )
            .await?;
        ensure_fresh(session, now_epoch_seconds())
    }

    /// 需要服务端数据的命令使用的设施上下文。
    async fn online_context(&self) -> AppResult<FacilityContext> {
        Ok(self.session().await?.facility_context())
    }

    /// 只操作本地数据的命令：给了 `--dam-name` 就不登录。
    async fn local_context(&self) -> AppResult<FacilityContext> {
        match &self.credentials.dam_name {
            Some(name) => {
                tracing::info!(facility = %name, "using offline facility");
                Ok(FacilityContext::new(name.trim(), false))
            }
            None => self.online_context().await,
        }
    }

    fn readings(&self) -> Arc<dyn ReadingRepository> {
        Arc::new(KvReadingRepository::new(self.store.clone()))
    }

    fn inspection_repo(&self) -> Arc<dyn InspectionRepository> {
        Arc::new(KvInspectionRepository::new(self.store.clone()))
    }

    fn inspections(&self) -> InspectionService {
        InspectionService::new(
            self.inspection_repo(),
            self.client.clone(),
            self.notifier.clone(),
            self.confirmer.clone(),
        )
    }
}

async fn open_store(backend: &StoreBackend) -> AppResult<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match backend {
        StoreBackend::File(path) => {
            let store = JsonFileKeyValueStore::open(path).await?;
            tracing::debug!(path = %store.path().display(), "file store opened");
            Arc::new(store)
        }
        StoreBackend::Memory => Arc::new(InMemoryKeyValueStore::new()),
        StoreBackend::Redis { url, namespace } => {
            let store = RedisKeyValueStore::connect(url)?;
            match namespace {
                Some(namespace) => Arc::new(store.with_namespace(namespace.clone())),
                None => Arc::new(store),
            }
        }
    };
    Ok(store)
}

fn now_epoch_seconds() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// 服务端给出的 token 已过期时拒绝继续。
fn ensure_fresh(session: Session, now: u64) -> AppResult<Session> {
    if session.is_expired(now) {
        return Err(format!(
            "session for {} expired, check the device clock and log in again",
            session.facility_name
        )
        .into());
    }
    Ok(session)
}

/// 本地日期，YYYY-MM-DD。
pub fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在）
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志（输出到 stderr）
    init_tracing();

    let app = App::build(config, &cli).await?;
    let result = handlers::dispatch(&app, cli.command).await;
    tracing::debug!(metrics = ?dam_telemetry::metrics().snapshot(), "session metrics");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: Option<u64>) -> Session {
        Session {
            token: "token".to_string(),
            facility_name: "North".to_string(),
            can_register_inspections: false,
            expires_at,
        }
    }

    #[test]
    fn expired_sessions_are_rejected() {
        assert!(ensure_fresh(session(Some(100)), 200).is_err());
        assert!(ensure_fresh(session(Some(300)), 200).is_ok());
        assert!(ensure_fresh(session(None), 200).is_ok());
    }
}
