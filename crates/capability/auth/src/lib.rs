//! 认证能力：两步登录（账号 → 设施确认）与会话 claims 解析。

mod jwt;

use dam_remote::AccountApi;
use domain::Dam;
use std::sync::Arc;

pub use jwt::{Session, decode_session};

/// 认证相关错误。
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("no facilities available for this account")]
    NoFacilities,
    #[error("facility not found: {0}")]
    FacilityNotFound(String),
    #[error("facility selection required, available: {}", .0.join(", "))]
    FacilitySelectionRequired(Vec<String>),
    #[error("token invalid")]
    TokenInvalid,
    #[error("{0}")]
    Remote(String),
}

/// 认证服务（基于远端账号接口）。
pub struct AuthService {
    api: Arc<dyn AccountApi>,
}

impl AuthService {
    /// 创建认证服务实例。
    pub fn new(api: Arc<dyn AccountApi>) -> Self {
        Self { api }
    }

    /// 登录并确认设施。
    ///
    /// `facility` 可以是设施 id 或名称（不区分大小写）；为空且账号只有一个设施时自动选择。
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        facility: Option<&str>,
    ) -> Result<Session, AuthError> {
        let dams = self.available_facilities(email, password).await?;
        let dam = select_facility(&dams, facility)?;
        let token = self
            .api
            .confirm_client(&dam.domain_id)
            .await
            .map_err(|err| AuthError::Remote(err.to_string()))?;

        let mut session = decode_session(&token)?;
        if session.facility_name.is_empty() {
            session.facility_name = dam.name.clone();
        }
        tracing::info!(
            facility = %session.facility_name,
            can_register_inspections = session.can_register_inspections,
            "session established"
        );
        Ok(session)
    }

    /// 账号登录后列出可选设施。
    pub async fn available_facilities(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Vec<Dam>, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        self.api
            .authenticate(email.trim(), password)
            .await
            .map_err(|err| AuthError::Remote(err.to_string()))?;
        self.list_facilities().await
    }

    /// 列出当前账号可选设施（需已登录）。
    pub async fn list_facilities(&self) -> Result<Vec<Dam>, AuthError> {
        self.api
            .list_dams()
            .await
            .map_err(|err| AuthError::Remote(err.to_string()))
    }
}

/// 按 id 或名称选择设施。
pub fn select_facility<'a>(dams: &'a [Dam], facility: Option<&str>) -> Result<&'a Dam, AuthError> {
    if dams.is_empty() {
        return Err(AuthError::NoFacilities);
    }
    match facility.map(str::trim).filter(|value| !value.is_empty()) {
        Some(wanted) => dams
            .iter()
            .find(|dam| dam.domain_id == wanted)
            .or_else(|| dams.iter().find(|dam| dam.name.eq_ignore_ascii_case(wanted)))
            .ok_or_else(|| AuthError::FacilityNotFound(wanted.to_string())),
        None if dams.len() == 1 => Ok(&dams[0]),
        None => Err(AuthError::FacilitySelectionRequired(
            dams.iter().map(|dam| dam.name.clone()).collect(),
        )),
    }
}
