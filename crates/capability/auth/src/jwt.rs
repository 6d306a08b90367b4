use crate::AuthError;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

/// 确认设施后 token 中携带的 claims。
///
/// 客户端不持有签名密钥，只读取 claims，不校验签名；token 的有效性由服务端判断。
#[derive(Debug, Deserialize)]
struct SessionClaims {
    #[serde(rename = "damName", default)]
    dam_name: Option<String>,
    #[serde(rename = "permissionToAddRoutines", default)]
    permission_to_add_routines: Option<Value>,
    #[serde(default)]
    exp: Option<u64>,
}

/// 登录会话。
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub facility_name: String,
    pub can_register_inspections: bool,
    pub expires_at: Option<u64>,
}

impl Session {
    /// 会话对应的设施上下文。
    pub fn facility_context(&self) -> domain::FacilityContext {
        domain::FacilityContext::new(self.facility_name.clone(), self.can_register_inspections)
    }

    pub fn is_expired(&self, now_epoch_seconds: u64) -> bool {
        self.expires_at
            .map(|exp| exp <= now_epoch_seconds)
            .unwrap_or(false)
    }
}

/// 读取 token claims 生成会话。
pub fn decode_session(token: &str) -> Result<Session, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let decoded =
        jsonwebtoken::decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|err| {
                tracing::debug!(error = %err, "token claims unreadable");
                AuthError::TokenInvalid
            })?;
    let claims = decoded.claims;
    Ok(Session {
        token: token.to_string(),
        facility_name: claims.dam_name.unwrap_or_default(),
        can_register_inspections: grants(claims.permission_to_add_routines.as_ref()),
        expires_at: claims.exp,
    })
}

/// 服务端以字符串 "True" 表示授权，也兼容布尔值。
fn grants(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
        Some(Value::Bool(flag)) => *flag,
        _ => false,
    }
}
