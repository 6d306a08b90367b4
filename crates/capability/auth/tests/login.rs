use async_trait::async_trait;
use dam_auth::{AuthError, AuthService, decode_session, select_facility};
use dam_remote::{AccountApi, RemoteError};
use domain::Dam;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn token(claims: serde_json::Value) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"server-side-secret"),
    )
    .expect("token")
}

fn dam(id: &str, name: &str) -> Dam {
    Dam {
        domain_id: id.to_string(),
        name: name.to_string(),
        company_name: None,
    }
}

struct FakeAccounts {
    dams: Vec<Dam>,
    confirm_token: String,
    reject_login: bool,
    confirmed: Mutex<Vec<String>>,
}

impl FakeAccounts {
    fn new(dams: Vec<Dam>, confirm_token: String) -> Self {
        Self {
            dams,
            confirm_token,
            reject_login: false,
            confirmed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AccountApi for FakeAccounts {
    async fn authenticate(&self, _email: &str, _password: &str) -> Result<String, RemoteError> {
        if self.reject_login {
            return Err(RemoteError::Api {
                status: 401,
                message: "invalid email or password".to_string(),
            });
        }
        Ok("login-token".to_string())
    }

    async fn list_dams(&self) -> Result<Vec<Dam>, RemoteError> {
        Ok(self.dams.clone())
    }

    async fn confirm_client(&self, dam_id: &str) -> Result<String, RemoteError> {
        self.confirmed
            .lock()
            .expect("lock")
            .push(dam_id.to_string());
        Ok(self.confirm_token.clone())
    }
}

#[test]
fn claims_grant_inspection_permission() {
    let session = decode_session(&token(json!({
        "damName": "North",
        "permissionToAddRoutines": "True",
        "exp": 1_700_000_000u64
    })))
    .expect("session");
    assert_eq!(session.facility_name, "North");
    assert!(session.can_register_inspections);
    assert!(session.is_expired(1_800_000_000));

    let ctx = session.facility_context();
    assert_eq!(ctx.facility_name, "North");
    assert!(ctx.can_register_inspections);

    let session = decode_session(&token(json!({"damName": "South", "permissionToAddRoutines": "False"})))
        .expect("session");
    assert!(!session.can_register_inspections);
    assert!(!session.is_expired(u64::MAX));
}

#[test]
fn garbage_token_is_invalid() {
    assert!(matches!(
        decode_session("not-a-jwt"),
        Err(AuthError::TokenInvalid)
    ));
}

#[test]
fn facility_selection_by_id_or_name() {
    let dams = vec![dam("d-1", "North"), dam("d-2", "South")];
    assert_eq!(select_facility(&dams, Some("d-2")).expect("id").name, "South");
    assert_eq!(
        select_facility(&dams, Some("north")).expect("name").domain_id,
        "d-1"
    );
    assert!(matches!(
        select_facility(&dams, Some("West")),
        Err(AuthError::FacilityNotFound(_))
    ));
    let err = select_facility(&dams, None).expect_err("ambiguous");
    assert_eq!(
        err.to_string(),
        "facility selection required, available: North, South"
    );
    assert!(matches!(select_facility(&[], None), Err(AuthError::NoFacilities)));
}

#[tokio::test]
async fn login_confirms_selected_facility() {
    let fake = Arc::new(FakeAccounts::new(
        vec![dam("d-1", "North"), dam("d-2", "South")],
        token(json!({"damName": "South", "permissionToAddRoutines": "True"})),
    ));
    let service = AuthService::new(fake.clone());

    let session = service
        .login("inspector@example.com", "secret", Some("South"))
        .await
        .expect("login");
    assert_eq!(session.facility_name, "South");
    assert!(session.can_register_inspections);
    assert_eq!(*fake.confirmed.lock().expect("lock"), vec!["d-2".to_string()]);
}

#[tokio::test]
async fn single_facility_is_selected_and_named_from_list() {
    let fake = Arc::new(FakeAccounts::new(vec![dam("d-1", "North")], token(json!({}))));
    let service = AuthService::new(fake);

    let session = service
        .login("inspector@example.com", "secret", None)
        .await
        .expect("login");
    assert_eq!(session.facility_name, "North");
    assert!(!session.can_register_inspections);
}

#[tokio::test]
async fn login_errors_surface_remote_message() {
    let mut fake = FakeAccounts::new(vec![dam("d-1", "North")], token(json!({})));
    fake.reject_login = true;
    let service = AuthService::new(Arc::new(fake));

    let err = service
        .login("inspector@example.com", "wrong", None)
        .await
        .expect_err("rejected");
    assert_eq!(err.to_string(), "invalid email or password");

    let err = service.login(" ", "", None).await.expect_err("missing");
    assert!(matches!(err, AuthError::MissingCredentials));
}
