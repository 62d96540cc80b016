use serde_json::{Value, json};

use super::*;
use crate::net::test_helpers::{FakeTransport, test_client};
use crate::net::RequestBody;

fn auth_body(token: &str) -> Value {
    json!({
        "token": token,
        "user": {"id": 1, "email": "a@b.com", "role": "candidate"}
    })
}

fn service(transport: &std::sync::Arc<FakeTransport>) -> AuthService {
    AuthService::new(test_client(transport, &SessionStore::in_memory()))
}

// =============================================================================
// Role
// =============================================================================

#[test]
fn role_parses_and_serializes_lowercase() {
    assert_eq!("Recruiter".parse::<Role>().unwrap(), Role::Recruiter);
    assert_eq!(" candidate ".parse::<Role>().unwrap(), Role::Candidate);
    assert!("admin".parse::<Role>().unwrap_err().contains("unknown role"));
    assert_eq!(serde_json::to_value(Role::Recruiter).unwrap(), json!("recruiter"));
    assert_eq!(Role::Candidate.as_str(), "candidate");
}

// =============================================================================
// login / register
// =============================================================================

#[tokio::test]
async fn login_posts_credentials_and_returns_token() {
    let transport = FakeTransport::new();
    transport.respond_json(200, &auth_body("T"));
    let auth = service(&transport);

    let result = auth.login("a@b.com", "pw").await.unwrap();

    assert_eq!(result.token, "T");
    assert_eq!(result.user.email.as_deref(), Some("a@b.com"));
    let recorded = transport.last();
    assert_eq!(recorded.url.path(), "/api/auth/login");
    assert_eq!(recorded.body, RequestBody::Json(json!({"email": "a@b.com", "password": "pw"})));
}

#[tokio::test]
async fn login_does_not_persist_by_itself() {
    let transport = FakeTransport::new();
    transport.respond_json(200, &auth_body("T"));
    let auth = service(&transport);

    auth.login("a@b.com", "pw").await.unwrap();

    assert!(!auth.session().is_authenticated());
}

#[tokio::test]
async fn register_sends_role() {
    let transport = FakeTransport::new();
    transport.respond_json(201, &auth_body("R"));
    let auth = service(&transport);

    let result = auth.register("r@b.com", "pw", Role::Recruiter).await.unwrap();

    assert_eq!(result.token, "R");
    let recorded = transport.last();
    assert_eq!(recorded.url.path(), "/api/auth/register");
    assert_eq!(
        recorded.body,
        RequestBody::Json(json!({"email": "r@b.com", "password": "pw", "role": "recruiter"}))
    );
}

#[tokio::test]
async fn login_failure_carries_server_message() {
    let transport = FakeTransport::new();
    transport.respond_json(401, &json!({"message": "Invalid credentials"}));
    let auth = service(&transport);

    let err = auth.login("a@b.com", "wrong").await.unwrap_err();

    assert_eq!(err.message, "Invalid credentials");
    assert_eq!(err.status, Some(401));
    assert!(!auth.session().is_authenticated());
}

// =============================================================================
// session lifecycle
// =============================================================================

#[tokio::test]
async fn stored_login_authorizes_later_requests() {
    let transport = FakeTransport::new();
    transport.respond_json(200, &auth_body("T"));
    let api = test_client(&transport, &SessionStore::in_memory());
    let auth = AuthService::new(api.clone());

    let result = auth.login("a@b.com", "pw").await.unwrap();
    auth.set_user_data(&result).unwrap();
    let _: Value = api.get("/profile", RequestOptions::new()).await.unwrap();

    assert_eq!(transport.last().header("authorization"), Some("Bearer T"));
    assert_eq!(auth.session().get_user(), Some(result.user));
}

#[tokio::test]
async fn logout_clears_session_and_authorization() {
    let transport = FakeTransport::new();
    let api = test_client(&transport, &SessionStore::in_memory());
    let auth = AuthService::new(api.clone());
    let data: AuthResponse = serde_json::from_value(auth_body("T")).unwrap();

    auth.set_user_data(&data).unwrap();
    auth.logout().unwrap();
    let _: Value = api.get("/profile", RequestOptions::new()).await.unwrap();

    assert!(auth.session().get_token().is_none());
    assert!(auth.session().get_user().is_none());
    assert!(transport.last().header("authorization").is_none());
}
