#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::unwrap_used, clippy::expect_used, reason = "integration test: panics are the assertion mechanism")]

use std::sync::Arc;

use chrono::Utc;
use ecocharge_client::{ClientConfig, ClientError, EcoChargeClient, MemorySessionStore, SessionStore};
use ecocharge_types::validation::{
    ChangePasswordForm, ChangeUsernameForm, LoginForm, ProfileUpdate, RatingForm,
    ResetPasswordForm, SendOtpForm, SqlQuery, VerifyOtpForm,
};
use ecocharge_types::{AdminProfile, AdminSession, ContactMessage, LiveList, Rating};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn admin() -> AdminProfile {
    AdminProfile {
        id: "1".to_string(),
        username: "ops".to_string(),
        email: "ops@uni.edu".to_string(),
        full_name: Some("Ops Team".to_string()),
        phone: None,
        role: Some("admin".to_string()),
    }
}

fn session(token: &str) -> AdminSession {
    AdminSession { token: token.to_string(), admin: admin(), logged_in_at: Utc::now() }
}

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        base_url: server.uri(),
        feed_url: None,
        timeout_secs: 5,
        data_dir: std::env::temp_dir(),
    }
}

fn client_with(server: &MockServer, store: MemorySessionStore) -> (EcoChargeClient, Arc<MemorySessionStore>) {
    let store = Arc::new(store);
    let client = EcoChargeClient::new(config(server), store.clone()).expect("client builds");
    (client, store)
}

fn login_form() -> LoginForm {
    LoginForm { username: "ops".to_string(), password: "secret123".to_string() }
}

#[tokio::test]
async fn test_login_caches_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .and(body_partial_json(json!({"username": "ops", "password": "secret123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-1",
            "admin": {"id": 1, "username": "ops", "email": "ops@uni.edu"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, MemorySessionStore::new());
    let session = client.login(&login_form()).await.expect("login succeeds");

    assert_eq!(session.token, "tok-1");
    assert_eq!(store.load_session().unwrap().map(|s| s.admin.id), Some("1".to_string()));
    assert!(client.is_logged_in().unwrap());
}

#[tokio::test]
async fn test_login_bad_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})))
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, MemorySessionStore::new());
    let err = client.login(&login_form()).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidCredentials));
    assert!(store.load_session().unwrap().is_none());
}

#[tokio::test]
async fn test_login_rate_limit_starts_persistent_cooldown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "120"))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, MemorySessionStore::new());

    let first = client.login(&login_form()).await.unwrap_err();
    assert!(matches!(first, ClientError::CooldownActive { remaining_secs: 120 }));
    assert!(store.load_cooldown().unwrap().is_some());

    let second = client.login(&login_form()).await.unwrap_err();
    match second {
        ClientError::CooldownActive { remaining_secs } => assert!(remaining_secs <= 120 && remaining_secs > 100),
        other => panic!("expected cooldown, got {:?}", other),
    }
}

#[tokio::test]
async fn test_expired_cooldown_is_cleared() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-2",
            "admin": {"id": "1", "username": "ops", "email": "ops@uni.edu"}
        })))
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, MemorySessionStore::new());
    store.save_cooldown(Utc::now() - chrono::Duration::seconds(5)).unwrap();

    client.login(&login_form()).await.expect("cooldown has passed");
    assert!(store.load_cooldown().unwrap().is_none());
}

#[tokio::test]
async fn test_profile_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/profile"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "admin": {"id": "1", "username": "ops", "email": "new@uni.edu", "fullName": "Ops"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, MemorySessionStore::with_session(session("tok-1")));
    let profile = client.profile().await.expect("profile loads");

    assert_eq!(profile.email, "new@uni.edu");
    assert_eq!(store.load_session().unwrap().unwrap().admin.email, "new@uni.edu");
}

#[tokio::test]
async fn test_unauthorized_is_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Sam", "issueType": "charger", "description": "Cable is frayed", "status": "open"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, MemorySessionStore::with_session(session("tok-1")));
    let reports = client.list_reports().await.expect("second attempt succeeds");

    assert_eq!(reports.len(), 1);
    assert!(store.load_session().unwrap().is_some());
}

#[tokio::test]
async fn test_repeated_forbidden_forces_logout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/sql"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
        .expect(2)
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, MemorySessionStore::with_session(session("stale")));
    let err = client.execute_sql(&SqlQuery::new("SELECT 1")).await.unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired));
    assert!(err.requires_login());
    assert!(store.load_session().unwrap().is_none());
}

#[tokio::test]
async fn test_authorized_call_without_session_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/profile"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::new());
    assert!(matches!(client.profile().await, Err(ClientError::NotAuthenticated)));
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/forgot-password/send-otp"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::new());
    let err = client.send_otp(&SendOtpForm { email: "foo@bar".to_string() }).await.unwrap_err();

    match err {
        ClientError::Validation(form) => assert_eq!(form.field, "email"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_otp_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/forgot-password/verify-otp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "OTP expired"})))
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::new());
    let form = VerifyOtpForm { email: "ops@uni.edu".to_string(), otp: "123456".to_string() };
    let result = client.verify_otp(&form).await.expect("400 maps to unverified");

    assert!(!result.verified);
    assert_eq!(result.message.as_deref(), Some("OTP expired"));
}

#[tokio::test]
async fn test_profile_update_without_echo_patches_cache() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/admin/profile"))
        .and(body_partial_json(json!({"phone": "+60 12 345 6789"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Profile updated"})))
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::with_session(session("tok-1")));
    let update = ProfileUpdate { phone: Some("+60 12 345 6789".to_string()), ..Default::default() };
    let profile = client.update_profile(&update).await.expect("update succeeds");

    assert_eq!(profile.phone.as_deref(), Some("+60 12 345 6789"));
    assert_eq!(profile.username, "ops");
}

#[tokio::test]
async fn test_change_username_updates_cache() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/admin/change-username"))
        .and(body_partial_json(json!({"newUsername": "ops.lead"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Username changed"})))
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, MemorySessionStore::with_session(session("tok-1")));
    let form = ChangeUsernameForm {
        new_username: "ops.lead".to_string(),
        current_password: "secret123".to_string(),
    };
    let msg = client.change_username(&form).await.expect("rename succeeds");

    assert_eq!(msg, "Username changed");
    assert_eq!(store.load_session().unwrap().unwrap().admin.username, "ops.lead");
}

#[tokio::test]
async fn test_sql_rows_are_tabulated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/sql"))
        .and(body_partial_json(json!({"query": "SELECT id, name FROM devices"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Block A"},
            {"id": 2, "name": "Block B"}
        ])))
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::with_session(session("tok-1")));
    let result = client
        .execute_sql(&SqlQuery::new("  SELECT id, name FROM devices  "))
        .await
        .expect("query runs");

    assert_eq!(result.row_count, 2);
    assert!(result.columns.contains(&"name".to_string()));
}

#[tokio::test]
async fn test_submit_rating_with_id_only_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/ratings"))
        .and(body_partial_json(json!({"userName": "Ana", "stars": 4})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "Saved", "id": 77})))
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::new());
    let form = RatingForm {
        station_id: Some("st-2".to_string()),
        user_name: "Ana".to_string(),
        user_email: None,
        stars: 4,
        comment: Some("Fast charger".to_string()),
    };
    let rating = client.submit_rating(&form).await.expect("rating saved");

    assert_eq!(rating.id, "77");
    assert_eq!(rating.comment.as_deref(), Some("Fast charger"));
}

#[tokio::test]
async fn test_rating_summary() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ratings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ratings": [
            {"id": 1, "userName": "A", "stars": 5},
            {"id": 2, "userName": "B", "stars": 3}
        ]})))
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::new());
    let summary = client.rating_summary().await.expect("summary");

    assert_eq!(summary.count, 2);
    assert!((summary.average - 4.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "Mail server down"})))
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::new());
    let message = ContactMessage {
        name: "Kim".to_string(),
        email: "kim@uni.edu".to_string(),
        subject: None,
        message: "The map is out of date".to_string(),
    };
    let err = client.send_contact(&message).await.unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 500, .. }));
    assert_eq!(err.user_message(), "Mail server down");
}

/// Rejects the request after another caller has stored a fresh token.
struct RefreshThenReject {
    store: Arc<MemorySessionStore>,
}

impl Respond for RefreshThenReject {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.store.save_session(&session("tok-fresh")).expect("store writable");
        ResponseTemplate::new(401)
    }
}

#[tokio::test]
async fn test_retry_uses_token_refreshed_in_store() {
    let server = MockServer::start().await;
    let (client, store) = client_with(&server, MemorySessionStore::with_session(session("tok-old")));
    Mock::given(method("GET"))
        .and(path("/api/admin/profile"))
        .and(header("Authorization", "Bearer tok-old"))
        .respond_with(RefreshThenReject { store: store.clone() })
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/profile"))
        .and(header("Authorization", "Bearer tok-fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "admin": {"id": 1, "username": "ops", "email": "ops@uni.edu"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let profile = client.profile().await.expect("retry with fresh token succeeds");

    assert_eq!(profile.username, "ops");
    assert_eq!(store.load_session().unwrap().map(|s| s.token), Some("tok-fresh".to_string()));
}

#[tokio::test]
async fn test_otp_failure_flag_in_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/forgot-password/verify-otp"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Invalid OTP"})),
        )
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::new());
    let form = VerifyOtpForm { email: "ops@uni.edu".to_string(), otp: "654321".to_string() };
    let result = client.verify_otp(&form).await.expect("body is readable");

    assert!(!result.verified);
    assert_eq!(result.message.as_deref(), Some("Invalid OTP"));
}

#[tokio::test]
async fn test_otp_flag_must_be_boolean() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/forgot-password/verify-otp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": "maybe"})))
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::new());
    let form = VerifyOtpForm { email: "ops@uni.edu".to_string(), otp: "654321".to_string() };

    assert!(matches!(client.verify_otp(&form).await, Err(ClientError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_reset_password_leaves_session_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/forgot-password/reset"))
        .and(body_partial_json(json!({
            "email": "ops@uni.edu",
            "otp": "123456",
            "newPassword": "fresh-pass9"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Password reset"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, MemorySessionStore::with_session(session("tok-1")));
    let form = ResetPasswordForm {
        email: "ops@uni.edu".to_string(),
        otp: "123456".to_string(),
        new_password: "fresh-pass9".to_string(),
        confirm_password: "fresh-pass9".to_string(),
    };
    let message = client.reset_password(&form).await.expect("reset accepted");

    assert_eq!(message, "Password reset");
    assert_eq!(store.load_session().unwrap().map(|s| s.token), Some("tok-1".to_string()));
}

#[tokio::test]
async fn test_change_password_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/admin/change-password"))
        .and(header("Authorization", "Bearer tok-1"))
        .and(body_partial_json(json!({
            "currentPassword": "secret123",
            "newPassword": "better-pass7"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Password changed"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, store) = client_with(&server, MemorySessionStore::with_session(session("tok-1")));
    let form = ChangePasswordForm {
        current_password: "secret123".to_string(),
        new_password: "better-pass7".to_string(),
        confirm_password: "better-pass7".to_string(),
    };
    let message = client.change_password(&form).await.expect("password changed");

    assert_eq!(message, "Password changed");
    assert!(client.is_logged_in().unwrap());
    assert_eq!(store.load_session().unwrap().map(|s| s.token), Some("tok-1".to_string()));
}

#[tokio::test]
async fn test_failed_rating_edit_rolls_back_to_server_copy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ratings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "r1", "userName": "Ana", "stars": 3, "comment": "Slow"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/ratings/r1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Database offline"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::new());
    let mut list: LiveList<Rating> = LiveList::from_snapshot(client.list_ratings().await.unwrap());
    let form = RatingForm {
        station_id: None,
        user_name: "Ana".to_string(),
        user_email: None,
        stars: 5,
        comment: Some("Fixed now".to_string()),
    };

    list.insert_optimistic(form.clone().into_rating("r1"));
    assert_eq!(list.get("r1").map(|r| r.stars), Some(5));

    let err = client.edit_rating("r1", &form).await.unwrap_err();
    assert_eq!(err.user_message(), "Database offline");
    list.rollback("r1");

    let restored = list.get("r1").expect("server copy kept");
    assert_eq!(restored.stars, 3);
    assert_eq!(restored.comment.as_deref(), Some("Slow"));
    assert!(!list.is_pending("r1"));
}

#[tokio::test]
async fn test_rating_id_is_escaped_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/ratings/a%2Fb%3Fc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Updated"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _store) = client_with(&server, MemorySessionStore::new());
    let form = RatingForm {
        station_id: None,
        user_name: "Ana".to_string(),
        user_email: None,
        stars: 4,
        comment: None,
    };
    let rating = client.edit_rating("a/b?c", &form).await.expect("edit routed to one id");

    assert_eq!(rating.id, "a/b?c");
}
