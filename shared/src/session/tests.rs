use super::*;
use crate::config::ClientConfig;
use crate::http::{HttpMethod, MockHttpClient};
use crate::role::Role;
use crate::storage::MemoryStore;
use serde_json::json;

// =========================================================
// 辅助函数
// =========================================================

const BASE: &str = "http://api.test";
const USER_JSON: &str = r#"{"id":1,"name":"Ana","email":"ana@x.ph","role":"admin"}"#;

fn session_with(store: MemoryStore) -> AuthSession<MockHttpClient, MemoryStore> {
    let api = ApiClient::new(MockHttpClient::new(), ClientConfig::new(BASE));
    AuthSession::new(api, store)
}

fn mock_login_ok(session: &AuthSession<MockHttpClient, MemoryStore>) {
    session.api().http().mock_response(
        HttpMethod::Post,
        "http://api.test/login",
        200,
        json!({"user": {"id": 1, "name": "Ana", "email": "ana@x.ph", "role": "admin"}, "token": "tok-123"}),
    );
}

// =========================================================
// 启动水合
// =========================================================

#[test]
fn test_new_session_is_loading_until_initialized() {
    let mut session = session_with(MemoryStore::new());
    assert!(session.state().loading);

    session.initialize();
    assert!(!session.state().loading);
    assert!(!session.state().is_authenticated());
}

#[test]
fn test_hydrates_user_and_token_from_storage() {
    let store = MemoryStore::with_entries([(STORAGE_USER_KEY, USER_JSON), (STORAGE_TOKEN_KEY, "tok")]);
    let mut session = session_with(store);
    session.initialize();

    let state = session.state();
    assert!(state.is_authenticated());
    assert_eq!(state.user.as_ref().map(|u| u.role), Some(Role::Admin));
    assert_eq!(session.api().token(), Some("tok"));
}

#[test]
fn test_corrupted_user_json_clears_both_keys() {
    let store = MemoryStore::with_entries([(STORAGE_USER_KEY, "{not json"), (STORAGE_TOKEN_KEY, "tok")]);
    let mut session = session_with(store);
    session.initialize();

    assert!(!session.state().loading);
    assert!(session.state().user.is_none());
    assert!(session.state().token.is_none());
    assert!(session.storage().is_empty());
}

#[test]
fn test_token_without_user_is_kept_but_not_authenticated() {
    let store = MemoryStore::with_entries([(STORAGE_TOKEN_KEY, "tok")]);
    let mut session = session_with(store);
    session.initialize();

    assert!(session.state().has_token());
    assert!(!session.state().is_authenticated());
    assert!(session.storage().contains(STORAGE_TOKEN_KEY));
}

#[test]
fn test_user_without_token_is_dropped() {
    let store = MemoryStore::with_entries([(STORAGE_USER_KEY, USER_JSON)]);
    let mut session = session_with(store);
    session.initialize();

    assert!(session.state().user.is_none());
    assert!(!session.storage().contains(STORAGE_USER_KEY));
}

// =========================================================
// 登录
// =========================================================

#[tokio::test]
async fn test_login_then_verify_without_resubmitting_credentials() {
    let mut session = session_with(MemoryStore::new());
    session.initialize();
    mock_login_ok(&session);
    session.api().http().mock_raw(HttpMethod::Get, "http://api.test/user", 200, USER_JSON);

    let outcome = session.login("ana", "secret123").await;
    assert!(outcome.is_success());
    assert_eq!(
        session.storage().get(STORAGE_TOKEN_KEY).as_deref(),
        Some("tok-123")
    );

    assert!(session.verify_token().await);

    let requests = session.api().http().requests.borrow();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].url, "http://api.test/user");
    assert_eq!(requests[1].header("Authorization"), Some("Bearer tok-123"));
}

#[tokio::test]
async fn test_login_failure_keeps_stored_state() {
    let store = MemoryStore::with_entries([(STORAGE_USER_KEY, USER_JSON), (STORAGE_TOKEN_KEY, "old")]);
    let mut session = session_with(store);
    session.initialize();
    session.api().http().mock_response(
        HttpMethod::Post,
        "http://api.test/login",
        401,
        json!({"message": "Invalid credentials"}),
    );

    let outcome = session.login("ana", "wrong").await;
    assert_eq!(outcome.error(), Some("Invalid credentials"));
    assert_eq!(session.storage().get(STORAGE_TOKEN_KEY).as_deref(), Some("old"));
    assert!(session.state().is_authenticated());
}

#[tokio::test]
async fn test_login_network_failure_is_generic() {
    let mut session = session_with(MemoryStore::new());
    session.initialize();
    session
        .api()
        .http()
        .mock_network_failure(HttpMethod::Post, "http://api.test/login");

    let outcome = session.login("ana", "secret123").await;
    assert_eq!(outcome.error(), Some(GENERIC_LOGIN_FAILURE));
    assert!(session.storage().is_empty());
}

#[tokio::test]
async fn test_blank_credentials_fail_without_request() {
    let mut session = session_with(MemoryStore::new());
    session.initialize();

    let outcome = session.login("   ", "secret").await;
    assert_eq!(outcome.error(), Some(MISSING_CREDENTIALS));
    assert_eq!(session.api().http().request_count(), 0);
}

// =========================================================
// 注销
// =========================================================

#[tokio::test]
async fn test_logout_clears_even_when_notification_fails() {
    let store = MemoryStore::with_entries([(STORAGE_USER_KEY, USER_JSON), (STORAGE_TOKEN_KEY, "tok")]);
    let mut session = session_with(store);
    session.initialize();
    session
        .api()
        .http()
        .mock_network_failure(HttpMethod::Post, "http://api.test/logout");

    session.logout().await;
    assert!(!session.state().is_authenticated());
    assert!(session.storage().is_empty());
    assert_eq!(session.api().token(), None);

    // 再次调用不会再发请求
    session.logout().await;
    assert_eq!(session.api().http().request_count(), 1);
}

// =========================================================
// 令牌校验
// =========================================================

#[tokio::test]
async fn test_verify_without_token_returns_false_without_request() {
    let mut session = session_with(MemoryStore::new());
    session.initialize();

    assert!(!session.verify_token().await);
    assert_eq!(session.api().http().request_count(), 0);
}

#[tokio::test]
async fn test_verify_rejected_token_clears_session() {
    let store = MemoryStore::with_entries([(STORAGE_TOKEN_KEY, "stale")]);
    let mut session = session_with(store);
    session.initialize();
    session.api().http().mock_response(
        HttpMethod::Get,
        "http://api.test/user",
        401,
        json!({"message": "Unauthenticated."}),
    );

    assert!(!session.verify_token().await);
    assert!(session.storage().is_empty());
    assert!(!session.state().has_token());
}

#[tokio::test]
async fn test_verify_network_failure_forces_relogin() {
    let store = MemoryStore::with_entries([(STORAGE_USER_KEY, USER_JSON), (STORAGE_TOKEN_KEY, "tok")]);
    let mut session = session_with(store);
    session.initialize();
    session
        .api()
        .http()
        .mock_network_failure(HttpMethod::Get, "http://api.test/user");

    assert!(!session.verify_token().await);
    assert!(session.state().user.is_none());
    assert!(session.storage().is_empty());
}

#[tokio::test]
async fn test_verify_hydrates_user_for_token_only_session() {
    let store = MemoryStore::with_entries([(STORAGE_TOKEN_KEY, "tok")]);
    let mut session = session_with(store);
    session.initialize();
    session.api().http().mock_raw(HttpMethod::Get, "http://api.test/user", 200, USER_JSON);

    assert!(session.verify_token().await);
    assert!(session.state().is_authenticated());
    assert!(session.storage().contains(STORAGE_USER_KEY));
}

#[test]
fn test_with_state_restores_token_on_client() {
    let state = SessionState {
        user: None,
        token: Some("abc".into()),
        loading: false,
    };
    let api = ApiClient::new(MockHttpClient::new(), ClientConfig::new(BASE));
    let session = AuthSession::with_state(api, MemoryStore::new(), state.clone());
    assert_eq!(session.api().token(), Some("abc"));
    assert_eq!(session.into_state(), state);
}
