//! CLI tests against a mock server.
//!
//! Each test runs the `skyroute` binary with an isolated HOME and points it
//! at a wiremock server, so no network access or real credentials are needed.

mod common;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{
    find_session_file, run_cli_with_env, run_cli_with_env_failure, run_cli_with_env_success,
};

fn base_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}/xrpc", server.address().port())
}

fn tokens(access: &str, refresh: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "did": "did:plc:alice",
        "handle": "alice.bsky.social",
        "accessJwt": access,
        "refreshJwt": refresh
    }))
}

async fn login(server: &MockServer, home: &TempDir) {
    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.createSession"))
        .respond_with(tokens("A1", "R1"))
        .mount(server)
        .await;

    run_cli_with_env_success(
        &[
            "login",
            "--username",
            "alice.bsky.social",
            "--password",
            "hunter2-app-password",
        ],
        home.path(),
        &base_url(server),
    );
}

#[test]
fn test_operations_lists_catalog() {
    let home = TempDir::new().unwrap();
    let stdout = run_cli_with_env_success(&["operations"], home.path(), "https://bsky.social/xrpc");

    assert_eq!(stdout.lines().count(), 9);
    assert!(stdout.contains("feed.getTimeline"));
    assert!(stdout.contains("/com.atproto.repo.createRecord"));
}

#[test]
fn test_operations_json() {
    let home = TempDir::new().unwrap();
    let stdout = run_cli_with_env_success(
        &["operations", "--json"],
        home.path(),
        "https://bsky.social/xrpc",
    );

    let first: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(first["resource"], "repo");
    assert_eq!(first["action"], "post");
    assert_eq!(first["method"], "POST");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_stores_session_without_password() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    login(&server, &home).await;

    let session_file = find_session_file(home.path()).expect("session file written");
    let contents = std::fs::read_to_string(&session_file).unwrap();
    let stored: serde_json::Value = serde_json::from_str(&contents).unwrap();

    assert_eq!(stored["username"], "alice.bsky.social");
    assert_eq!(stored["access_jwt"], "A1");
    assert_eq!(stored["refresh_jwt"], "R1");
    assert!(!contents.contains("hunter2-app-password"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&session_file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.createSession"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "AuthenticationRequired",
            "message": "Invalid identifier or password"
        })))
        .mount(&server)
        .await;

    let stderr = run_cli_with_env_failure(
        &["login", "--username", "alice", "--password", "wrong-password"],
        home.path(),
        &base_url(&server),
    );

    assert!(stderr.contains("invalid credentials"));
    assert!(!stderr.contains("wrong-password"));
    assert!(find_session_file(home.path()).is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exec_uses_stored_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    login(&server, &home).await;

    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.actor.getProfile"))
        .and(query_param("actor", "alice.bsky.social"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "handle": "alice.bsky.social",
            "displayName": "Alice"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_with_env_success(
        &[
            "exec",
            "actor",
            "getProfile",
            "-p",
            "repo=alice.bsky.social",
            "--compact",
        ],
        home.path(),
        &base_url(&server),
    );

    let profile: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(profile["displayName"], "Alice");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exec_persists_refreshed_tokens() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    login(&server, &home).await;

    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.feed.getTimeline"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "ExpiredToken",
            "message": "Token has expired"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.refreshSession"))
        .and(header("authorization", "Bearer R1"))
        .respond_with(tokens("A2", "R2"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.feed.getTimeline"))
        .and(header("authorization", "Bearer A2"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "feed": [] })))
        .expect(1)
        .mount(&server)
        .await;

    run_cli_with_env_success(
        &["exec", "feed", "getTimeline", "-p", "limit=20"],
        home.path(),
        &base_url(&server),
    );

    let session_file = find_session_file(home.path()).unwrap();
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(session_file).unwrap()).unwrap();
    assert_eq!(stored["access_jwt"], "A2");
    assert_eq!(stored["refresh_jwt"], "R2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exec_keeps_session_when_refresh_unavailable() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    login(&server, &home).await;

    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.feed.getTimeline"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "ExpiredToken",
            "message": "Token has expired"
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.refreshSession"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let stderr = run_cli_with_env_failure(
        &["exec", "feed", "getTimeline"],
        home.path(),
        &base_url(&server),
    );
    assert!(stderr.contains("session refresh failed"));

    let session_file = find_session_file(home.path()).expect("stored session kept");
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(session_file).unwrap()).unwrap();
    assert_eq!(stored["access_jwt"], "A1");
    assert_eq!(stored["refresh_jwt"], "R1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exec_out_of_range_sends_nothing() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    login(&server, &home).await;
    let before = server.received_requests().await.unwrap().len();

    let stderr = run_cli_with_env_failure(
        &["exec", "feed", "getTimeline", "-p", "limit=500"],
        home.path(),
        &base_url(&server),
    );

    assert!(stderr.contains("limit"));
    assert_eq!(server.received_requests().await.unwrap().len(), before);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_exec_without_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();

    let stderr = run_cli_with_env_failure(
        &["exec", "feed", "getTimeline"],
        home.path(),
        &base_url(&server),
    );

    assert!(stderr.contains("skyroute login"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_revokes_and_removes_session() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    login(&server, &home).await;

    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.deleteSession"))
        .and(header("authorization", "Bearer R1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    run_cli_with_env_success(&["logout"], home.path(), &base_url(&server));

    assert!(find_session_file(home.path()).is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_refresh_command() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    login(&server, &home).await;

    Mock::given(method("POST"))
        .and(path("/xrpc/com.atproto.server.refreshSession"))
        .and(header("authorization", "Bearer R1"))
        .respond_with(tokens("A3", "R3"))
        .expect(1)
        .mount(&server)
        .await;

    run_cli_with_env_success(&["refresh"], home.path(), &base_url(&server));

    let session_file = find_session_file(home.path()).unwrap();
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(session_file).unwrap()).unwrap();
    assert_eq!(stored["access_jwt"], "A3");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connection_probe() {
    let server = MockServer::start().await;
    let home = TempDir::new().unwrap();
    login(&server, &home).await;

    Mock::given(method("GET"))
        .and(path("/xrpc/app.bsky.actor.getPreferences"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "preferences": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let stdout = run_cli_with_env_success(&["test"], home.path(), &base_url(&server));
    assert!(stdout.contains("Connection healthy"));
}
