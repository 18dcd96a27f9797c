mod common;

use axum::http::StatusCode;
use common::{
    body_string, build_app, challenge_of, request, request_with_authorization, DigestChallenge,
};
use tower::ServiceExt;

const TEST_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:8081
auth:
  scheme: digest
  realm: "authgate"
  username: joe
  password: Password1
  digest:
    algorithm: SHA-256
  nonce_store:
    enabled: true
    capacity: 64
"#;

async fn fetch_challenge(app: &axum::Router, path: &str) -> DigestChallenge {
    let response = app
        .clone()
        .oneshot(request(path))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    DigestChallenge::parse(&challenge_of(&response))
}

#[tokio::test]
async fn integration_digest_challenge_shape() {
    let app = build_app(TEST_CONFIG);
    let challenge = fetch_challenge(&app, "/").await;

    assert_eq!(challenge.param("realm"), "authgate");
    assert_eq!(challenge.param("qop"), "auth");
    assert_eq!(challenge.param("algorithm"), "SHA-256");
    assert!(!challenge.param("nonce").is_empty());
    assert!(!challenge.param("opaque").is_empty());
    assert!(challenge.get("stale").is_none());
}

#[tokio::test]
async fn integration_digest_auth_flow() {
    let app = build_app(TEST_CONFIG);
    let challenge = fetch_challenge(&app, "/index.html").await;

    let response = app
        .oneshot(request_with_authorization(
            "/index.html",
            &challenge.answer("joe", "Password1", "/index.html", 1),
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Authenticated!");
}

#[tokio::test]
async fn integration_digest_wrong_password() {
    let app = build_app(TEST_CONFIG);
    let challenge = fetch_challenge(&app, "/").await;

    let response = app
        .oneshot(request_with_authorization(
            "/",
            &challenge.answer("joe", "Password2", "/", 1),
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let retry = DigestChallenge::parse(&challenge_of(&response));
    assert!(retry.get("stale").is_none());
    assert_ne!(retry.param("nonce"), challenge.param("nonce"));
}

#[tokio::test]
async fn integration_digest_nonce_count_replay_rejected() {
    let app = build_app(TEST_CONFIG);
    let challenge = fetch_challenge(&app, "/").await;
    let first = challenge.answer("joe", "Password1", "/", 1);

    let response = app
        .clone()
        .oneshot(request_with_authorization("/", &first))
        .await
        .expect("request should complete");
    assert_eq!(response.status(), StatusCode::OK);

    let replay = app
        .clone()
        .oneshot(request_with_authorization("/", &first))
        .await
        .expect("request should complete");
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    let next = app
        .oneshot(request_with_authorization(
            "/",
            &challenge.answer("joe", "Password1", "/", 2),
        ))
        .await
        .expect("request should complete");
    assert_eq!(next.status(), StatusCode::OK);
}

#[tokio::test]
async fn integration_digest_uri_must_match_request() {
    let app = build_app(TEST_CONFIG);
    let challenge = fetch_challenge(&app, "/").await;

    let response = app
        .oneshot(request_with_authorization(
            "/admin",
            &challenge.answer("joe", "Password1", "/public", 1),
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn integration_digest_nonce_from_other_instance_rejected() {
    let app = build_app(TEST_CONFIG);
    let other = build_app(TEST_CONFIG);
    let foreign = fetch_challenge(&other, "/").await;

    let response = app
        .oneshot(request_with_authorization(
            "/",
            &foreign.answer("joe", "Password1", "/", 1),
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn integration_digest_expired_nonce_is_stale() {
    let app = build_app(
        r#"
version: "1.0.0"
bind_address: 127.0.0.1:8081
auth:
  scheme: digest
  username: joe
  password: Password1
  digest:
    nonce_ttl_secs: 1
"#,
    );
    let challenge = fetch_challenge(&app, "/").await;

    tokio::time::sleep(std::time::Duration::from_millis(2100)).await;

    let response = app
        .clone()
        .oneshot(request_with_authorization(
            "/",
            &challenge.answer("joe", "Password1", "/", 1),
        ))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let retry = DigestChallenge::parse(&challenge_of(&response));
    assert_eq!(retry.get("stale"), Some("true"));

    let response = app
        .oneshot(request_with_authorization(
            "/",
            &retry.answer("joe", "Password1", "/", 1),
        ))
        .await
        .expect("request should complete");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn integration_digest_rejects_basic() {
    let app = build_app(TEST_CONFIG);

    let response = app
        .oneshot(common::request_with_basic("/", "joe:Password1"))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(challenge_of(&response).starts_with("Digest "));
}
