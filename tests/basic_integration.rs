mod common;

use axum::http::StatusCode;
use common::{body_string, build_app, challenge_of, request, request_with_authorization, request_with_basic};
use tower::ServiceExt;

const TEST_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:8081
logging:
  level: "debug"
  format: "json"
auth:
  scheme: basic
  realm: "authgate"
  username: joe
  password: Password1
"#;

#[tokio::test]
async fn integration_basic_auth_flow() {
    let app = build_app(TEST_CONFIG);

    let response = app
        .oneshot(request_with_basic("/", "joe:Password1"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Authenticated!");
}

#[tokio::test]
async fn integration_basic_auth_any_path() {
    let app = build_app(TEST_CONFIG);

    let response = app
        .oneshot(request_with_basic("/some/deep/path?x=1", "joe:Password1"))
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn integration_basic_auth_failure() {
    let app = build_app(TEST_CONFIG);

    let response = app
        .oneshot(request_with_basic("/", "joe:Password2"))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        challenge_of(&response),
        r#"Basic realm="authgate", charset="UTF-8""#
    );
    let body = body_string(response).await;
    assert!(!body.contains("Authenticated!"));
    assert!(!body.contains("mismatch"));
}

#[tokio::test]
async fn integration_basic_no_credentials_gets_challenge() {
    let app = build_app(TEST_CONFIG);

    let response = app
        .oneshot(request("/"))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(challenge_of(&response).starts_with("Basic realm=\"authgate\""));
}

#[tokio::test]
async fn integration_basic_rejects_other_schemes_and_garbage() {
    let app = build_app(TEST_CONFIG);

    for value in ["Bearer abc.def", "Basic !!!not-base64!!!", "Basic", "Digest username=\"joe\""] {
        let response = app
            .clone()
            .oneshot(request_with_authorization("/", value))
            .await
            .expect("request should complete");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", value);
        assert!(challenge_of(&response).starts_with("Basic "));
    }
}

#[tokio::test]
async fn integration_health_is_open() {
    let app = build_app(TEST_CONFIG);

    let response = app
        .oneshot(request("/health"))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "OK");
}

#[tokio::test]
async fn integration_metrics_count_outcomes() {
    let app = build_app(TEST_CONFIG);

    app.clone()
        .oneshot(request_with_basic("/", "joe:Password1"))
        .await
        .expect("request should complete");
    app.clone()
        .oneshot(request_with_basic("/", "joe:nope"))
        .await
        .expect("request should complete");
    app.clone()
        .oneshot(request("/"))
        .await
        .expect("request should complete");

    let response = app
        .oneshot(request("/metrics"))
        .await
        .expect("request should complete");
    assert_eq!(response.status(), StatusCode::OK);

    let text = body_string(response).await;
    assert!(text.contains(r#"auth_requests_total{result="authenticated",scheme="basic"} 1"#));
    assert!(text.contains(r#"auth_requests_total{result="invalid_credentials",scheme="basic"} 1"#));
    assert!(text.contains(r#"auth_requests_total{result="no_credentials",scheme="basic"} 1"#));
}

#[tokio::test]
async fn integration_scheme_none_is_open() {
    let app = build_app(
        r#"
version: "1.0.0"
bind_address: 127.0.0.1:8081
auth:
  scheme: none
"#,
    );

    let response = app
        .oneshot(request("/anything"))
        .await
        .expect("request should complete");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Authenticated!");
}

#[test]
fn integration_empty_password_is_fatal() {
    let config = common::load_test_config(
        r#"
version: "1.0.0"
bind_address: 127.0.0.1:8081
auth:
  username: joe
  password: ""
"#,
    );

    assert!(matches!(
        authgate::startup::build_state(config),
        Err(authgate::config::ConfigError::EmptyPassword)
    ));
}
