#![allow(dead_code)]

use authgate::auth::digest::{compute_expected_digest, DigestAlgorithm, DigestContext};
use authgate::auth::header::parse_auth_params;
use authgate::auth::Credentials;
use authgate::config::{config_from_yaml, ConfigV1};
use authgate::routes::create_router;
use authgate::startup::build_state;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use base64::{engine::general_purpose, Engine as _};

pub fn load_test_config(yaml: &str) -> ConfigV1 {
    config_from_yaml(yaml).expect("Failed to parse test config YAML")
}

pub fn build_app(yaml: &str) -> Router {
    let state = build_state(load_test_config(yaml)).expect("Failed to build app state");
    create_router(state)
}

pub fn request(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn request_with_authorization(path: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn request_with_basic(path: &str, credentials: &str) -> Request<Body> {
    let encoded = general_purpose::STANDARD.encode(credentials);
    request_with_authorization(path, &format!("Basic {}", encoded))
}

pub fn challenge_of<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .expect("WWW-Authenticate header missing")
        .to_str()
        .expect("WWW-Authenticate header not valid UTF-8")
        .to_string()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    String::from_utf8(bytes.to_vec()).expect("body not valid UTF-8")
}

/// Parameters of a `Digest` challenge, by lower-case name.
pub struct DigestChallenge {
    params: Vec<(String, String)>,
}

impl DigestChallenge {
    pub fn parse(challenge: &str) -> Self {
        let params = challenge
            .strip_prefix("Digest ")
            .expect("challenge is not a Digest challenge");
        Self {
            params: parse_auth_params(params).expect("challenge parameters should parse"),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn param(&self, name: &str) -> &str {
        self.get(name)
            .unwrap_or_else(|| panic!("challenge has no '{}' parameter", name))
    }

    /// An `Authorization` value answering this challenge like a browser would.
    pub fn answer(&self, username: &str, password: &str, uri: &str, nc: u32) -> String {
        let algorithm =
            DigestAlgorithm::from_token(self.param("algorithm")).expect("known algorithm");
        let credentials = Credentials::new(username, password).expect("valid credentials");
        let nc = format!("{:08x}", nc);
        let cnonce = "0a4f113b";
        let response = compute_expected_digest(
            algorithm,
            &credentials,
            &DigestContext {
                realm: self.param("realm"),
                method: "GET",
                uri,
                nonce: self.param("nonce"),
                nc: &nc,
                cnonce,
                qop: "auth",
            },
        );

        format!(
            r#"Digest username="{}", realm="{}", nonce="{}", uri="{}", algorithm={}, qop=auth, nc={}, cnonce="{}", response="{}", opaque="{}""#,
            username,
            self.param("realm"),
            self.param("nonce"),
            uri,
            algorithm.as_str(),
            nc,
            cnonce,
            response,
            self.param("opaque"),
        )
    }
}
