use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use subtle::Choice;

use super::credentials::{choice_eq, ct_eq, Credentials};
use super::error::AuthError;
use super::header::{quote, DigestResponse};
use super::nonce::{NonceIssuer, NonceValidity};
use crate::store::{NonceStatus, NonceStore};

/// Hash algorithms a Digest challenge may advertise (RFC 7616 section 6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, JsonSchema)]
pub enum DigestAlgorithm {
    #[default]
    #[serde(rename = "MD5")]
    Md5,
    #[serde(rename = "MD5-sess")]
    Md5Sess,
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "SHA-256-sess")]
    Sha256Sess,
    #[serde(rename = "SHA-512-256")]
    Sha512_256,
    #[serde(rename = "SHA-512-256-sess")]
    Sha512_256Sess,
}

type HashFn = fn(&[u8]) -> String;

impl DigestAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Md5Sess => "MD5-sess",
            Self::Sha256 => "SHA-256",
            Self::Sha256Sess => "SHA-256-sess",
            Self::Sha512_256 => "SHA-512-256",
            Self::Sha512_256Sess => "SHA-512-256-sess",
        }
    }

    /// Look up the `algorithm` parameter of a header, ignoring case.
    pub fn from_token(token: &str) -> Option<Self> {
        [
            Self::Md5,
            Self::Md5Sess,
            Self::Sha256,
            Self::Sha256Sess,
            Self::Sha512_256,
            Self::Sha512_256Sess,
        ]
        .into_iter()
        .find(|alg| alg.as_str().eq_ignore_ascii_case(token))
    }

    pub fn is_session(&self) -> bool {
        matches!(self, Self::Md5Sess | Self::Sha256Sess | Self::Sha512_256Sess)
    }

    /// Lower-case hex digest of `input`.
    pub fn hash(&self, input: &[u8]) -> String {
        (self.hash_fn())(input)
    }

    fn hash_fn(&self) -> HashFn {
        match self {
            Self::Md5 | Self::Md5Sess => hash_md5,
            Self::Sha256 | Self::Sha256Sess => hash_sha256,
            Self::Sha512_256 | Self::Sha512_256Sess => hash_sha512_trunc256,
        }
    }
}

/// Request and challenge values that enter the response digest.
#[derive(Debug, Clone, Copy)]
pub struct DigestContext<'a> {
    pub realm: &'a str,
    pub method: &'a str,
    pub uri: &'a str,
    pub nonce: &'a str,
    pub nc: &'a str,
    pub cnonce: &'a str,
    pub qop: &'a str,
}

/// The `response` value a client knowing `credentials` would send:
///
/// `H(HA1:nonce:nc:cnonce:qop:H(method:uri))` with `HA1 = H(user:realm:pass)`,
/// or `H(HA1:nonce:cnonce)` on top of that for `-sess` algorithms.
pub fn compute_expected_digest(
    algorithm: DigestAlgorithm,
    credentials: &Credentials,
    ctx: &DigestContext<'_>,
) -> String {
    let hash = algorithm.hash_fn();

    let mut ha1 = hash(
        [
            credentials.username().as_bytes(),
            b":",
            ctx.realm.as_bytes(),
            b":",
            credentials.password().as_bytes(),
        ]
        .concat()
        .as_slice(),
    );

    if algorithm.is_session() {
        ha1 = hash(format!("{}:{}:{}", ha1, ctx.nonce, ctx.cnonce).as_bytes());
    }

    let ha2 = hash(format!("{}:{}", ctx.method, ctx.uri).as_bytes());

    hash(
        format!(
            "{}:{}:{}:{}:{}:{}",
            ha1, ctx.nonce, ctx.nc, ctx.cnonce, ctx.qop, ha2
        )
        .as_bytes(),
    )
}

/// The hashed form of the username sent when `userhash=true` (RFC 7616 section 3.4.4).
pub fn hashed_username(algorithm: DigestAlgorithm, username: &str, realm: &str) -> String {
    algorithm.hash(format!("{}:{}", username, realm).as_bytes())
}

/// Server side of the Digest scheme: issues challenges and checks responses.
pub struct DigestScheme {
    algorithm: DigestAlgorithm,
    issuer: NonceIssuer,
    opaque: String,
    store: Arc<dyn NonceStore>,
}

impl DigestScheme {
    pub fn new(algorithm: DigestAlgorithm, issuer: NonceIssuer, store: Arc<dyn NonceStore>) -> Self {
        Self {
            algorithm,
            issuer,
            opaque: uuid::Uuid::new_v4().simple().to_string(),
            store,
        }
    }

    /// `WWW-Authenticate` value carrying a freshly issued nonce.
    pub fn challenge(&self, realm: &str, stale: bool) -> String {
        let nonce = self.issuer.issue();
        self.store.issue(&nonce);

        let mut challenge = format!(
            "Digest realm={}, qop=\"auth\", algorithm={}, nonce={}, opaque={}",
            quote(realm),
            self.algorithm.as_str(),
            quote(&nonce),
            quote(&self.opaque)
        );
        if stale {
            challenge.push_str(", stale=true");
        }
        challenge
    }

    /// Check a client response for a request with the given method and target.
    ///
    /// The username and response digest are compared together in constant
    /// time. The nonce store is consulted only once the digest is proven
    /// correct, so garbage responses cannot advance a nonce-count.
    pub fn check(
        &self,
        credentials: &Credentials,
        realm: &str,
        method: &str,
        uri: &str,
        response: &DigestResponse,
    ) -> Result<(), AuthError> {
        if response.realm != realm {
            return Err(AuthError::ParameterMismatch("realm"));
        }

        let algorithm = match response.algorithm.as_deref() {
            None => DigestAlgorithm::Md5,
            Some(token) => DigestAlgorithm::from_token(token).ok_or(AuthError::UnsupportedAlgorithm)?,
        };
        if algorithm != self.algorithm {
            return Err(AuthError::UnsupportedAlgorithm);
        }

        if !response.qop.eq_ignore_ascii_case("auth") {
            return Err(AuthError::ParameterMismatch("qop"));
        }
        if response.uri != uri {
            return Err(AuthError::ParameterMismatch("uri"));
        }
        match &response.opaque {
            Some(opaque) if ct_eq(opaque.as_bytes(), self.opaque.as_bytes()) => {}
            _ => return Err(AuthError::ParameterMismatch("opaque")),
        }

        let freshness = self.issuer.validate(&response.nonce);
        if freshness == NonceValidity::Forged {
            return Err(AuthError::ForgedNonce);
        }

        let user_ok: Choice = if response.userhash {
            let expected = hashed_username(algorithm, credentials.username(), realm);
            choice_eq(response.username.to_ascii_lowercase().as_bytes(), expected.as_bytes())
        } else {
            choice_eq(response.username.as_bytes(), credentials.username().as_bytes())
        };

        let expected = compute_expected_digest(
            algorithm,
            credentials,
            &DigestContext {
                realm,
                method,
                uri,
                nonce: &response.nonce,
                nc: &response.nc,
                cnonce: &response.cnonce,
                qop: &response.qop,
            },
        );
        let digest_ok = choice_eq(
            response.response.to_ascii_lowercase().as_bytes(),
            expected.as_bytes(),
        );

        if !bool::from(user_ok & digest_ok) {
            return Err(AuthError::CredentialMismatch);
        }

        if freshness == NonceValidity::Stale {
            return Err(AuthError::StaleNonce);
        }

        match self.store.check(&response.nonce, response.nonce_count()) {
            NonceStatus::Fresh | NonceStatus::Untracked => Ok(()),
            NonceStatus::Unknown | NonceStatus::Expired => Err(AuthError::StaleNonce),
            NonceStatus::Replayed => Err(AuthError::ReplayedNonce),
        }
    }
}

fn hash_md5(i: &[u8]) -> String {
    format!("{:x}", md5::compute(i))
}

fn hash_sha256(i: &[u8]) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(i);
    format!("{:x}", hasher.finalize())
}

fn hash_sha512_trunc256(i: &[u8]) -> String {
    let mut hasher = sha2::Sha512_256::new();
    hasher.update(i);
    format!("{:x}", hasher.finalize())
}
