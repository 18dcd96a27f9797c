use super::credentials::Credentials;
use super::error::AuthError;
use super::header::{quote, BasicCredentials};

/// `WWW-Authenticate` value for the Basic scheme (RFC 7617).
pub fn basic_challenge(realm: &str) -> String {
    format!("Basic realm={}, charset=\"UTF-8\"", quote(realm))
}

/// Compare decoded Basic credentials with the expected pair.
pub fn check_basic(expected: &Credentials, supplied: &BasicCredentials) -> Result<(), AuthError> {
    if expected.matches(&supplied.username, &supplied.password) {
        Ok(())
    } else {
        Err(AuthError::CredentialMismatch)
    }
}
