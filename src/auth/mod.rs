pub mod basic;
pub mod credentials;
pub mod digest;
pub mod error;
pub mod header;
pub mod nonce;
pub mod verifier;

// Re-export the verifier surface so callers can "use crate::auth::*;"
pub use credentials::Credentials;
pub use error::AuthError;
pub use verifier::{AuthRequest, AuthResult, RequestInfo, Verifier};
