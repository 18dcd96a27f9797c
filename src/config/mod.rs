// This module re-exports important pieces for convenience,
// so we can "use crate::config::*" easily.
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;

pub use self::auth::*;
pub use self::config::*;
pub use self::error::*;
pub use self::logging::*;
pub use self::store::*;
