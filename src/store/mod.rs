pub mod base;
pub mod memory_store;
pub mod no_store;

// Re-export the primary store items so code outside can do
// "use crate::store::{NonceStore, create_store};"
pub use base::{create_store, NonceStatus, NonceStore};
