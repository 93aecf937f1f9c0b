//! Async runtime adapters.

#[cfg(feature = "tokio-runtime")]
pub mod tokio_bridge;
