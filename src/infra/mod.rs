//! In-memory resource adapters used by tests, benches and docs.

pub mod memory;

pub use memory::{InsertRow, MemoryConnection, MemoryConnector, MemoryDatabase, Row};
