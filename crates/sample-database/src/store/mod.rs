//! [`EntityStore`](sample_core::traits::EntityStore) implementations.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
