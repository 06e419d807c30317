//! # sample-database
//!
//! SQLite connection management, the [`EntityStore`] implementations and
//! the soft-delete [`BaseRepository`].
//!
//! [`EntityStore`]: sample_core::traits::EntityStore

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use repositories::BaseRepository;
pub use store::{MemoryStore, SqliteStore};
