//! Core traits defined in `sample-core` and implemented by other crates.

pub mod cache;
pub mod entity;
pub mod repository;
pub mod store;

pub use cache::{CacheProvider, CacheService, EntryOptions};
pub use entity::Entity;
pub use repository::{ReadOnlyRepository, Repository};
pub use store::{EntityStore, StoreQuery};
