//! In-process cache built on moka.

pub mod service;
pub mod store;

pub use service::MemoryCacheService;
pub use store::MemoryCacheProvider;
