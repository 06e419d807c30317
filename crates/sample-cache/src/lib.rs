//! # sample-cache
//!
//! Caching for Clean Sample:
//!
//! - [`memory::MemoryCacheProvider`]: in-process store built on
//!   [moka](https://crates.io/crates/moka) with absolute and sliding expiry
//! - [`memory::MemoryCacheService`]: key tracking, pattern removal and
//!   failure absorption over any provider
//! - [`CachedRepository`]: cache-aside decorator for any repository
//!
//! Everything is process-local. Several instances sharing one database
//! will each serve their own, possibly stale, entries.

pub mod keys;
pub mod memory;
pub mod provider;
pub mod repository;

pub use provider::CacheManager;
pub use repository::CachedRepository;
