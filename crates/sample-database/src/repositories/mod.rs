//! Repository implementations.

pub mod base;

pub use base::BaseRepository;
