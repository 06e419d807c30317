//! # sample-core
//!
//! Core crate for Clean Sample. Contains the entity contract, repository,
//! store and cache traits, configuration schemas, pagination and expression
//! types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other workspace crates.

pub mod cancel;
pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
