//! # sample-entity
//!
//! Domain entity models for Clean Sample. Every persisted struct in this
//! crate derives `Debug`, `Clone`, `Serialize`, `Deserialize` and
//! `sqlx::FromRow`, and implements [`sample_core::traits::Entity`].

pub mod sample;
