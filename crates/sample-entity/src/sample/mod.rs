//! Sample domain entities.

pub mod model;

pub use model::{CreateSample, Sample, UpdateSample};
