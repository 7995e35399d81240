//! Observation containers and synthetic data.

pub mod sample;
pub mod synthetic;

pub use sample::*;
pub use synthetic::*;
