//! Maximum-likelihood fitting and everything built on top of it.
//!
//! Responsibilities:
//!
//! - closed-form / Newton / simplex MLE per family
//! - coarse rate grids to seed the two-step optimizer (parallel)
//! - percentile bootstrap intervals
//! - compare families using AIC + guardrails

pub mod bootstrap;
pub mod grid;
pub mod mle;
pub mod selection;

pub use bootstrap::*;
pub use grid::*;
pub use mle::*;
pub use selection::*;
