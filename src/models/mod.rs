//! Densities, distribution functions and samplers for each model family.
//!
//! Models are implemented as small, pure functions so that fitting/search code can
//! stay generic. `model` dispatches on [`Family`](crate::domain::Family) with
//! parameter slices; the per-family modules take scalar parameters.

pub mod exponential;
pub mod gamma;
pub mod model;
pub mod two_step;

pub use model::*;
