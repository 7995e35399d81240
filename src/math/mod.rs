//! Mathematical utilities: special functions, descriptive statistics and a
//! derivative-free minimizer.

pub mod optimize;
pub mod special;
pub mod stats;

pub use optimize::*;
pub use stats::*;
