//! Domain types used throughout the library.
//!
//! This module defines:
//!
//! - the candidate model families (`Family`)
//! - fit outputs (`FittedModel`, `Interval`)
//! - saved fits (`ModelFile`, `CdfGrid`)
//! - run configuration (`BootstrapConfig`, `FitConfig`, `RowFilter`)

pub mod types;

pub use types::*;
