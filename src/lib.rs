//! `mt-catastrophe` library crate.
//!
//! Maximum-likelihood fitting of waiting-time distributions (Exponential,
//! Gamma, two-step Poisson) to microtubule catastrophe times, with bootstrap
//! confidence intervals and AIC-based model comparison.
//!
//! The binary (`mtc`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fitting functions can be used directly from other tools

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;

pub use data::Sample;
pub use domain::{BootstrapConfig, Family, FittedModel, Interval};
pub use error::DistError;
pub use fit::{BootstrapResult, Comparison, bootstrap_confidence_interval, compare, fit, log_likelihood};
