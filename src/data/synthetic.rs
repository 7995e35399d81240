//! Synthetic catastrophe times drawn from a known family.
//!
//! Useful for checking that a fit recovers the parameters it was generated
//! with, and for the `simulate` subcommand.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::data::sample::Sample;
use crate::domain::Family;
use crate::error::DistError;
use crate::models::draw;

/// Draw `size` waiting times from `family` with `params`.
///
/// Without an explicit `seed` the RNG is seeded from a hash of the request, so
/// the same call always yields the same sample.
pub fn simulate(family: Family, params: &[f64], size: usize, seed: Option<u64>) -> Result<Sample, DistError> {
    if size == 0 {
        return Err(DistError::parameter("sample size must be > 0"));
    }
    family.check_param_len(params)?;

    let seed = seed.unwrap_or_else(|| request_seed(family, params, size));
    let mut rng = StdRng::seed_from_u64(seed);
    let values = draw(family, params, size, &mut rng)?;
    debug!(family = %family, ?params, size, seed, "simulated sample");

    Sample::new(values)
}

fn request_seed(family: Family, params: &[f64], size: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    family.hash(&mut hasher);
    for p in params {
        p.to_bits().hash(&mut hasher);
    }
    size.hash(&mut hasher);
    hasher.finish()
}
