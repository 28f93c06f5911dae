//! Tool selection for a scenario.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::RngExt;
use rand_chacha::ChaCha8Rng;

use crate::catalog::DomainCatalog;
use crate::difficulty::DifficultyProfile;
use crate::error::ConfigError;

/// Draws a set of distinct tools for one scenario.
///
/// The count is uniform within `profile.tool_count_range`; tools are sampled
/// without replacement from the domain pool.
///
/// # Errors
///
/// Returns `ConfigError::InvalidProfile` for an empty or inverted range and
/// `ConfigError::PoolTooSmall` when the pool cannot reach the range minimum.
pub fn select_tools(
    catalog: &DomainCatalog,
    profile: &DifficultyProfile,
    rng: &mut ChaCha8Rng,
) -> Result<BTreeSet<String>, ConfigError> {
    let (min, max) = profile.tool_count_range;
    if min == 0 || min > max {
        return Err(ConfigError::InvalidProfile {
            level: profile.level.to_string(),
            reason: format!("unusable tool_count_range ({}, {})", min, max),
        });
    }

    let pool_size = catalog.tools.len();
    if pool_size < min {
        return Err(ConfigError::PoolTooSmall {
            domain: catalog.domain.to_string(),
            level: profile.level.to_string(),
            pool: pool_size,
            required: min,
        });
    }

    let count = rng.random_range(min..=max.min(pool_size));

    let mut names: Vec<&str> = catalog.tool_names().collect();
    names.shuffle(rng);
    names.truncate(count);

    Ok(names.into_iter().map(str::to_string).collect())
}
