//! Curriculum batch assembly.
//!
//! A curriculum holds `count_per_level` scenarios for each difficulty level,
//! in level order. Within a level, domains are assigned round-robin so that
//! no two domains differ by more than one scenario. Any failing scenario
//! fails the whole batch.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Domain;
use crate::difficulty::DifficultyLevel;
use crate::error::{ConfigError, GenerationError};

use super::assembler::ChaosGenerator;
use super::scenario::Scenario;

/// An ordered, balanced batch of scenarios.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Curriculum {
    pub scenarios: Vec<Scenario>,
}

/// Scenario counts for a curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurriculumSummary {
    pub total: usize,
    pub per_level: BTreeMap<DifficultyLevel, usize>,
    pub per_domain: BTreeMap<Domain, usize>,
    /// Domain counts within each level.
    pub per_level_domain: BTreeMap<DifficultyLevel, BTreeMap<Domain, usize>>,
}

impl Curriculum {
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Scenarios at `level`, in generation order.
    pub fn by_difficulty(&self, level: DifficultyLevel) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter().filter(move |s| s.difficulty == level)
    }

    pub fn summary(&self) -> CurriculumSummary {
        let mut summary = CurriculumSummary {
            total: self.scenarios.len(),
            ..Default::default()
        };
        for scenario in &self.scenarios {
            *summary.per_level.entry(scenario.difficulty).or_default() += 1;
            *summary.per_domain.entry(scenario.domain).or_default() += 1;
            *summary
                .per_level_domain
                .entry(scenario.difficulty)
                .or_default()
                .entry(scenario.domain)
                .or_default() += 1;
        }
        summary
    }
}

/// Builds a curriculum sequentially from one random source.
///
/// `domains` defaults to all four; duplicates are ignored.
///
/// # Errors
///
/// `ConfigError::InvalidValue` for an empty domain list, or the first
/// generation error encountered.
pub fn build_curriculum(
    generator: &ChaosGenerator,
    count_per_level: usize,
    domains: Option<&[Domain]>,
    rng: &mut ChaCha8Rng,
) -> Result<Curriculum, GenerationError> {
    let domains = resolve_domains(domains)?;
    let mut scenarios = Vec::with_capacity(count_per_level * DifficultyLevel::all().len());

    for level in DifficultyLevel::all() {
        let batch = generate_level(generator, level, count_per_level, &domains, rng)?;
        scenarios.extend(batch);
    }

    Ok(Curriculum { scenarios })
}

/// Builds a curriculum with one spawned task per difficulty level.
///
/// Each task owns a generator seeded from `(seed, level)`, so the result is
/// reproducible for a given seed although it differs from the sequential
/// builder's content. Handles are joined in level order, so output order,
/// counts and domain balance match [`build_curriculum`].
///
/// # Errors
///
/// As [`build_curriculum`], plus `GenerationError::Worker` if a task panics.
pub async fn build_curriculum_parallel(
    generator: Arc<ChaosGenerator>,
    count_per_level: usize,
    domains: Option<Vec<Domain>>,
    seed: u64,
) -> Result<Curriculum, GenerationError> {
    let domains = Arc::new(resolve_domains(domains.as_deref())?);

    let mut handles = Vec::new();
    for level in DifficultyLevel::all() {
        let generator = Arc::clone(&generator);
        let domains = Arc::clone(&domains);
        handles.push(tokio::spawn(async move {
            let mut rng = ChaCha8Rng::seed_from_u64(worker_seed(seed, level));
            generate_level(&generator, level, count_per_level, &domains, &mut rng)
        }));
    }

    let mut scenarios = Vec::with_capacity(count_per_level * handles.len());
    for handle in handles {
        let batch = handle
            .await
            .map_err(|e| GenerationError::Worker(e.to_string()))??;
        scenarios.extend(batch);
    }

    Ok(Curriculum { scenarios })
}

fn generate_level(
    generator: &ChaosGenerator,
    level: DifficultyLevel,
    count: usize,
    domains: &[Domain],
    rng: &mut ChaCha8Rng,
) -> Result<Vec<Scenario>, GenerationError> {
    let offset = level.index() * count;
    let mut batch = Vec::with_capacity(count);
    for i in 0..count {
        let domain = domains[(offset + i) % domains.len()];
        batch.push(generator.generate_progressive_scenario(domain, level, rng)?);
    }
    tracing::info!(level = %level, count = batch.len(), "Generated curriculum level");
    Ok(batch)
}

fn resolve_domains(domains: Option<&[Domain]>) -> Result<Vec<Domain>, ConfigError> {
    let Some(requested) = domains else {
        return Ok(Domain::all().to_vec());
    };
    let mut resolved: Vec<Domain> = Vec::with_capacity(requested.len());
    for domain in requested {
        if !resolved.contains(domain) {
            resolved.push(*domain);
        }
    }
    if resolved.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: "domains".to_string(),
            message: "at least one domain is required".to_string(),
        });
    }
    Ok(resolved)
}

fn worker_seed(seed: u64, level: DifficultyLevel) -> u64 {
    seed ^ (level.index() as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
