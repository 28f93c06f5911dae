//! Scenario assembly.
//!
//! [`ChaosGenerator`] owns the immutable catalog and profile table and runs the
//! generation stages in order: tool selection, deliberations interleaved with
//! reality breaks, confidence trajectory, outcome. Every scenario is checked
//! against the record invariants before it is returned.

use std::time::Duration;

use rand::seq::IndexedRandom;
use rand::RngExt;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use tracing::debug;

use crate::catalog::{self, Domain, DomainCatalog, ToolCatalog};
use crate::difficulty::{DifficultyLevel, DifficultyProfile, ProfileTable};
use crate::enhance::{enhance_or_keep, EnhancedField, EnhancementContext, TextEnhancer};
use crate::error::{ConfigError, GenerationError, ValidationError};

use super::confidence::build_trajectory;
use super::deliberation::{synthesize_deliberation, Deliberation, DeliberationContext};
use super::outcome::synthesize_outcome;
use super::reality_break::{maybe_inject_breaks, RealityBreak};
use super::scenario::{interleave, MetacognitiveMoment, Scenario};
use super::tools::select_tools;

/// Seconds between consecutive timeline events.
const EVENT_SPACING_SECS: std::ops::RangeInclusive<u32> = 120..=600;

const METACOGNITIVE_PROMPTS: &[(&str, &str)] = &[
    ("Am I overcomplicating this?", "Stepping back to reassess"),
    (
        "I keep patching symptoms instead of the cause",
        "Re-reading the original goal before the next step",
    ),
    (
        "My confidence moved faster than the evidence did",
        "Writing down what is actually known so far",
    ),
    (
        "Am I still solving the problem that was asked?",
        "Trimming the plan back to the stated task",
    ),
];

/// Options for the optional enhancement pass.
#[derive(Debug, Clone)]
pub struct EnhancementOptions {
    /// Upper bound for each enhancer call.
    pub timeout: Duration,
    /// Also rewrite voice statements, not just the scenario text.
    pub include_voices: bool,
}

impl Default for EnhancementOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            include_voices: false,
        }
    }
}

/// The progressive scenario generator.
#[derive(Debug, Clone)]
pub struct ChaosGenerator {
    catalog: ToolCatalog,
    profiles: ProfileTable,
}

impl ChaosGenerator {
    /// Creates a generator after checking that the catalog satisfies every
    /// profile.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any domain pool is too small or incomplete.
    pub fn new(catalog: ToolCatalog, profiles: ProfileTable) -> Result<Self, ConfigError> {
        catalog.validate_against(&profiles)?;
        Ok(Self { catalog, profiles })
    }

    /// Generator over the built-in catalog and profiles.
    pub fn standard() -> Result<Self, ConfigError> {
        Self::new(ToolCatalog::standard(), ProfileTable::standard())
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    /// Selects tools for `domain` at `level`.
    pub fn select_tools(
        &self,
        domain: Domain,
        level: DifficultyLevel,
        rng: &mut ChaCha8Rng,
    ) -> Result<BTreeSet<String>, ConfigError> {
        let catalog = self.catalog.domain(domain)?;
        select_tools(catalog, self.profiles.get(level), rng)
    }

    /// Generates one complete scenario.
    ///
    /// # Errors
    ///
    /// `GenerationError::Config` for catalog or profile problems,
    /// `GenerationError::Validation` if the assembled record breaks an
    /// invariant.
    pub fn generate_progressive_scenario(
        &self,
        domain: Domain,
        level: DifficultyLevel,
        rng: &mut ChaCha8Rng,
    ) -> Result<Scenario, GenerationError> {
        let catalog = self.catalog.domain(domain)?;
        let profile = self.profiles.get(level);

        let tools = select_tools(catalog, profile, rng)?;
        let task = catalog
            .tasks(profile.complex_tasks)
            .choose(rng)
            .ok_or_else(|| {
                ConfigError::Catalog(format!("domain '{}' has an empty task pool", domain))
            })?;
        let scenario_text = if profile.complication.is_empty() {
            task.clone()
        } else {
            format!("{}. {}", task, profile.complication)
        };

        self.assemble(catalog, profile, tools, scenario_text, None, rng)
    }

    /// Generates a scenario by domain and difficulty name.
    ///
    /// # Errors
    ///
    /// `ConfigError::UnknownDomain` or `ConfigError::UnknownDifficulty` for
    /// unrecognised names; nothing is generated in that case.
    pub fn generate_by_name(
        &self,
        domain: &str,
        level: &str,
        rng: &mut ChaCha8Rng,
    ) -> Result<Scenario, GenerationError> {
        let domain: Domain = domain.parse()?;
        let level: DifficultyLevel = level.parse()?;
        self.generate_progressive_scenario(domain, level, rng)
    }

    /// Generates a scenario whose text is a permutation around `usecase`.
    pub fn generate_for_usecase(
        &self,
        domain: Domain,
        level: DifficultyLevel,
        usecase: &str,
        rng: &mut ChaCha8Rng,
    ) -> Result<Scenario, GenerationError> {
        let catalog = self.catalog.domain(domain)?;
        let profile = self.profiles.get(level);

        let tools = select_tools(catalog, profile, rng)?;
        let scenario_text = catalog::usecase_scenario_text(usecase, rng);

        self.assemble(
            catalog,
            profile,
            tools,
            scenario_text,
            Some(usecase.to_string()),
            rng,
        )
    }

    /// Generates `count` usecase scenarios.
    ///
    /// With a `level`, every scenario uses it. Without one the batch spans all
    /// levels: `count / 5` per level in level order, then each remaining
    /// scenario at a randomly drawn level.
    ///
    /// # Errors
    ///
    /// The first generation error; no partial batch is returned.
    pub fn generate_usecase_batch(
        &self,
        domain: Domain,
        usecase: &str,
        count: usize,
        level: Option<DifficultyLevel>,
        rng: &mut ChaCha8Rng,
    ) -> Result<Vec<Scenario>, GenerationError> {
        let levels = match level {
            Some(level) => vec![level; count],
            None => spread_levels(count, rng),
        };
        levels
            .into_iter()
            .map(|level| self.generate_for_usecase(domain, level, usecase, rng))
            .collect()
    }

    fn assemble(
        &self,
        catalog: &DomainCatalog,
        profile: &DifficultyProfile,
        tools: BTreeSet<String>,
        scenario_text: String,
        usecase: Option<String>,
        rng: &mut ChaCha8Rng,
    ) -> Result<Scenario, GenerationError> {
        let constraints = time_constraint(profile, rng);
        let mut breaks = maybe_inject_breaks(catalog, profile, &tools, rng)?;

        let rounds = profile.deliberation_rounds.max(1);
        let mut dialogue: Vec<Deliberation> = Vec::with_capacity(rounds);
        for round in 0..rounds {
            let latest_discovery = round
                .checked_sub(1)
                .and_then(|i| breaks.get(i))
                .map(|b| b.discovery.as_str());
            let context = DeliberationContext {
                task: &scenario_text,
                catalog,
                tools: &tools,
                latest_discovery,
            };
            let prior = dialogue.last().map(|d| d.resolution.as_str());
            let deliberation = synthesize_deliberation(&context, profile, prior, rng);
            dialogue.push(deliberation);
        }

        stamp_timeline(&mut dialogue, &mut breaks, rng);

        let metacognitive_moments = dialogue
            .iter()
            .skip(1)
            .map(|d| {
                let (thought, adjustment) = METACOGNITIVE_PROMPTS
                    .choose(rng)
                    .copied()
                    .unwrap_or(("Am I overcomplicating this?", "Stepping back to reassess"));
                MetacognitiveMoment {
                    timestamp: d.timestamp,
                    thought: thought.to_string(),
                    adjustment: adjustment.to_string(),
                }
            })
            .collect();

        let initial = dialogue.first().map(|d| d.confidence).unwrap_or(50);
        let confidence_trajectory = {
            let events = interleave(&dialogue, &breaks);
            build_trajectory(initial, &events, profile, rng)
        };
        let final_outcome = synthesize_outcome(&confidence_trajectory, &breaks, profile);

        let scenario = Scenario {
            id: uuid::Uuid::new_v4().to_string(),
            domain: catalog.domain,
            difficulty: profile.level,
            scenario_text,
            constraints,
            usecase,
            tools_selected: tools,
            internal_dialogue: dialogue,
            reality_breaks: breaks,
            metacognitive_moments,
            confidence_trajectory,
            final_outcome,
        }
        .validate(&self.catalog, profile)?;

        debug!(
            id = %scenario.id,
            domain = %scenario.domain,
            difficulty = %scenario.difficulty,
            tools = scenario.tools_selected.len(),
            breaks = scenario.reality_breaks.len(),
            success = %scenario.final_outcome.success_level,
            "Generated scenario"
        );

        Ok(scenario)
    }

    /// Rewrites scenario prose through `enhancer`.
    ///
    /// Each call is bounded by `options.timeout`; a failure or timeout keeps
    /// the synthesized text for that field. Only text changes, so the result
    /// is re-validated against the same invariants.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` only if the scenario was already invalid.
    pub async fn enhance_scenario(
        &self,
        mut scenario: Scenario,
        enhancer: &dyn TextEnhancer,
        options: &EnhancementOptions,
    ) -> Result<Scenario, ValidationError> {
        let profile = self.profiles.get(scenario.difficulty);

        let text = {
            let context = EnhancementContext {
                domain: scenario.domain,
                difficulty: scenario.difficulty,
                field: EnhancedField::ScenarioText,
                tools: &scenario.tools_selected,
            };
            enhance_or_keep(enhancer, &scenario.scenario_text, &context, options.timeout).await
        };
        scenario.scenario_text = text;

        if options.include_voices {
            let tools = scenario.tools_selected.clone();
            for deliberation in &mut scenario.internal_dialogue {
                for (name, statement) in deliberation.voices.iter_mut() {
                    let context = EnhancementContext {
                        domain: scenario.domain,
                        difficulty: scenario.difficulty,
                        field: EnhancedField::VoiceStatement(*name),
                        tools: &tools,
                    };
                    let rewritten =
                        enhance_or_keep(enhancer, statement, &context, options.timeout).await;
                    *statement = rewritten;
                }
            }
        }

        scenario.validate(&self.catalog, profile)
    }
}

/// Assigns strictly increasing timestamps along the interleaved timeline.
fn stamp_timeline(
    dialogue: &mut [Deliberation],
    breaks: &mut [RealityBreak],
    rng: &mut ChaCha8Rng,
) {
    let mut clock: Option<u32> = None;
    let mut tick = |rng: &mut ChaCha8Rng| -> u32 {
        let next = match clock {
            None => 0,
            Some(c) => c.saturating_add(rng.random_range(EVENT_SPACING_SECS)),
        };
        clock = Some(next);
        next
    };

    for i in 0..dialogue.len().max(breaks.len()) {
        if let Some(d) = dialogue.get_mut(i) {
            d.timestamp = tick(rng);
        }
        if let Some(b) = breaks.get_mut(i) {
            b.timestamp = tick(rng);
        }
    }
}

/// `count / 5` of each level in order, the remainder at random levels.
fn spread_levels(count: usize, rng: &mut ChaCha8Rng) -> Vec<DifficultyLevel> {
    let all = DifficultyLevel::all();
    let per_level = count / all.len();
    let mut levels: Vec<DifficultyLevel> = all
        .iter()
        .flat_map(|level| std::iter::repeat(*level).take(per_level))
        .collect();
    while levels.len() < count {
        levels.push(all[rng.random_range(0..all.len())]);
    }
    levels
}

fn time_constraint(profile: &DifficultyProfile, rng: &mut ChaCha8Rng) -> String {
    match profile.time_budget_hours {
        None => "Time: 30 minutes".to_string(),
        Some((lo, hi)) => {
            let hours = rng.random_range(lo..=hi.max(lo));
            if hours == 1 {
                "Time: 1 hour".to_string()
            } else {
                format!("Time: {} hours", hours)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::NullEnhancer;
    use rand::SeedableRng;

    fn generator() -> ChaosGenerator {
        ChaosGenerator::standard().expect("standard generator")
    }

    #[test]
    fn test_generates_every_level() {
        let generator = generator();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for level in DifficultyLevel::all() {
            for domain in Domain::all() {
                let scenario = generator
                    .generate_progressive_scenario(domain, level, &mut rng)
                    .expect("valid scenario");
                assert_eq!(
                    scenario.confidence_trajectory.len(),
                    scenario.internal_dialogue.len() + scenario.reality_breaks.len() + 1
                );
                assert_eq!(scenario.difficulty, level);
                assert_eq!(scenario.domain, domain);
            }
        }
    }

    #[test]
    fn test_chaotic_dialogue_is_a_chain() {
        let generator = generator();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let scenario = generator
            .generate_progressive_scenario(Domain::Creative, DifficultyLevel::Chaotic, &mut rng)
            .unwrap();
        assert_eq!(scenario.internal_dialogue.len(), 3);
        assert_eq!(scenario.metacognitive_moments.len(), 2);
        for later in scenario.internal_dialogue.iter().skip(1) {
            assert!(later.resolution.contains("(revising: "));
        }
    }

    #[test]
    fn test_simple_has_no_breaks_and_short_budget() {
        let generator = generator();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let scenario = generator
            .generate_progressive_scenario(Domain::Business, DifficultyLevel::Simple, &mut rng)
            .unwrap();
        assert!(scenario.reality_breaks.is_empty());
        assert_eq!(scenario.constraints, "Time: 30 minutes");
        assert_eq!(scenario.confidence_trajectory.len(), 2);
    }

    #[test]
    fn test_unknown_names_fail_without_output() {
        let generator = generator();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(matches!(
            generator.generate_by_name("underwater", "simple", &mut rng),
            Err(GenerationError::Config(ConfigError::UnknownDomain(_)))
        ));
        assert!(matches!(
            generator.generate_by_name("technical", "legendary", &mut rng),
            Err(GenerationError::Config(ConfigError::UnknownDifficulty(_)))
        ));
    }

    #[test]
    fn test_usecase_scenario_records_usecase() {
        let generator = generator();
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let scenario = generator
            .generate_for_usecase(
                Domain::Technical,
                DifficultyLevel::Advanced,
                "rate limiting",
                &mut rng,
            )
            .unwrap();
        assert_eq!(scenario.usecase.as_deref(), Some("rate limiting"));
        assert!(scenario.scenario_text.contains("rate limiting"));
    }

    #[test]
    fn test_timestamps_increase() {
        let generator = generator();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let scenario = generator
            .generate_progressive_scenario(Domain::Research, DifficultyLevel::Chaotic, &mut rng)
            .unwrap();
        let stamps: Vec<u32> = scenario
            .timeline()
            .iter()
            .map(|e| match e {
                crate::generator::TimelineEvent::Deliberation(d) => d.timestamp,
                crate::generator::TimelineEvent::RealityBreak(b) => b.timestamp,
            })
            .collect();
        assert_eq!(stamps[0], 0);
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_usecase_batch_spans_levels() {
        let generator = generator();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let batch = generator
            .generate_usecase_batch(Domain::Business, "invoice sync", 13, None, &mut rng)
            .unwrap();

        assert_eq!(batch.len(), 13);
        for level in DifficultyLevel::all() {
            let n = batch.iter().filter(|s| s.difficulty == level).count();
            assert!((2..=5).contains(&n), "{} has {}", level, n);
        }
        let head: Vec<DifficultyLevel> = batch.iter().take(10).map(|s| s.difficulty).collect();
        assert!(head.windows(2).all(|w| w[0] <= w[1]));
        assert!(batch.iter().all(|s| s.usecase.as_deref() == Some("invoice sync")));
    }

    #[test]
    fn test_usecase_batch_fixed_level_and_small_counts() {
        let generator = generator();
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let fixed = generator
            .generate_usecase_batch(
                Domain::Research,
                "survey",
                4,
                Some(DifficultyLevel::Advanced),
                &mut rng,
            )
            .unwrap();
        assert!(fixed.iter().all(|s| s.difficulty == DifficultyLevel::Advanced));

        let few = generator
            .generate_usecase_batch(Domain::Research, "survey", 3, None, &mut rng)
            .unwrap();
        assert_eq!(few.len(), 3);
        assert!(generator
            .generate_usecase_batch(Domain::Research, "survey", 0, None, &mut rng)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_null_enhancer_keeps_text() {
        let generator = generator();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let scenario = generator
            .generate_progressive_scenario(Domain::Technical, DifficultyLevel::Advanced, &mut rng)
            .unwrap();
        let options = EnhancementOptions {
            include_voices: true,
            ..Default::default()
        };
        let enhanced = generator
            .enhance_scenario(scenario.clone(), &NullEnhancer, &options)
            .await
            .unwrap();
        assert_eq!(enhanced, scenario);
    }
}
