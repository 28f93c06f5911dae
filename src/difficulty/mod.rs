//! Difficulty system for chaos-forge scenarios.
//!
//! Each [`DifficultyLevel`] maps to one immutable [`DifficultyProfile`] that
//! controls tool counts, reality-break pressure, deliberation depth and
//! confidence volatility. Profiles are held in a [`ProfileTable`] built once
//! and passed by reference into every generation step.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The difficulty level of a scenario, ordered by increasing complexity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    /// Single tool, straightforward.
    Simple,
    /// One or two tools, minor complications.
    Basic,
    /// Two or three tools, reality breaks.
    Intermediate,
    /// Three or four tools, multiple pivots.
    Advanced,
    /// Four or more tools, constant adaptation.
    Chaotic,
}

impl DifficultyLevel {
    /// Returns all levels in curriculum order.
    pub fn all() -> [DifficultyLevel; 5] {
        [
            DifficultyLevel::Simple,
            DifficultyLevel::Basic,
            DifficultyLevel::Intermediate,
            DifficultyLevel::Advanced,
            DifficultyLevel::Chaotic,
        ]
    }

    /// Returns the lowercase name used in records and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Simple => "simple",
            DifficultyLevel::Basic => "basic",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
            DifficultyLevel::Chaotic => "chaotic",
        }
    }

    /// Position of this level in [`DifficultyLevel::all`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(DifficultyLevel::Simple),
            "basic" => Ok(DifficultyLevel::Basic),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            "chaotic" => Ok(DifficultyLevel::Chaotic),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Smallest accepted volatility. A stated confidence of 100 is clamped to the
/// 95 ceiling on the first step, so a step bound below 5 points could not hold.
pub const MIN_CONFIDENCE_VOLATILITY: f64 = 0.05;

/// Parameter set controlling complexity scaling for one difficulty level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Level this profile belongs to.
    pub level: DifficultyLevel,
    /// Inclusive (min, max) number of tools to select.
    pub tool_count_range: (usize, usize),
    /// Probability that each break slot fires.
    pub reality_break_chance: f64,
    /// Number of independent break slots.
    pub max_reality_breaks: usize,
    /// Number of voices per deliberation (2..=4).
    pub voice_count: usize,
    /// Scales single-step confidence movement; a step never exceeds `volatility * 100`.
    pub confidence_volatility: f64,
    /// Deliberations per scenario (escalation points).
    pub deliberation_rounds: usize,
    /// Mean of the stated confidence distribution.
    pub confidence_mean: f64,
    /// Standard deviation of the stated confidence distribution.
    pub confidence_std_dev: f64,
    /// Inclusive hour range for the time constraint; `None` means a 30 minute budget.
    pub time_budget_hours: Option<(u32, u32)>,
    /// Whether the scenario text is drawn from the complex task pool.
    pub complex_tasks: bool,
    /// Sentence appended to the task description.
    pub complication: String,
    /// Reported complexity score (1-10).
    pub complexity_score: f64,
}

impl DifficultyProfile {
    /// Returns the built-in profile for `level`.
    pub fn standard(level: DifficultyLevel) -> Self {
        match level {
            DifficultyLevel::Simple => DifficultyProfile {
                level,
                tool_count_range: (1, 2),
                reality_break_chance: 0.0,
                max_reality_breaks: 0,
                voice_count: 2,
                confidence_volatility: 0.10,
                deliberation_rounds: 1,
                confidence_mean: 88.0,
                confidence_std_dev: 4.0,
                time_budget_hours: None,
                complex_tasks: false,
                complication: String::new(),
                complexity_score: 1.0,
            },
            DifficultyLevel::Basic => DifficultyProfile {
                level,
                tool_count_range: (1, 2),
                reality_break_chance: 0.25,
                max_reality_breaks: 1,
                voice_count: 2,
                confidence_volatility: 0.15,
                deliberation_rounds: 1,
                confidence_mean: 80.0,
                confidence_std_dev: 6.0,
                time_budget_hours: Some((1, 2)),
                complex_tasks: false,
                complication: "But the system is running slowly.".to_string(),
                complexity_score: 2.0,
            },
            DifficultyLevel::Intermediate => DifficultyProfile {
                level,
                tool_count_range: (2, 3),
                reality_break_chance: 0.60,
                max_reality_breaks: 2,
                voice_count: 3,
                confidence_volatility: 0.20,
                deliberation_rounds: 1,
                confidence_mean: 72.0,
                confidence_std_dev: 9.0,
                time_budget_hours: Some((1, 4)),
                complex_tasks: false,
                complication: "But multiple things go wrong.".to_string(),
                complexity_score: 4.0,
            },
            DifficultyLevel::Advanced => DifficultyProfile {
                level,
                tool_count_range: (3, 4),
                reality_break_chance: 0.70,
                max_reality_breaks: 3,
                voice_count: 4,
                confidence_volatility: 0.28,
                deliberation_rounds: 2,
                confidence_mean: 64.0,
                confidence_std_dev: 12.0,
                time_budget_hours: Some((2, 6)),
                complex_tasks: true,
                complication: "The CEO is watching.".to_string(),
                complexity_score: 7.0,
            },
            DifficultyLevel::Chaotic => DifficultyProfile {
                level,
                tool_count_range: (4, 6),
                reality_break_chance: 0.85,
                max_reality_breaks: 4,
                voice_count: 4,
                confidence_volatility: 0.35,
                deliberation_rounds: 3,
                confidence_mean: 56.0,
                confidence_std_dev: 15.0,
                time_budget_hours: Some((1, 6)),
                complex_tasks: true,
                complication: "Everything that can go wrong does.".to_string(),
                complexity_score: 9.0,
            },
        }
    }

    /// Largest single-step confidence change allowed by this profile.
    pub fn max_confidence_step(&self) -> f64 {
        self.confidence_volatility * 100.0
    }

    /// Checks the profile's internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidProfile` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |reason: &str| {
            Err(ConfigError::InvalidProfile {
                level: self.level.to_string(),
                reason: reason.to_string(),
            })
        };

        let (min, max) = self.tool_count_range;
        if min == 0 {
            return fail("tool_count_range minimum must be at least 1");
        }
        if min > max {
            return fail("tool_count_range minimum exceeds maximum");
        }
        if !(0.0..=1.0).contains(&self.reality_break_chance) {
            return fail("reality_break_chance must be between 0.0 and 1.0");
        }
        if !(2..=4).contains(&self.voice_count) {
            return fail("voice_count must be between 2 and 4");
        }
        if !(MIN_CONFIDENCE_VOLATILITY..=1.0).contains(&self.confidence_volatility) {
            return fail("confidence_volatility must be in [0.05, 1.0]");
        }
        if self.deliberation_rounds == 0 {
            return fail("deliberation_rounds must be at least 1");
        }
        if !(0.0..=100.0).contains(&self.confidence_mean) || self.confidence_std_dev < 0.0 {
            return fail("confidence distribution must have a mean in [0, 100] and a non-negative spread");
        }
        if let Some((lo, hi)) = self.time_budget_hours {
            if lo == 0 || lo > hi {
                return fail("time_budget_hours must be a non-empty range of whole hours");
            }
        }
        Ok(())
    }
}

/// Immutable registry holding one profile per difficulty level.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: [DifficultyProfile; 5],
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ProfileTable {
    /// Builds the built-in profile table.
    pub fn standard() -> Self {
        Self {
            profiles: DifficultyLevel::all().map(DifficultyProfile::standard),
        }
    }

    /// Builds a table from custom profiles, one per level in level order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidProfile` if a profile is out of order or
    /// internally inconsistent.
    pub fn new(profiles: [DifficultyProfile; 5]) -> Result<Self, ConfigError> {
        for (expected, profile) in DifficultyLevel::all().iter().zip(profiles.iter()) {
            if profile.level != *expected {
                return Err(ConfigError::InvalidProfile {
                    level: profile.level.to_string(),
                    reason: format!("profile listed in the slot for '{}'", expected),
                });
            }
            profile.validate()?;
        }
        Ok(Self { profiles })
    }

    /// Returns the profile for `level`.
    pub fn get(&self, level: DifficultyLevel) -> &DifficultyProfile {
        &self.profiles[level.index()]
    }

    /// Iterates profiles in increasing complexity.
    pub fn iter(&self) -> impl Iterator<Item = &DifficultyProfile> {
        self.profiles.iter()
    }
}
