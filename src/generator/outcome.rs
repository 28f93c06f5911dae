//! Outcome synthesis from the terminal confidence and the break history.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyProfile;

use super::reality_break::RealityBreak;

/// Lesson recorded when a scenario had no reality breaks.
pub const NO_INCIDENT_LESSON: &str =
    "scenario completed without incident — validate assumptions still held";

/// Terminal confidence at or above which a scenario counts as a full success.
const FULL_THRESHOLD: u8 = 70;
/// Terminal confidence at or above which a scenario counts as a partial success.
const PARTIAL_THRESHOLD: u8 = 40;

/// How well the scenario ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuccessLevel {
    Full,
    Partial,
    Failed,
}

impl SuccessLevel {
    /// Maps a terminal confidence to a success level.
    pub fn from_confidence(confidence: u8) -> Self {
        if confidence >= FULL_THRESHOLD {
            SuccessLevel::Full
        } else if confidence >= PARTIAL_THRESHOLD {
            SuccessLevel::Partial
        } else {
            SuccessLevel::Failed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SuccessLevel::Full => "full",
            SuccessLevel::Partial => "partial",
            SuccessLevel::Failed => "failed",
        }
    }
}

impl fmt::Display for SuccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalOutcome {
    pub success_level: SuccessLevel,
    /// Never empty.
    pub lessons_learned: BTreeSet<String>,
    /// Percent, derived from terminal confidence.
    pub user_satisfaction: u8,
    pub complexity_score: f64,
}

/// Derives the final outcome of a scenario.
///
/// An empty trajectory is treated as a terminal confidence of zero.
pub fn synthesize_outcome(
    trajectory: &[u8],
    breaks: &[RealityBreak],
    profile: &DifficultyProfile,
) -> FinalOutcome {
    let terminal = trajectory.last().copied().unwrap_or(0);

    let mut lessons: BTreeSet<String> = breaks.iter().map(RealityBreak::lesson).collect();
    if lessons.is_empty() {
        lessons.insert(NO_INCIDENT_LESSON.to_string());
    }

    FinalOutcome {
        success_level: SuccessLevel::from_confidence(terminal),
        lessons_learned: lessons,
        user_satisfaction: terminal.saturating_add(10).min(100),
        complexity_score: profile.complexity_score,
    }
}
