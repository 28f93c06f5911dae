//! Deliberation synthesis: the simulated internal debate.
//!
//! Each deliberation gives the floor to `profile.voice_count` voices, then
//! resolves them into a strategy that weighs the Optimizer against the
//! Skeptic. Later deliberations in a scenario receive the previous resolution
//! so the reasoning trace reads as one continuous chain.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::catalog::DomainCatalog;
use crate::difficulty::DifficultyProfile;

/// The perspectives taking part in a deliberation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VoiceName {
    /// Pushes for the fastest path.
    Optimizer,
    /// Challenges assumptions and asks for verification.
    Skeptic,
    /// Looks for unconventional combinations.
    Creative,
    /// Keeps scope and time in check.
    Pragmatist,
}

impl VoiceName {
    /// Retention order when a profile asks for fewer than four voices.
    pub const PRIORITY: [VoiceName; 4] = [
        VoiceName::Skeptic,
        VoiceName::Optimizer,
        VoiceName::Pragmatist,
        VoiceName::Creative,
    ];

    /// The first `count` voices in retention order.
    pub fn retained(count: usize) -> &'static [VoiceName] {
        &Self::PRIORITY[..count.min(Self::PRIORITY.len())]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            VoiceName::Optimizer => "Optimizer",
            VoiceName::Skeptic => "Skeptic",
            VoiceName::Creative => "Creative",
            VoiceName::Pragmatist => "Pragmatist",
        }
    }

    fn templates(&self) -> &'static [&'static str] {
        match self {
            VoiceName::Optimizer => &[
                "We can run {primary} and {secondary} in parallel and finish well inside the budget",
                "Go straight to {primary}; it covers most of the task on its own",
                "Automate the repetitive parts with {primary} and spend the saved time on {secondary}",
            ],
            VoiceName::Skeptic => &[
                "{primary} has surprised us before; verify its output before trusting it",
                "This approach has failed before; I want a rollback plan before touching {primary}",
                "We are assuming {secondary} behaves like last time, and nothing confirms that yet",
            ],
            VoiceName::Creative => &[
                "What if we combine {primary} and {secondary} differently, feeding one into the other?",
                "We could sidestep the hard part by reframing the task around {secondary}",
                "{primary} was built to {purpose}, but it can double as a sanity check here",
            ],
            VoiceName::Pragmatist => &[
                "Let's just get it done with {primary} and keep the scope tight",
                "Ship the smallest version that works with {primary}, then iterate",
                "Time is the real constraint; take the path through {primary} we already know",
            ],
        }
    }
}

impl fmt::Display for VoiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A single voice's contribution. Exists only while a deliberation is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub name: VoiceName,
    pub statement: String,
}

/// A resolved internal debate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deliberation {
    /// Seconds from scenario start.
    pub timestamp: u32,
    pub voices: BTreeMap<VoiceName, String>,
    pub resolution: String,
    /// Stated confidence in the resolution, 0-100.
    pub confidence: u8,
}

/// What a deliberation is about.
#[derive(Debug, Clone, Copy)]
pub struct DeliberationContext<'a> {
    pub task: &'a str,
    pub catalog: &'a DomainCatalog,
    pub tools: &'a BTreeSet<String>,
    /// Discovery from the reality break that triggered this deliberation.
    pub latest_discovery: Option<&'a str>,
}

const RESOLUTIONS: &[&str] = &[
    "Balance the Optimizer's push for speed against the Skeptic's caution: start with {primary}, verify each result, then widen scope",
    "Proceed with a hybrid approach: the Optimizer's plan for {primary}, gated by the Skeptic's checkpoints",
    "The Skeptic's concern outweighs the Optimizer's shortcut for now: validate {primary} on a small slice first",
    "Take the Optimizer's route through {primary} but keep the Skeptic's rollback plan ready",
];

const CONTINUATION_MARKER: &str = " (revising: ";

/// Synthesizes one deliberation.
///
/// Produces exactly `profile.voice_count` statements, a resolution naming the
/// Optimizer and the Skeptic, and a confidence drawn from the profile's
/// distribution and clamped to [0, 100].
pub fn synthesize_deliberation(
    context: &DeliberationContext<'_>,
    profile: &DifficultyProfile,
    prior_resolution: Option<&str>,
    rng: &mut ChaCha8Rng,
) -> Deliberation {
    let tools: Vec<&str> = context.tools.iter().map(String::as_str).collect();
    let primary = tools.choose(rng).copied().unwrap_or("the standard toolkit");
    let secondary = tools
        .iter()
        .copied()
        .filter(|t| *t != primary)
        .collect::<Vec<_>>()
        .choose(rng)
        .copied()
        .unwrap_or("a manual cross-check");
    let purpose = context
        .catalog
        .tool(primary)
        .map(|t| t.description.to_lowercase())
        .unwrap_or_else(|| "do one job".to_string());

    let fill = |template: &str| {
        template
            .replace("{primary}", primary)
            .replace("{secondary}", secondary)
            .replace("{purpose}", &purpose)
    };

    let voices: Vec<Voice> = VoiceName::retained(profile.voice_count)
        .iter()
        .map(|name| {
            let template = name.templates().choose(rng).copied().unwrap_or_default();
            let mut statement = fill(template);
            if *name == VoiceName::Skeptic {
                if let Some(discovery) = context.latest_discovery {
                    statement = format!("Now that {}, {}", discovery, lower_first(&statement));
                }
            }
            Voice {
                name: *name,
                statement,
            }
        })
        .collect();

    let mut resolution = fill(RESOLUTIONS.choose(rng).copied().unwrap_or_default());
    if let Some(prior) = prior_resolution {
        let earlier = prior.split(CONTINUATION_MARKER).next().unwrap_or(prior);
        resolution = format!("{}{}{})", resolution, CONTINUATION_MARKER, lower_first(earlier));
    }

    Deliberation {
        timestamp: 0,
        voices: voices.into_iter().map(|v| (v.name, v.statement)).collect(),
        resolution,
        confidence: draw_confidence(profile, rng),
    }
}

/// Draws a stated confidence; harder profiles have a lower mean and wider spread.
fn draw_confidence(profile: &DifficultyProfile, rng: &mut ChaCha8Rng) -> u8 {
    let sampled = match Normal::new(profile.confidence_mean, profile.confidence_std_dev) {
        Ok(normal) => normal.sample(rng),
        Err(_) => profile.confidence_mean,
    };
    sampled.round().clamp(0.0, 100.0) as u8
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
