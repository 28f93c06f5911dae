//! Reality break injection.
//!
//! A reality break is a discovery, taken from the failure modes of one of the
//! scenario's own tools, that invalidates part of the plan and forces an
//! adaptation. Adaptations always change something: they move work to another
//! selected tool, change strategy, or (with a single tool) work around the
//! failure inside that same tool.

use std::collections::BTreeSet;
use std::fmt;

use rand::seq::IndexedRandom;
use rand::RngExt;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::DomainCatalog;
use crate::difficulty::DifficultyProfile;
use crate::error::ConfigError;

/// How the plan changed after a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptationKind {
    /// Work moves to a different selected tool.
    SwitchTool,
    /// The plan is reordered or descoped around the broken tool.
    StrategyChange,
    /// Only one tool is available; it is used differently.
    Workaround,
}

impl fmt::Display for AdaptationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdaptationKind::SwitchTool => "switch_tool",
            AdaptationKind::StrategyChange => "strategy_change",
            AdaptationKind::Workaround => "workaround",
        };
        f.write_str(name)
    }
}

/// A disruptive discovery and the adaptation it forced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealityBreak {
    /// Seconds from scenario start.
    pub timestamp: u32,
    /// The selected tool that misbehaved.
    pub tool: String,
    pub discovery: String,
    pub internal_reaction: String,
    pub impact_assessment: String,
    pub kind: AdaptationKind,
    /// The other selected tool taking over, for [`AdaptationKind::SwitchTool`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_tool: Option<String>,
    pub adaptation: String,
}

impl RealityBreak {
    /// The lesson this adaptation teaches.
    pub fn lesson(&self) -> String {
        match (self.kind, self.fallback_tool.as_deref()) {
            (AdaptationKind::SwitchTool, Some(fallback)) => format!(
                "Keep {} ready as a fallback when {} misbehaves",
                fallback, self.tool
            ),
            (AdaptationKind::Workaround, _) => format!(
                "Constraints force innovation: {} can be bent to the task when there is no alternative",
                self.tool
            ),
            _ => format!("Re-plan around {} instead of forcing it", self.tool),
        }
    }
}

const REACTIONS: &[&str] = &[
    "This changes everything",
    "That explains the odd numbers earlier",
    "The plan assumed this would just work",
    "Not what the documentation promised",
];

const SWITCH_TEMPLATES: &[&str] = &[
    "Switch to {fallback} for this step and cross-check against what {tool} already produced",
    "Route the remaining work through {fallback} and keep {tool} out of the critical path",
];

const STRATEGY_TEMPLATES: &[&str] = &[
    "Change strategy: reorder the plan so {tool} is only used where its output can be verified",
    "Descope: drop the part of the task that depends on {tool} and flag it for follow-up",
    "Change strategy: finish the steps that do not need {tool} first, then revisit it with fresh data",
];

const WORKAROUND_TEMPLATES: &[&str] = &[
    "Work around it within {tool}: split the job into smaller batches and verify each one",
    "Keep using {tool} but add a manual verification pass on its output",
    "Reconfigure {tool} with conservative settings and rerun only the affected step",
];

/// Probability that a break with alternatives available switches tools
/// rather than changing strategy.
const SWITCH_TOOL_BIAS: f64 = 0.6;

/// Decides which break slots fire and synthesizes each break.
///
/// Each of `profile.max_reality_breaks` slots is an independent Bernoulli
/// trial with `profile.reality_break_chance`. An empty result is valid.
///
/// # Errors
///
/// Returns `ConfigError::Catalog` if a selected tool is missing from the
/// domain catalog.
pub fn maybe_inject_breaks(
    catalog: &DomainCatalog,
    profile: &DifficultyProfile,
    tools_selected: &BTreeSet<String>,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<RealityBreak>, ConfigError> {
    if tools_selected.is_empty() || profile.reality_break_chance <= 0.0 {
        return Ok(Vec::new());
    }

    let fired = (0..profile.max_reality_breaks)
        .filter(|_| rng.random_bool(profile.reality_break_chance))
        .count();

    let tools: Vec<&str> = tools_selected.iter().map(String::as_str).collect();
    let mut breaks = Vec::with_capacity(fired);

    for _ in 0..fired {
        let Some(tool) = tools.choose(rng).copied() else {
            break;
        };
        let entry = catalog.tool(tool).ok_or_else(|| {
            ConfigError::Catalog(format!(
                "tool '{}' is not in the '{}' catalog",
                tool, catalog.domain
            ))
        })?;
        let failure = entry.failure_modes.choose(rng).ok_or_else(|| {
            ConfigError::Catalog(format!("tool '{}' has no failure modes", tool))
        })?;

        let alternatives: Vec<&str> = tools.iter().copied().filter(|t| *t != tool).collect();
        let (kind, fallback_tool, template) = if alternatives.is_empty() {
            (AdaptationKind::Workaround, None, WORKAROUND_TEMPLATES.choose(rng))
        } else if rng.random_bool(SWITCH_TOOL_BIAS) {
            let fallback = alternatives.choose(rng).map(|t| t.to_string());
            (AdaptationKind::SwitchTool, fallback, SWITCH_TEMPLATES.choose(rng))
        } else {
            (AdaptationKind::StrategyChange, None, STRATEGY_TEMPLATES.choose(rng))
        };

        let adaptation = template
            .copied()
            .unwrap_or("Change strategy: pause and re-plan around {tool}")
            .replace("{tool}", tool)
            .replace("{fallback}", fallback_tool.as_deref().unwrap_or(tool));

        breaks.push(RealityBreak {
            timestamp: 0,
            tool: tool.to_string(),
            discovery: format!("{} {}", tool, failure),
            internal_reaction: REACTIONS.choose(rng).copied().unwrap_or_default().to_string(),
            impact_assessment: impact_assessment(profile),
            kind,
            fallback_tool,
            adaptation,
        });
    }

    Ok(breaks)
}

fn impact_assessment(profile: &DifficultyProfile) -> String {
    let text = if profile.confidence_volatility >= 0.3 {
        "High impact: the current plan is no longer viable"
    } else if profile.confidence_volatility >= 0.2 {
        "Medium impact: part of the plan has to be redone"
    } else {
        "Low impact: a detour, not a dead end"
    };
    text.to_string()
}
