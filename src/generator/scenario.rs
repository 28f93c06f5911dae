//! The scenario record and its invariants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Domain, ToolCatalog};
use crate::difficulty::{DifficultyLevel, DifficultyProfile};
use crate::error::ValidationError;

use super::confidence::{TimelineEvent, CONFIDENCE_CEILING, CONFIDENCE_FLOOR};
use super::deliberation::Deliberation;
use super::outcome::{FinalOutcome, SuccessLevel};
use super::reality_break::RealityBreak;

/// A moment where the reasoner steps back and adjusts how it is thinking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetacognitiveMoment {
    /// Seconds from scenario start.
    pub timestamp: u32,
    pub thought: String,
    pub adjustment: String,
}

/// One complete synthesized training example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub domain: Domain,
    pub difficulty: DifficultyLevel,
    pub scenario_text: String,
    pub constraints: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usecase: Option<String>,
    pub tools_selected: BTreeSet<String>,
    pub internal_dialogue: Vec<Deliberation>,
    pub reality_breaks: Vec<RealityBreak>,
    #[serde(default)]
    pub metacognitive_moments: Vec<MetacognitiveMoment>,
    pub confidence_trajectory: Vec<u8>,
    pub final_outcome: FinalOutcome,
}

/// Orders deliberations and breaks as `D1, B1, D2, B2, ...`, appending
/// whichever side has leftovers.
pub fn interleave<'a>(
    deliberations: &'a [Deliberation],
    breaks: &'a [RealityBreak],
) -> Vec<TimelineEvent<'a>> {
    let mut events = Vec::with_capacity(deliberations.len() + breaks.len());
    let mut ds = deliberations.iter();
    let mut bs = breaks.iter();
    loop {
        let d = ds.next();
        let b = bs.next();
        if d.is_none() && b.is_none() {
            break;
        }
        if let Some(d) = d {
            events.push(TimelineEvent::Deliberation(d));
        }
        if let Some(b) = b {
            events.push(TimelineEvent::RealityBreak(b));
        }
    }
    events
}

impl Scenario {
    /// Events in order of occurrence.
    pub fn timeline(&self) -> Vec<TimelineEvent<'_>> {
        interleave(&self.internal_dialogue, &self.reality_breaks)
    }

    /// Final confidence value, if the trajectory is non-empty.
    pub fn terminal_confidence(&self) -> Option<u8> {
        self.confidence_trajectory.last().copied()
    }

    /// Checks every record invariant and hands the scenario back untouched.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Invariant` carrying the whole scenario when
    /// any check fails.
    pub fn validate(
        self,
        catalog: &ToolCatalog,
        profile: &DifficultyProfile,
    ) -> Result<Scenario, ValidationError> {
        match self.first_violation(catalog, profile) {
            None => Ok(self),
            Some(reason) => Err(ValidationError::Invariant {
                reason,
                scenario: Box::new(self),
            }),
        }
    }

    fn first_violation(&self, catalog: &ToolCatalog, profile: &DifficultyProfile) -> Option<String> {
        if profile.level != self.difficulty {
            return Some(format!(
                "validated against the '{}' profile but generated as '{}'",
                profile.level, self.difficulty
            ));
        }
        if self.scenario_text.trim().is_empty() {
            return Some("scenario_text is empty".to_string());
        }

        let expected_len = self.internal_dialogue.len() + self.reality_breaks.len() + 1;
        if self.confidence_trajectory.len() != expected_len {
            return Some(format!(
                "trajectory has {} values, expected {}",
                self.confidence_trajectory.len(),
                expected_len
            ));
        }
        if let Some(v) = self.confidence_trajectory.iter().find(|v| **v > 100) {
            return Some(format!("confidence {} is outside [0, 100]", v));
        }
        let interior_end = self.confidence_trajectory.len().saturating_sub(1);
        if let Some(v) = self
            .confidence_trajectory
            .iter()
            .take(interior_end)
            .skip(1)
            .find(|v| !(CONFIDENCE_FLOOR..=CONFIDENCE_CEILING).contains(*v))
        {
            return Some(format!(
                "interior confidence {} is outside [{}, {}]",
                v, CONFIDENCE_FLOOR, CONFIDENCE_CEILING
            ));
        }

        let (min, max) = profile.tool_count_range;
        if !(min..=max).contains(&self.tools_selected.len()) {
            return Some(format!(
                "{} tools selected, profile allows {}..={}",
                self.tools_selected.len(),
                min,
                max
            ));
        }
        if let Some(tool) = self
            .tools_selected
            .iter()
            .find(|t| !catalog.contains_tool(self.domain, t))
        {
            return Some(format!("tool '{}' is not in the '{}' catalog", tool, self.domain));
        }

        if self.internal_dialogue.is_empty() {
            return Some("internal_dialogue is empty".to_string());
        }
        if let Some(d) = self
            .internal_dialogue
            .iter()
            .find(|d| d.voices.len() != profile.voice_count)
        {
            return Some(format!(
                "deliberation at {}s has {} voices, expected {}",
                d.timestamp,
                d.voices.len(),
                profile.voice_count
            ));
        }
        if let Some(d) = self.internal_dialogue.iter().find(|d| d.confidence > 100) {
            return Some(format!("stated confidence {} is outside [0, 100]", d.confidence));
        }
        let expected_moments = self.internal_dialogue.len() - 1;
        if self.metacognitive_moments.len() != expected_moments {
            return Some(format!(
                "{} metacognitive moments for {} deliberations",
                self.metacognitive_moments.len(),
                self.internal_dialogue.len()
            ));
        }

        if self.reality_breaks.len() > profile.max_reality_breaks {
            return Some(format!(
                "{} reality breaks, profile allows {}",
                self.reality_breaks.len(),
                profile.max_reality_breaks
            ));
        }
        for b in &self.reality_breaks {
            if !self.tools_selected.contains(&b.tool) {
                return Some(format!("reality break names unselected tool '{}'", b.tool));
            }
            if let Some(fallback) = &b.fallback_tool {
                if fallback == &b.tool || !self.tools_selected.contains(fallback) {
                    return Some(format!("invalid fallback '{}' for '{}'", fallback, b.tool));
                }
            }
            if b.adaptation.trim().is_empty() {
                return Some(format!("empty adaptation for '{}'", b.tool));
            }
        }

        let mut last: Option<u32> = None;
        for event in self.timeline() {
            let ts = match event {
                TimelineEvent::Deliberation(d) => d.timestamp,
                TimelineEvent::RealityBreak(b) => b.timestamp,
            };
            if last.is_some_and(|prev| ts <= prev) {
                return Some(format!("timestamp {}s does not advance the timeline", ts));
            }
            last = Some(ts);
        }

        let outcome = &self.final_outcome;
        if outcome.lessons_learned.is_empty() {
            return Some("lessons_learned is empty".to_string());
        }
        let terminal = self.terminal_confidence().unwrap_or(0);
        if outcome.success_level != SuccessLevel::from_confidence(terminal) {
            return Some(format!(
                "success level '{}' does not match terminal confidence {}",
                outcome.success_level, terminal
            ));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::reality_break::AdaptationKind;
    use crate::generator::VoiceName;
    use std::collections::BTreeMap;

    fn deliberation(timestamp: u32, confidence: u8) -> Deliberation {
        let voices: BTreeMap<VoiceName, String> = [
            (VoiceName::Skeptic, "Verify first".to_string()),
            (VoiceName::Optimizer, "Go fast".to_string()),
            (VoiceName::Pragmatist, "Keep it small".to_string()),
        ]
        .into_iter()
        .collect();
        Deliberation {
            timestamp,
            voices,
            resolution: "Balance the Optimizer and the Skeptic".to_string(),
            confidence,
        }
    }

    fn sample() -> Scenario {
        let brk = RealityBreak {
            timestamp: 300,
            tool: "log_analyzer".to_string(),
            discovery: "log_analyzer drops lines longer than 4 KB".to_string(),
            internal_reaction: "That explains the odd numbers earlier".to_string(),
            impact_assessment: "Medium impact".to_string(),
            kind: AdaptationKind::SwitchTool,
            fallback_tool: Some("code_executor".to_string()),
            adaptation: "Switch to code_executor".to_string(),
        };
        let lesson = brk.lesson();
        Scenario {
            id: "test-scenario".to_string(),
            domain: Domain::Technical,
            difficulty: DifficultyLevel::Intermediate,
            scenario_text: "Debug why API returns 500 errors. But multiple things go wrong.".to_string(),
            constraints: "Time: 2 hours".to_string(),
            usecase: None,
            tools_selected: ["log_analyzer", "code_executor"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            internal_dialogue: vec![deliberation(0, 72)],
            reality_breaks: vec![brk],
            metacognitive_moments: Vec::new(),
            confidence_trajectory: vec![72, 60, 55],
            final_outcome: FinalOutcome {
                success_level: SuccessLevel::Partial,
                lessons_learned: [lesson].into_iter().collect(),
                user_satisfaction: 65,
                complexity_score: 4.0,
            },
        }
    }

    fn check(scenario: Scenario) -> Result<Scenario, ValidationError> {
        let profile = DifficultyProfile::standard(DifficultyLevel::Intermediate);
        scenario.validate(&ToolCatalog::standard(), &profile)
    }

    #[test]
    fn test_valid_scenario_passes() {
        let scenario = sample();
        assert_eq!(check(scenario.clone()).unwrap(), scenario);
    }

    #[test]
    fn test_trajectory_length_mismatch_keeps_record() {
        let mut scenario = sample();
        scenario.confidence_trajectory.push(50);
        let err = check(scenario).unwrap_err();
        assert!(err.to_string().contains("trajectory has 4 values, expected 3"));
        assert_eq!(err.scenario().id, "test-scenario");
    }

    #[test]
    fn test_foreign_tool_rejected() {
        let mut scenario = sample();
        scenario.tools_selected.insert("spreadsheet_tool".to_string());
        assert!(check(scenario).is_err());
    }

    #[test]
    fn test_interior_extremes_rejected() {
        let mut scenario = sample();
        scenario.internal_dialogue.push(deliberation(600, 90));
        scenario.metacognitive_moments.push(MetacognitiveMoment {
            timestamp: 600,
            thought: "Am I overcomplicating this?".to_string(),
            adjustment: "Simplify".to_string(),
        });
        scenario.confidence_trajectory = vec![72, 100, 60, 55];
        let err = check(scenario).unwrap_err();
        assert!(err.to_string().contains("interior confidence 100"));
    }

    #[test]
    fn test_fixture_lesson_comes_from_its_break() {
        let scenario = sample();
        assert!(scenario
            .final_outcome
            .lessons_learned
            .contains("Keep code_executor ready as a fallback when log_analyzer misbehaves"));
    }

    #[test]
    fn test_success_level_must_match_terminal() {
        let mut scenario = sample();
        scenario.final_outcome.success_level = SuccessLevel::Full;
        assert!(check(scenario).is_err());
    }

    #[test]
    fn test_timestamps_must_advance() {
        let mut scenario = sample();
        assert!(check(scenario.clone()).is_ok());
        scenario.reality_breaks[0].timestamp = 0;
        let err = check(scenario).unwrap_err();
        assert!(err.to_string().contains("does not advance"));
    }

    #[test]
    fn test_interleave_appends_leftovers() {
        let ds = vec![deliberation(0, 70), deliberation(10, 60)];
        let scenario = sample();
        let bs = vec![
            scenario.reality_breaks[0].clone(),
            scenario.reality_breaks[0].clone(),
            scenario.reality_breaks[0].clone(),
        ];
        let kinds: Vec<char> = interleave(&ds, &bs)
            .iter()
            .map(|e| match e {
                TimelineEvent::Deliberation(_) => 'D',
                TimelineEvent::RealityBreak(_) => 'B',
            })
            .collect();
        assert_eq!(kinds, vec!['D', 'B', 'D', 'B', 'B']);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["domain"], "technical");
        assert_eq!(json["difficulty"], "intermediate");
        assert_eq!(json["final_outcome"]["success_level"], "partial");
        assert!(json.get("usecase").is_none());
        assert!(json["internal_dialogue"][0]["voices"]["skeptic"].is_string());
    }
}
