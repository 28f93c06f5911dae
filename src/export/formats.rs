//! Training-format conversion.
//!
//! Every format is derived from [`Scenario`] fields alone, so any generated or
//! previously exported scenario can be converted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ExportError};
use crate::generator::Scenario;

/// System prompt used for chat-format examples.
pub const CHAT_SYSTEM_PROMPT: &str = "You think through problems systematically, considering \
multiple perspectives and adapting when things go wrong.";

/// Output formats for training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingFormat {
    /// The full scenario record.
    Chaos,
    /// `{instruction, input, output}` triples.
    Alpaca,
    /// Chat messages, written as JSONL.
    #[serde(rename = "openai")]
    OpenAi,
    /// `{question, answer}` pairs.
    Simple,
    /// `{input, output}` with the reasoning written out.
    Thought,
}

impl TrainingFormat {
    pub fn all() -> [TrainingFormat; 5] {
        [
            TrainingFormat::Chaos,
            TrainingFormat::Alpaca,
            TrainingFormat::OpenAi,
            TrainingFormat::Simple,
            TrainingFormat::Thought,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingFormat::Chaos => "chaos",
            TrainingFormat::Alpaca => "alpaca",
            TrainingFormat::OpenAi => "openai",
            TrainingFormat::Simple => "simple",
            TrainingFormat::Thought => "thought",
        }
    }

    /// Whether records are written one JSON object per line.
    pub fn is_jsonl(&self) -> bool {
        matches!(self, TrainingFormat::OpenAi)
    }

    pub fn extension(&self) -> &'static str {
        if self.is_jsonl() {
            "jsonl"
        } else {
            "json"
        }
    }
}

impl fmt::Display for TrainingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chaos" => Ok(TrainingFormat::Chaos),
            "alpaca" => Ok(TrainingFormat::Alpaca),
            "openai" | "chat" => Ok(TrainingFormat::OpenAi),
            "simple" | "qa" => Ok(TrainingFormat::Simple),
            "thought" => Ok(TrainingFormat::Thought),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlpacaEntry {
    pub instruction: String,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatExample {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleQa {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtProcess {
    pub input: String,
    pub output: String,
}

fn tool_list(scenario: &Scenario) -> String {
    scenario
        .tools_selected
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn initial_confidence(scenario: &Scenario) -> u8 {
    scenario.confidence_trajectory.first().copied().unwrap_or(0)
}

fn first_lesson(scenario: &Scenario) -> &str {
    scenario
        .final_outcome
        .lessons_learned
        .iter()
        .next()
        .map_or("", String::as_str)
}

fn task_prompt(scenario: &Scenario) -> String {
    format!(
        "{} {} I have these tools: {}",
        scenario.scenario_text,
        scenario.constraints,
        tool_list(scenario)
    )
}

/// The assistant's narrated reasoning: every deliberation and break in
/// timeline order, then the outcome.
pub fn reasoning_narrative(scenario: &Scenario) -> String {
    use crate::generator::TimelineEvent;

    let mut parts = vec!["I'll think through this systematically.".to_string()];

    for event in scenario.timeline() {
        match event {
            TimelineEvent::Deliberation(d) => {
                parts.push(String::new());
                parts.push("Considering different approaches:".to_string());
                for (voice, statement) in &d.voices {
                    parts.push(format!("- {} approach: {}", voice, statement));
                }
                parts.push(format!("My confidence level: {}%", d.confidence));
                parts.push(format!("Decision: {}", d.resolution));
            }
            TimelineEvent::RealityBreak(b) => {
                parts.push(String::new());
                parts.push(format!("- Discovered: {}", b.discovery));
                parts.push(format!("- This means: {}", b.impact_assessment));
                parts.push(format!("- Adjusting: {}", b.adaptation));
            }
        }
    }

    for moment in &scenario.metacognitive_moments {
        parts.push(format!("(Stepping back: {} {}.)", moment.thought, moment.adjustment));
    }

    parts.push(String::new());
    parts.push(format!("Result: {}", scenario.final_outcome.success_level));
    for lesson in &scenario.final_outcome.lessons_learned {
        parts.push(format!("Key insight: {}", lesson));
    }

    parts.join("\n")
}

pub fn to_alpaca(scenario: &Scenario) -> AlpacaEntry {
    AlpacaEntry {
        instruction: scenario.scenario_text.clone(),
        input: format!("{} Tools available: {}", scenario.constraints, tool_list(scenario)),
        output: reasoning_narrative(scenario),
    }
}

pub fn to_openai_chat(scenario: &Scenario) -> ChatExample {
    let message = |role: &str, content: String| ChatMessage {
        role: role.to_string(),
        content,
    };
    ChatExample {
        messages: vec![
            message("system", CHAT_SYSTEM_PROMPT.to_string()),
            message("user", task_prompt(scenario)),
            message("assistant", reasoning_narrative(scenario)),
        ],
    }
}

pub fn to_simple_qa(scenario: &Scenario) -> SimpleQa {
    let resolution = scenario
        .internal_dialogue
        .first()
        .map_or("", |d| d.resolution.as_str());
    SimpleQa {
        question: format!(
            "Task: {} Tools available: {}",
            scenario.scenario_text,
            tool_list(scenario)
        ),
        answer: format!(
            "Confidence: {}%. {}. Outcome: {}",
            initial_confidence(scenario),
            resolution,
            scenario.final_outcome.success_level
        ),
    }
}

pub fn to_thought_process(scenario: &Scenario) -> ThoughtProcess {
    let mut thoughts = vec!["Let me analyze this situation:".to_string()];
    if let Some(first) = scenario.internal_dialogue.first() {
        for (voice, statement) in &first.voices {
            thoughts.push(format!("- {}: {}", voice, statement));
        }
        thoughts.push(String::new());
        thoughts.push(format!("Initial confidence: {}%", initial_confidence(scenario)));
        thoughts.push(format!("Decision: {}", first.resolution));
    }
    for b in &scenario.reality_breaks {
        thoughts.push(String::new());
        thoughts.push(format!("Unexpected: {}", b.discovery));
        thoughts.push(format!("Impact: {}", b.impact_assessment));
        thoughts.push(format!("Adapting: {}", b.adaptation));
    }
    thoughts.push(String::new());
    thoughts.push(format!("Final outcome: {}", scenario.final_outcome.success_level));
    thoughts.push(format!("Lesson learned: {}", first_lesson(scenario)));

    ThoughtProcess {
        input: format!("Task: {}\nTools: {}", scenario.scenario_text, tool_list(scenario)),
        output: thoughts.join("\n"),
    }
}

/// Converts one scenario to a JSON record in `format`.
///
/// # Errors
///
/// Returns `ExportError::Json` if serialization fails.
pub fn convert(scenario: &Scenario, format: TrainingFormat) -> Result<serde_json::Value, ExportError> {
    let value = match format {
        TrainingFormat::Chaos => serde_json::to_value(scenario)?,
        TrainingFormat::Alpaca => serde_json::to_value(to_alpaca(scenario))?,
        TrainingFormat::OpenAi => serde_json::to_value(to_openai_chat(scenario))?,
        TrainingFormat::Simple => serde_json::to_value(to_simple_qa(scenario))?,
        TrainingFormat::Thought => serde_json::to_value(to_thought_process(scenario))?,
    };
    Ok(value)
}

/// Converts a batch, preserving order.
pub fn convert_batch(
    scenarios: &[Scenario],
    format: TrainingFormat,
) -> Result<Vec<serde_json::Value>, ExportError> {
    scenarios.iter().map(|s| convert(s, format)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Domain;
    use crate::difficulty::DifficultyLevel;
    use crate::generator::ChaosGenerator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scenario(level: DifficultyLevel) -> Scenario {
        let generator = ChaosGenerator::standard().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        generator
            .generate_progressive_scenario(Domain::Technical, level, &mut rng)
            .unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("OpenAI".parse::<TrainingFormat>().unwrap(), TrainingFormat::OpenAi);
        assert_eq!("thought".parse::<TrainingFormat>().unwrap(), TrainingFormat::Thought);
        assert!(matches!(
            "csv".parse::<TrainingFormat>(),
            Err(ConfigError::UnknownFormat(_))
        ));
        for format in TrainingFormat::all() {
            assert_eq!(format.as_str().parse::<TrainingFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_openai_chat_roles() {
        let chat = to_openai_chat(&scenario(DifficultyLevel::Advanced));
        let roles: Vec<_> = chat.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert!(chat.messages[2].content.contains("Result: "));
    }

    #[test]
    fn test_narrative_covers_every_break() {
        let s = scenario(DifficultyLevel::Chaotic);
        let narrative = reasoning_narrative(&s);
        for b in &s.reality_breaks {
            assert!(narrative.contains(&b.discovery));
        }
        for d in &s.internal_dialogue {
            assert!(narrative.contains(&d.resolution));
        }
    }

    #[test]
    fn test_simple_qa_mentions_tools_and_outcome() {
        let s = scenario(DifficultyLevel::Simple);
        let qa = to_simple_qa(&s);
        for tool in &s.tools_selected {
            assert!(qa.question.contains(tool.as_str()));
        }
        assert!(qa.answer.contains(s.final_outcome.success_level.as_str()));
    }

    #[test]
    fn test_every_format_converts() {
        let s = scenario(DifficultyLevel::Intermediate);
        for format in TrainingFormat::all() {
            let value = convert(&s, format).unwrap();
            assert!(value.is_object(), "{} produced {:?}", format, value);
        }
        let chaos = convert(&s, TrainingFormat::Chaos).unwrap();
        assert_eq!(chaos["id"], s.id.as_str());
    }
}
