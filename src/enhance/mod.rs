//! Optional prose enhancement.
//!
//! A [`TextEnhancer`] rewrites synthesized text (the scenario description or a
//! voice statement) into richer prose. Enhancement is never required for a
//! valid scenario: [`enhance_or_keep`] bounds every call with a timeout and
//! falls back to the synthesized draft on any failure.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::catalog::Domain;
use crate::difficulty::DifficultyLevel;
use crate::error::EnhancementError;
use crate::generator::VoiceName;
use crate::llm::{GenerationRequest, LlmProvider, Message};

/// Which piece of a scenario is being rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnhancedField {
    ScenarioText,
    VoiceStatement(VoiceName),
}

/// Scenario metadata handed to an enhancer alongside the draft.
#[derive(Debug, Clone, Copy)]
pub struct EnhancementContext<'a> {
    pub domain: Domain,
    pub difficulty: DifficultyLevel,
    pub field: EnhancedField,
    pub tools: &'a BTreeSet<String>,
}

/// Capability for rewriting synthesized text.
#[async_trait]
pub trait TextEnhancer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Returns replacement text for `draft`, or an error.
    async fn enhance(
        &self,
        draft: &str,
        context: &EnhancementContext<'_>,
    ) -> Result<String, EnhancementError>;
}

/// Returns the draft unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEnhancer;

#[async_trait]
impl TextEnhancer for NullEnhancer {
    fn name(&self) -> &str {
        "null"
    }

    async fn enhance(
        &self,
        draft: &str,
        _context: &EnhancementContext<'_>,
    ) -> Result<String, EnhancementError> {
        Ok(draft.to_string())
    }
}

const SCENARIO_PROMPT: &str = "Rewrite this {difficulty} {domain} task description as one or two \
vivid, realistic sentences. Keep every fact, tool name and constraint. Tools in play: {tools}.\n\n{draft}";

const VOICE_PROMPT: &str = "Rewrite this statement from the {voice} voice of an internal debate \
so it sounds natural and specific. Keep its position and every tool name. Tools in play: {tools}.\n\n{draft}";

/// Enhancer backed by a chat completion provider.
pub struct RemoteEnhancer {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f64,
    code_fence: Regex,
}

impl RemoteEnhancer {
    /// Wraps `provider`; an empty `model` uses the provider's default.
    ///
    /// # Errors
    ///
    /// Returns `EnhancementError::Backend` if the fence pattern fails to compile.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
    ) -> Result<Self, EnhancementError> {
        let code_fence = Regex::new(r"(?s)^```[a-zA-Z]*\s*(.*?)\s*```$")
            .map_err(|e| EnhancementError::Backend(e.to_string()))?;
        Ok(Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            code_fence,
        })
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    fn prompt(draft: &str, context: &EnhancementContext<'_>) -> String {
        let tools = context
            .tools
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let template = match context.field {
            EnhancedField::ScenarioText => SCENARIO_PROMPT.to_string(),
            EnhancedField::VoiceStatement(voice) => {
                VOICE_PROMPT.replace("{voice}", voice.display_name())
            }
        };
        template
            .replace("{difficulty}", context.difficulty.as_str())
            .replace("{domain}", context.domain.as_str())
            .replace("{tools}", &tools)
            .replace("{draft}", draft)
    }

    /// Strips surrounding quotes and a wrapping code fence from a reply.
    fn clean(&self, reply: &str) -> String {
        let trimmed = reply.trim();
        let unfenced = self
            .code_fence
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map_or(trimmed, |m| m.as_str());
        unfenced.trim().trim_matches('"').trim().to_string()
    }
}

#[async_trait]
impl TextEnhancer for RemoteEnhancer {
    fn name(&self) -> &str {
        "remote"
    }

    async fn enhance(
        &self,
        draft: &str,
        context: &EnhancementContext<'_>,
    ) -> Result<String, EnhancementError> {
        let request = GenerationRequest::new(
            self.model.clone(),
            vec![
                Message::system(
                    "You polish training scenarios. Reply with the rewritten text only.",
                ),
                Message::user(Self::prompt(draft, context)),
            ],
        )
        .with_temperature(self.temperature)
        .with_max_tokens(400);

        let response = self.provider.generate(request).await?;
        let content = response
            .first_content()
            .ok_or(EnhancementError::EmptyResponse)?;
        let cleaned = self.clean(content);
        if cleaned.is_empty() {
            return Err(EnhancementError::EmptyResponse);
        }
        Ok(cleaned)
    }
}

/// Runs `enhancer` on `draft`, keeping the draft on error, empty output or
/// timeout.
pub async fn enhance_or_keep(
    enhancer: &dyn TextEnhancer,
    draft: &str,
    context: &EnhancementContext<'_>,
    timeout: Duration,
) -> String {
    let outcome = match tokio::time::timeout(timeout, enhancer.enhance(draft, context)).await {
        Ok(result) => result,
        Err(_) => Err(EnhancementError::Timeout {
            seconds: timeout.as_secs(),
        }),
    };

    match outcome {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::warn!(
                enhancer = enhancer.name(),
                field = ?context.field,
                "Enhancer returned empty text, keeping synthesized text"
            );
            draft.to_string()
        }
        Err(e) => {
            tracing::warn!(
                enhancer = enhancer.name(),
                field = ?context.field,
                error = %e,
                "Enhancement failed, keeping synthesized text"
            );
            draft.to_string()
        }
    }
}
