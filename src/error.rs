//! Error types for chaos-forge operations.
//!
//! Defines the error taxonomy for every subsystem:
//! - Catalog and difficulty profile configuration
//! - Post-construction validation of assembled scenarios
//! - Optional text enhancement (always recovered locally)
//! - LLM API interactions
//! - Dataset export

use thiserror::Error;

use crate::generator::Scenario;

/// Errors caused by unknown names or a misconfigured catalog/profile table.
///
/// Never retried: a misconfiguration affects every later scenario identically.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown domain '{0}': expected one of technical, business, research, creative")]
    UnknownDomain(String),

    #[error(
        "Unknown difficulty '{0}': expected one of simple, basic, intermediate, advanced, chaotic"
    )]
    UnknownDifficulty(String),

    #[error("Unknown training format '{0}': expected one of chaos, alpaca, openai, simple, thought")]
    UnknownFormat(String),

    #[error("Tool pool for domain '{domain}' has {pool} tools but profile '{level}' needs {required}")]
    PoolTooSmall {
        domain: String,
        level: String,
        pool: usize,
        required: usize,
    },

    #[error("Invalid difficulty profile '{level}': {reason}")]
    InvalidProfile { level: String, reason: String },

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// An assembled scenario broke one of the record invariants.
///
/// This indicates a logic defect in the generator, so the whole offending
/// record travels with the error for diagnosis.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Scenario '{}' violates invariant: {reason}", .scenario.id)]
    Invariant {
        reason: String,
        scenario: Box<Scenario>,
    },
}

impl ValidationError {
    /// The offending scenario.
    pub fn scenario(&self) -> &Scenario {
        match self {
            ValidationError::Invariant { scenario, .. } => scenario,
        }
    }
}

/// Errors that can surface from a single scenario generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Generation worker failed: {0}")]
    Worker(String),
}

/// Errors from an enhancement backend.
///
/// The generator recovers from every variant by keeping the synthesized text.
#[derive(Debug, Error)]
pub enum EnhancementError {
    #[error("Enhancement timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Enhancement backend returned an empty response")]
    EmptyResponse,

    #[error("Enhancement backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API base URL: CHAOS_LLM_API_BASE environment variable not set")]
    MissingApiBase,

    #[error("HTTP client could not be built: {0}")]
    ClientBuild(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },
}

/// Errors that can occur during dataset export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No scenarios to export")]
    NoScenarios,

    #[error("Invalid input file '{path}': {reason}")]
    InvalidInput { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
