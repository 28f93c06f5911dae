//! chaos-forge: progressive reasoning-under-uncertainty scenario generator.
//!
//! This library synthesizes training scenarios in which a problem solver
//! deliberates between internal voices, hits reality breaks mid-task, adapts,
//! and ends with a confidence trajectory and an outcome. Scenarios scale across
//! five difficulty levels and are assembled into balanced curricula that can be
//! exported in several fine-tuning formats.

// Core modules
pub mod catalog;
pub mod cli;
pub mod config;
pub mod difficulty;
pub mod enhance;
pub mod error;
pub mod export;
pub mod generator;
pub mod llm;

// Re-export commonly used error types
pub use error::{
    ConfigError, EnhancementError, ExportError, GenerationError, LlmError, ValidationError,
};

// Re-export the main entry points
pub use catalog::{Domain, ToolCatalog};
pub use config::GeneratorConfig;
pub use difficulty::{DifficultyLevel, DifficultyProfile, ProfileTable};
pub use generator::{build_curriculum, ChaosGenerator, Curriculum, Scenario};
