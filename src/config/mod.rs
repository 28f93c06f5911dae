//! Generator configuration.
//!
//! Settings come from three layers, later ones winning: built-in defaults, an
//! optional YAML file, and `CHAOS_*` environment variables. The CLI applies
//! its own flags on top. The generation core never reads any of these
//! sources; it receives a seeded random source and, optionally, an enhancer.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Domain;
use crate::enhance::{NullEnhancer, RemoteEnhancer, TextEnhancer};
use crate::error::ConfigError;
use crate::generator::EnhancementOptions;
use crate::llm::{LiteLlmClient, DEFAULT_MODEL};

/// Configuration for scenario generation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Seed for reproducible output; random when unset.
    pub seed: Option<u64>,
    /// Domains used by curriculum runs.
    pub domains: Vec<Domain>,

    /// Rewrite prose through the remote enhancer.
    pub enhance: bool,
    /// Also rewrite voice statements.
    pub enhance_voices: bool,
    /// Per-call enhancement timeout in seconds.
    pub enhance_timeout_secs: u64,

    pub llm_api_base: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            domains: Domain::all().to_vec(),
            enhance: false,
            enhance_voices: false,
            enhance_timeout_secs: 30,
            llm_api_base: None,
            llm_api_key: None,
            llm_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CHAOS_SEED`: Random seed (default: random)
    /// - `CHAOS_ENHANCE_TIMEOUT_SECS`: Enhancement timeout (default: 30)
    /// - `CHAOS_LLM_API_BASE`: Chat completion endpoint base URL
    /// - `CHAOS_LLM_API_KEY`: API key for the endpoint
    /// - `CHAOS_LLM_MODEL`: Model name (default: gpt-4o-mini)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Same as [`GeneratorConfig::from_env`] with an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides(lookup)
    }

    /// Loads a YAML file; missing keys keep their defaults.
    ///
    /// The result is not validated: overrides may still complete it. Use
    /// [`GeneratorConfig::load`] for the full layering.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` or `ConfigError::Yaml` for unreadable or
    /// malformed files.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Defaults, then the YAML file at `path` if any, then `CHAOS_*` values
    /// from `lookup`. Validated once, after every layer is applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unreadable files, bad values or an
    /// inconsistent result.
    pub fn load<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        base.with_overrides(lookup)
    }

    /// Applies `CHAOS_*` overrides from `lookup` on top of `self`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CHAOS_SEED") {
            self.seed = Some(parse_env_value(&val, "CHAOS_SEED")?);
        }

        if let Some(val) = lookup("CHAOS_ENHANCE_TIMEOUT_SECS") {
            self.enhance_timeout_secs = parse_env_value(&val, "CHAOS_ENHANCE_TIMEOUT_SECS")?;
        }

        if let Some(val) = lookup("CHAOS_LLM_API_BASE") {
            self.llm_api_base = Some(val);
        }

        if let Some(val) = lookup("CHAOS_LLM_API_KEY") {
            self.llm_api_key = Some(val);
        }

        if let Some(val) = lookup("CHAOS_LLM_MODEL") {
            self.llm_model = val;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domains.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "domains cannot be empty".to_string(),
            ));
        }

        if self.enhance_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "enhance_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm_model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "llm_model cannot be empty".to_string(),
            ));
        }

        if self.enhance && self.llm_api_base.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::ValidationFailed(
                "enhancement requires llm_api_base (CHAOS_LLM_API_BASE)".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_domains(mut self, domains: Vec<Domain>) -> Self {
        self.domains = domains;
        self
    }

    pub fn with_enhancement(mut self, enabled: bool) -> Self {
        self.enhance = enabled;
        self
    }

    pub fn with_enhance_timeout(mut self, timeout: Duration) -> Self {
        self.enhance_timeout_secs = timeout.as_secs();
        self
    }

    /// Fixes the seed, drawing one if none was configured, and returns it.
    pub fn resolve_seed(&mut self) -> u64 {
        *self.seed.get_or_insert_with(|| rand::rng().random::<u64>())
    }

    /// A generator seeded from the resolved seed.
    pub fn rng(&mut self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.resolve_seed())
    }

    pub fn enhancement_timeout(&self) -> Duration {
        Duration::from_secs(self.enhance_timeout_secs)
    }

    pub fn enhancement_options(&self) -> EnhancementOptions {
        EnhancementOptions {
            timeout: self.enhancement_timeout(),
            include_voices: self.enhance_voices,
        }
    }

    /// The enhancer selected by this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` when enhancement is enabled but
    /// the remote client cannot be built.
    pub fn build_enhancer(&self) -> Result<Arc<dyn TextEnhancer>, ConfigError> {
        if !self.enhance {
            return Ok(Arc::new(NullEnhancer));
        }
        let api_base = self.llm_api_base.clone().ok_or_else(|| {
            ConfigError::ValidationFailed("enhancement requires llm_api_base".to_string())
        })?;
        let client = LiteLlmClient::new(api_base, self.llm_api_key.clone(), self.llm_model.clone())
            .map_err(|e| ConfigError::ValidationFailed(e.to_string()))?;
        tracing::info!(
            api_base = client.api_base(),
            model = client.default_model(),
            authenticated = client.has_api_key(),
            "Remote enhancer configured"
        );
        let enhancer = RemoteEnhancer::new(Arc::new(client), "")
            .map_err(|e| ConfigError::ValidationFailed(e.to_string()))?;
        Ok(Arc::new(enhancer))
    }
}

/// Parses an environment variable value into the target type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })
}
