//! Domain and tool catalog for chaos-forge.
//!
//! The catalog maps each [`Domain`] to its tool pool (with per-tool failure
//! modes) and to the task descriptions scenarios are drawn from. It is built
//! once, never mutated, and shared by reference with every generator stage.

mod standard;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::difficulty::ProfileTable;
use crate::error::ConfigError;

/// Scenario domains.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Technical,
    Business,
    Research,
    Creative,
}

impl Domain {
    /// Returns all domains in their canonical order.
    pub fn all() -> [Domain; 4] {
        [
            Domain::Technical,
            Domain::Business,
            Domain::Research,
            Domain::Creative,
        ]
    }

    /// Returns the lowercase domain name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Technical => "technical",
            Domain::Business => "business",
            Domain::Research => "research",
            Domain::Creative => "creative",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "technical" => Ok(Domain::Technical),
            "business" => Ok(Domain::Business),
            "research" => Ok(Domain::Research),
            "creative" => Ok(Domain::Creative),
            _ => Err(ConfigError::UnknownDomain(s.to_string())),
        }
    }
}

/// One tool available in a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCatalogEntry {
    pub domain: Domain,
    pub tool_name: String,
    /// Short description of what the tool does.
    pub description: String,
    /// Ways the tool can misbehave, phrased as discoveries.
    pub failure_modes: Vec<String>,
}

impl ToolCatalogEntry {
    pub fn new(
        domain: Domain,
        tool_name: impl Into<String>,
        description: impl Into<String>,
        failure_modes: &[&str],
    ) -> Self {
        Self {
            domain,
            tool_name: tool_name.into(),
            description: description.into(),
            failure_modes: failure_modes.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Everything the catalog knows about one domain.
#[derive(Debug, Clone)]
pub struct DomainCatalog {
    pub domain: Domain,
    pub tools: Vec<ToolCatalogEntry>,
    /// Routine tasks used by the lower difficulty levels.
    pub simple_tasks: Vec<String>,
    /// High-stakes tasks used by advanced and chaotic levels.
    pub complex_tasks: Vec<String>,
}

impl DomainCatalog {
    /// Looks up a tool by name.
    pub fn tool(&self, tool_name: &str) -> Option<&ToolCatalogEntry> {
        self.tools.iter().find(|t| t.tool_name == tool_name)
    }

    /// Names of every tool in the pool.
    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.tool_name.as_str())
    }

    /// Task pool for the requested complexity.
    pub fn tasks(&self, complex: bool) -> &[String] {
        if complex {
            &self.complex_tasks
        } else {
            &self.simple_tasks
        }
    }
}

/// Immutable registry of domains, tools and tasks.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    domains: BTreeMap<Domain, DomainCatalog>,
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ToolCatalog {
    /// The built-in catalog covering all four domains.
    pub fn standard() -> Self {
        Self::from_domains(standard::domains())
    }

    /// Builds a catalog from explicit domain entries.
    pub fn from_domains(domains: Vec<DomainCatalog>) -> Self {
        Self {
            domains: domains.into_iter().map(|d| (d.domain, d)).collect(),
        }
    }

    /// Returns the catalog for `domain`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownDomain` when the domain is not registered.
    pub fn domain(&self, domain: Domain) -> Result<&DomainCatalog, ConfigError> {
        self.domains
            .get(&domain)
            .ok_or_else(|| ConfigError::UnknownDomain(domain.to_string()))
    }

    /// Registered domains.
    pub fn domains(&self) -> impl Iterator<Item = Domain> + '_ {
        self.domains.keys().copied()
    }

    /// Whether `tool_name` belongs to the pool of `domain`.
    pub fn contains_tool(&self, domain: Domain, tool_name: &str) -> bool {
        self.domains
            .get(&domain)
            .is_some_and(|d| d.tool(tool_name).is_some())
    }

    /// Checks that every registered domain can satisfy every profile and that
    /// each domain has tasks and failure modes to draw from.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::PoolTooSmall` or `ConfigError::Catalog`.
    pub fn validate_against(&self, profiles: &ProfileTable) -> Result<(), ConfigError> {
        for catalog in self.domains.values() {
            for profile in profiles.iter() {
                let required = profile.tool_count_range.1;
                if catalog.tools.len() < required {
                    return Err(ConfigError::PoolTooSmall {
                        domain: catalog.domain.to_string(),
                        level: profile.level.to_string(),
                        pool: catalog.tools.len(),
                        required,
                    });
                }
            }
            if catalog.simple_tasks.is_empty() || catalog.complex_tasks.is_empty() {
                return Err(ConfigError::Catalog(format!(
                    "domain '{}' has an empty task pool",
                    catalog.domain
                )));
            }
            if let Some(tool) = catalog.tools.iter().find(|t| t.failure_modes.is_empty()) {
                return Err(ConfigError::Catalog(format!(
                    "tool '{}' in domain '{}' has no failure modes",
                    tool.tool_name, catalog.domain
                )));
            }
        }
        Ok(())
    }
}

/// Builds scenario text for a named usecase from the permutation pools.
///
/// Produces `"Handle issues {modifier}. {complication}."`.
pub fn usecase_scenario_text(usecase: &str, rng: &mut ChaCha8Rng) -> String {
    let modifier = standard::USECASE_MODIFIERS
        .choose(rng)
        .copied()
        .unwrap_or("while implementing {}")
        .replace("{}", usecase);
    let complication = standard::USECASE_COMPLICATIONS
        .choose(rng)
        .copied()
        .unwrap_or("The client is extremely demanding");
    format!("Handle issues {}. {}.", modifier, complication)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_standard_catalog_covers_all_domains() {
        let catalog = ToolCatalog::standard();
        for domain in Domain::all() {
            let entry = catalog.domain(domain).expect("domain registered");
            assert_eq!(entry.domain, domain);
            assert!(entry.tools.iter().all(|t| t.domain == domain));
        }
    }

    #[test]
    fn test_standard_catalog_satisfies_profiles() {
        ToolCatalog::standard()
            .validate_against(&ProfileTable::standard())
            .expect("standard catalog should satisfy standard profiles");
    }

    #[test]
    fn test_tool_names_unique_per_domain() {
        let catalog = ToolCatalog::standard();
        for domain in Domain::all() {
            let names: Vec<_> = catalog.domain(domain).unwrap().tool_names().collect();
            let mut deduped = names.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(names.len(), deduped.len(), "duplicate tool in {}", domain);
        }
    }

    #[test]
    fn test_unknown_domain_name() {
        let err = "underwater".parse::<Domain>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDomain(name) if name == "underwater"));
    }

    #[test]
    fn test_small_pool_rejected() {
        let mut domains = standard::domains();
        domains[0].tools.truncate(3);
        let catalog = ToolCatalog::from_domains(domains);
        let err = catalog
            .validate_against(&ProfileTable::standard())
            .unwrap_err();
        assert!(matches!(err, ConfigError::PoolTooSmall { pool: 3, .. }));
    }

    #[test]
    fn test_missing_domain_lookup() {
        let domains = standard::domains()
            .into_iter()
            .filter(|d| d.domain != Domain::Creative)
            .collect();
        let catalog = ToolCatalog::from_domains(domains);
        assert!(catalog.domain(Domain::Creative).is_err());
        assert!(!catalog.contains_tool(Domain::Creative, "design_tool"));
    }

    #[test]
    fn test_usecase_text_mentions_usecase() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let text = usecase_scenario_text("payment retries", &mut rng);
        assert!(text.starts_with("Handle issues "));
        assert!(text.contains("payment retries"));
        assert!(text.ends_with('.'));
    }
}
