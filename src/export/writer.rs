//! File output for scenarios and curricula.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Domain;
use crate::difficulty::DifficultyLevel;
use crate::error::ExportError;
use crate::generator::{Curriculum, Scenario};

use super::formats::{convert_batch, TrainingFormat};

/// Writes `scenarios` to `path` in `format`.
///
/// JSONL formats get one record per line, the rest a pretty-printed array.
/// Parent directories are created as needed. Returns the record count.
///
/// # Errors
///
/// Returns `ExportError::NoScenarios` for an empty batch, or an IO/JSON error.
pub fn write_records(
    path: impl AsRef<Path>,
    scenarios: &[Scenario],
    format: TrainingFormat,
) -> Result<usize, ExportError> {
    if scenarios.is_empty() {
        return Err(ExportError::NoScenarios);
    }
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let records = convert_batch(scenarios, format)?;
    let mut writer = BufWriter::new(File::create(path)?);
    if format.is_jsonl() {
        for record in &records {
            writeln!(writer, "{}", serde_json::to_string(record)?)?;
        }
    } else {
        serde_json::to_writer_pretty(&mut writer, &records)?;
        writeln!(writer)?;
    }
    writer.flush()?;

    Ok(records.len())
}

/// Reads scenarios from a JSON array or a JSONL file.
///
/// # Errors
///
/// Returns `ExportError::InvalidInput` naming the file and the problem.
pub fn read_scenarios(path: impl AsRef<Path>) -> Result<Vec<Scenario>, ExportError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let invalid = |reason: String| ExportError::InvalidInput {
        path: path.display().to_string(),
        reason,
    };

    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(|e| invalid(e.to_string()));
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| invalid(format!("line {}: {}", i + 1, e)))
        })
        .collect()
}

/// Metadata written next to a curriculum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumMetadata {
    pub generated_at: String,
    pub generator_version: String,
    pub total_scenarios: usize,
    pub per_level: BTreeMap<DifficultyLevel, usize>,
    pub per_domain: BTreeMap<Domain, usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Result of a curriculum write.
#[derive(Debug, Clone)]
pub struct CurriculumExport {
    pub complete_path: PathBuf,
    pub level_paths: BTreeMap<DifficultyLevel, PathBuf>,
    pub metadata_path: PathBuf,
    pub metadata: CurriculumMetadata,
    pub exported_at: DateTime<Utc>,
}

impl CurriculumExport {
    /// Every file written, complete file first.
    pub fn paths(&self) -> Vec<&Path> {
        std::iter::once(self.complete_path.as_path())
            .chain(self.level_paths.values().map(PathBuf::as_path))
            .chain(std::iter::once(self.metadata_path.as_path()))
            .collect()
    }
}

/// Writes a curriculum as `<base>_complete.json`, one `<base>_<level>.json`
/// per difficulty level and `<base>_metadata.json`.
///
/// # Example
///
/// ```ignore
/// use chaos_forge::export::CurriculumWriter;
///
/// let writer = CurriculumWriter::new("./data", "chaos_curriculum").with_seed(42);
/// let export = writer.write(&curriculum)?;
/// println!("Wrote {} scenarios", export.metadata.total_scenarios);
/// ```
pub struct CurriculumWriter {
    output_dir: PathBuf,
    base_name: String,
    seed: Option<u64>,
}

impl CurriculumWriter {
    pub fn new(output_dir: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            base_name: base_name.into(),
            seed: None,
        }
    }

    /// Records the seed the curriculum was generated with.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn path_for(&self, suffix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.json", self.base_name, suffix))
    }

    /// Writes all curriculum files.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::NoScenarios` for an empty curriculum, or an
    /// IO/JSON error.
    pub fn write(&self, curriculum: &Curriculum) -> Result<CurriculumExport, ExportError> {
        if curriculum.is_empty() {
            return Err(ExportError::NoScenarios);
        }
        fs::create_dir_all(&self.output_dir)?;

        let complete_path = self.path_for("complete");
        write_records(&complete_path, &curriculum.scenarios, TrainingFormat::Chaos)?;

        let mut level_paths = BTreeMap::new();
        for level in DifficultyLevel::all() {
            let scenarios: Vec<Scenario> = curriculum.by_difficulty(level).cloned().collect();
            let path = self.path_for(level.as_str());
            write_pretty(&path, &scenarios)?;
            level_paths.insert(level, path);
        }

        let exported_at = Utc::now();
        let summary = curriculum.summary();
        let metadata = CurriculumMetadata {
            generated_at: exported_at.to_rfc3339(),
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            total_scenarios: summary.total,
            per_level: summary.per_level,
            per_domain: summary.per_domain,
            seed: self.seed,
        };
        let metadata_path = self.path_for("metadata");
        write_pretty(&metadata_path, &metadata)?;

        tracing::info!(
            dir = %self.output_dir.display(),
            base = %self.base_name,
            scenarios = metadata.total_scenarios,
            "Curriculum written"
        );

        Ok(CurriculumExport {
            complete_path,
            level_paths,
            metadata_path,
            metadata,
            exported_at,
        })
    }
}

/// Pretty-prints any serializable value; an empty level still gets `[]`.
fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
