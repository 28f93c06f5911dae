//! End-to-end curriculum build and export.

use chaos_forge::catalog::Domain;
use chaos_forge::difficulty::DifficultyLevel;
use chaos_forge::export::{read_scenarios, write_records, CurriculumMetadata, CurriculumWriter, TrainingFormat};
use chaos_forge::generator::{build_curriculum, ChaosGenerator};
use chaos_forge::GeneratorConfig;
use tempfile::TempDir;

#[test]
fn curriculum_export_writes_consistent_files() {
    let dir = TempDir::new().unwrap();
    let mut config = GeneratorConfig::new()
        .with_seed(404)
        .with_domains(vec![Domain::Technical, Domain::Creative]);
    let seed = config.resolve_seed();
    let mut rng = config.rng();

    let generator = ChaosGenerator::standard().unwrap();
    let curriculum = build_curriculum(&generator, 4, Some(config.domains.as_slice()), &mut rng).unwrap();
    let export = CurriculumWriter::new(dir.path().join("out"), "run")
        .with_seed(seed)
        .write(&curriculum)
        .unwrap();

    let paths = export.paths();
    assert_eq!(paths.len(), 7);
    assert!(paths.iter().all(|p| p.exists()));

    let complete = read_scenarios(&export.complete_path).unwrap();
    assert_eq!(complete.len(), 20);
    assert!(complete
        .iter()
        .all(|s| matches!(s.domain, Domain::Technical | Domain::Creative)));

    let mut per_level_total = 0;
    for level in DifficultyLevel::all() {
        let scenarios = read_scenarios(&export.level_paths[&level]).unwrap();
        assert_eq!(scenarios.len(), 4, "{}", level);
        per_level_total += scenarios.len();
    }
    assert_eq!(per_level_total, complete.len());

    let metadata: CurriculumMetadata =
        serde_json::from_str(&std::fs::read_to_string(&export.metadata_path).unwrap()).unwrap();
    assert_eq!(metadata.total_scenarios, 20);
    assert_eq!(metadata.seed, Some(404));
    assert_eq!(metadata.per_domain[&Domain::Technical], 10);
    assert_eq!(metadata.per_domain[&Domain::Creative], 10);
}

#[test]
fn training_formats_write_from_a_curriculum() {
    let dir = TempDir::new().unwrap();
    let mut config = GeneratorConfig::new().with_seed(5);
    let mut rng = config.rng();
    let generator = ChaosGenerator::standard().unwrap();
    let curriculum = build_curriculum(&generator, 1, None, &mut rng).unwrap();

    for format in TrainingFormat::all() {
        let path = dir.path().join(format!("train_{}.{}", format, format.extension()));
        let written = write_records(&path, &curriculum.scenarios, format).unwrap();
        assert_eq!(written, 5, "{}", format);

        let content = std::fs::read_to_string(&path).unwrap();
        if format.is_jsonl() {
            assert_eq!(content.lines().count(), 5);
        } else {
            let parsed: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
            assert_eq!(parsed.len(), 5);
        }
    }
}
