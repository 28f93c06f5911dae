//! CLI command definitions for chaos-forge.
//!
//! Three commands: generate individual scenarios, build and persist a full
//! curriculum, and convert existing scenario files to a training format.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::catalog::Domain;
use crate::config::GeneratorConfig;
use crate::difficulty::DifficultyLevel;
use crate::enhance::TextEnhancer;
use crate::export::{convert_batch, read_scenarios, write_records, CurriculumWriter, TrainingFormat};
use crate::generator::{
    build_curriculum, build_curriculum_parallel, ChaosGenerator, Curriculum, EnhancementOptions,
    Scenario,
};

/// Default output directory for curricula.
const DEFAULT_OUTPUT_DIR: &str = "./chaos-data";

/// Default file name prefix for curricula.
const DEFAULT_BASE_NAME: &str = "chaos_curriculum";

/// Progressive reasoning-trace scenario generator.
#[derive(Parser)]
#[command(name = "chaos-forge")]
#[command(about = "Generate progressive reasoning-under-uncertainty training scenarios")]
#[command(version)]
#[command(
    long_about = "chaos-forge synthesizes training scenarios with multi-voice deliberation, \
reality breaks and confidence trajectories, from simple single-tool tasks to chaotic ones.\n\n\
Example usage:\n  chaos-forge generate --domain technical --difficulty chaotic --seed 42\n  \
chaos-forge curriculum --count-per-level 25 --output ./chaos-data"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// YAML configuration file; CHAOS_* environment variables override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate one or more scenarios for a domain and difficulty.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Build a balanced curriculum across all difficulty levels and write it to disk.
    Curriculum(CurriculumArgs),

    /// Convert a scenario file into a training format.
    Convert(ConvertArgs),
}

/// Options shared by the generating commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GenerationOptions {
    /// Random seed for reproducible output.
    #[arg(long, env = "CHAOS_SEED")]
    pub seed: Option<u64>,

    /// Rewrite prose through the configured LLM endpoint.
    #[arg(long)]
    pub enhance: bool,

    /// Also rewrite voice statements (implies --enhance).
    #[arg(long)]
    pub enhance_voices: bool,

    /// Per-call enhancement timeout in seconds.
    #[arg(long)]
    pub enhance_timeout: Option<u64>,
}

/// Arguments for the generate command.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Scenario domain (technical, business, research, creative).
    #[arg(short = 'd', long, default_value = "technical")]
    pub domain: Domain,

    /// Difficulty level (simple, basic, intermediate, advanced, chaotic).
    /// Defaults to intermediate; with --usecase and no level the batch spans all levels.
    #[arg(short = 'D', long)]
    pub difficulty: Option<DifficultyLevel>,

    /// Number of scenarios to generate.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// Build the scenario text around this usecase.
    #[arg(short = 'u', long)]
    pub usecase: Option<String>,

    /// Output format (chaos, alpaca, openai, simple, thought).
    #[arg(short = 'f', long, default_value = "chaos")]
    pub format: TrainingFormat,

    /// Output file; prints to stdout when omitted.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub options: GenerationOptions,
}

/// Arguments for the curriculum command.
#[derive(Parser, Debug)]
pub struct CurriculumArgs {
    /// Scenarios per difficulty level.
    #[arg(short = 'n', long, default_value_t = 25)]
    pub count_per_level: usize,

    /// Comma-separated domains to cycle through (default: all, or the config file's list).
    #[arg(long, value_delimiter = ',')]
    pub domains: Vec<Domain>,

    /// Output directory.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// File name prefix.
    #[arg(short = 'b', long, default_value = DEFAULT_BASE_NAME)]
    pub base_name: String,

    /// Generate difficulty levels on parallel workers.
    #[arg(long)]
    pub parallel: bool,

    #[command(flatten)]
    pub options: GenerationOptions,
}

/// Arguments for the convert command.
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Scenario file (JSON array or JSONL).
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Target format (chaos, alpaca, openai, simple, thought).
    #[arg(short = 'f', long, default_value = "openai")]
    pub format: TrainingFormat,

    /// Output file; defaults to `<input stem>_<format>.<json|jsonl>` next to the input.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_ref())?;
    match cli.command {
        Commands::Generate(args) => run_generate_command(args, config).await,
        Commands::Curriculum(args) => run_curriculum_command(args, config).await,
        Commands::Convert(args) => run_convert_command(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<GeneratorConfig> {
    Ok(GeneratorConfig::load(
        path.map(PathBuf::as_path),
        |key| std::env::var(key).ok(),
    )?)
}

fn apply_options(mut config: GeneratorConfig, options: &GenerationOptions) -> anyhow::Result<GeneratorConfig> {
    if let Some(seed) = options.seed {
        config.seed = Some(seed);
    }
    if options.enhance || options.enhance_voices {
        config.enhance = true;
    }
    if options.enhance_voices {
        config.enhance_voices = true;
    }
    if let Some(secs) = options.enhance_timeout {
        config = config.with_enhance_timeout(Duration::from_secs(secs));
    }
    config.validate()?;
    Ok(config)
}

/// Runs the enhancement pass over every scenario when enabled.
async fn maybe_enhance(
    generator: &ChaosGenerator,
    scenarios: Vec<Scenario>,
    config: &GeneratorConfig,
) -> anyhow::Result<Vec<Scenario>> {
    if !config.enhance {
        return Ok(scenarios);
    }
    let enhancer: Arc<dyn TextEnhancer> = config.build_enhancer()?;
    let options: EnhancementOptions = config.enhancement_options();
    info!(enhancer = enhancer.name(), count = scenarios.len(), "Enhancing scenarios");

    let mut enhanced = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        enhanced.push(
            generator
                .enhance_scenario(scenario, enhancer.as_ref(), &options)
                .await?,
        );
    }
    Ok(enhanced)
}

// ============================================================================
// Generate Command Implementation
// ============================================================================

async fn run_generate_command(args: GenerateArgs, config: GeneratorConfig) -> anyhow::Result<()> {
    let mut config = apply_options(config, &args.options)?;
    let seed = config.resolve_seed();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let generator = ChaosGenerator::standard()?;

    let scenarios = generate_batch(&generator, &args, &mut rng)?;
    let scenarios = maybe_enhance(&generator, scenarios, &config).await?;

    match args.output {
        Some(path) => {
            let written = write_records(&path, &scenarios, args.format)?;
            info!(
                path = %path.display(),
                format = %args.format,
                count = written,
                seed,
                "Scenarios written"
            );
        }
        None => print_records(&scenarios, args.format)?,
    }
    Ok(())
}

fn generate_batch(
    generator: &ChaosGenerator,
    args: &GenerateArgs,
    rng: &mut ChaCha8Rng,
) -> anyhow::Result<Vec<Scenario>> {
    if let Some(usecase) = args.usecase.as_deref() {
        return Ok(generator.generate_usecase_batch(
            args.domain,
            usecase,
            args.count,
            args.difficulty,
            rng,
        )?);
    }
    let level = args.difficulty.unwrap_or(DifficultyLevel::Intermediate);
    let mut scenarios = Vec::with_capacity(args.count);
    for _ in 0..args.count {
        scenarios.push(generator.generate_progressive_scenario(args.domain, level, rng)?);
    }
    Ok(scenarios)
}

fn print_records(scenarios: &[Scenario], format: TrainingFormat) -> anyhow::Result<()> {
    let records = convert_batch(scenarios, format)?;
    if format.is_jsonl() {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
    } else if let [single] = records.as_slice() {
        println!("{}", serde_json::to_string_pretty(single)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }
    Ok(())
}

// ============================================================================
// Curriculum Command Implementation
// ============================================================================

async fn run_curriculum_command(
    args: CurriculumArgs,
    config: GeneratorConfig,
) -> anyhow::Result<()> {
    let mut config = apply_options(config, &args.options)?;
    let seed = config.resolve_seed();
    let domains = if args.domains.is_empty() {
        config.domains.clone()
    } else {
        args.domains.clone()
    };
    let generator = ChaosGenerator::standard()?;

    info!(
        count_per_level = args.count_per_level,
        domains = domains.len(),
        parallel = args.parallel,
        seed,
        "Building curriculum"
    );

    let curriculum = if args.parallel {
        build_curriculum_parallel(
            Arc::new(generator.clone()),
            args.count_per_level,
            Some(domains),
            seed,
        )
        .await?
    } else {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        build_curriculum(&generator, args.count_per_level, Some(domains.as_slice()), &mut rng)?
    };

    let curriculum = Curriculum {
        scenarios: maybe_enhance(&generator, curriculum.scenarios, &config).await?,
    };

    let export = CurriculumWriter::new(&args.output, &args.base_name)
        .with_seed(seed)
        .write(&curriculum)?;

    println!("Curriculum: {} scenarios", export.metadata.total_scenarios);
    for (level, count) in &export.metadata.per_level {
        println!("  {:<13} {}", level, count);
    }
    for path in export.paths() {
        println!("  wrote {}", path.display());
    }
    Ok(())
}

// ============================================================================
// Convert Command Implementation
// ============================================================================

fn run_convert_command(args: ConvertArgs) -> anyhow::Result<()> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_convert_output(&args.input, args.format));
    let scenarios = read_scenarios(&args.input)?;
    let written = write_records(&output, &scenarios, args.format)?;
    info!(
        input = %args.input.display(),
        output = %output.display(),
        format = %args.format,
        count = written,
        "Converted scenarios"
    );
    Ok(())
}

fn default_convert_output(input: &Path, format: TrainingFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scenarios".to_string());
    input.with_file_name(format!("{}_{}.{}", stem, format, format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_command_defaults() {
        let cli = Cli::try_parse_from(["chaos-forge", "generate"]).expect("should parse");
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.domain, Domain::Technical);
                assert_eq!(args.difficulty, None);
                assert_eq!(args.count, 1);
                assert_eq!(args.format, TrainingFormat::Chaos);
                assert!(args.output.is_none());
                assert!(!args.options.enhance);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_generate_alias_and_options() {
        let cli = Cli::try_parse_from([
            "chaos-forge",
            "gen",
            "-d",
            "research",
            "-D",
            "chaotic",
            "-n",
            "3",
            "--usecase",
            "data migration",
            "--seed",
            "42",
            "-f",
            "alpaca",
        ])
        .expect("should parse");
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.domain, Domain::Research);
                assert_eq!(args.difficulty, Some(DifficultyLevel::Chaotic));
                assert_eq!(args.count, 3);
                assert_eq!(args.usecase.as_deref(), Some("data migration"));
                assert_eq!(args.options.seed, Some(42));
                assert_eq!(args.format, TrainingFormat::Alpaca);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_unknown_domain_rejected_by_parser() {
        assert!(Cli::try_parse_from(["chaos-forge", "generate", "-d", "underwater"]).is_err());
        assert!(Cli::try_parse_from(["chaos-forge", "generate", "-D", "legendary"]).is_err());
    }

    #[test]
    fn test_curriculum_domains_list() {
        let cli = Cli::try_parse_from([
            "chaos-forge",
            "curriculum",
            "--domains",
            "business,creative",
            "--parallel",
        ])
        .expect("should parse");
        match cli.command {
            Commands::Curriculum(args) => {
                assert_eq!(args.domains, vec![Domain::Business, Domain::Creative]);
                assert_eq!(args.count_per_level, 25);
                assert!(args.parallel);
                assert_eq!(args.base_name, DEFAULT_BASE_NAME);
            }
            _ => panic!("Expected Curriculum command"),
        }
    }

    #[tokio::test]
    async fn test_curriculum_then_convert() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().to_str().unwrap();

        let cli = Cli::try_parse_from([
            "chaos-forge",
            "curriculum",
            "-n",
            "2",
            "-o",
            out,
            "-b",
            "run",
            "--seed",
            "5",
        ])
        .unwrap();
        run_with_cli(cli).await.unwrap();
        assert!(dir.path().join("run_metadata.json").exists());

        let input = dir.path().join("run_complete.json");
        let output = dir.path().join("run_openai.jsonl");
        let cli = Cli::try_parse_from([
            "chaos-forge",
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run_with_cli(cli).await.unwrap();

        let lines = std::fs::read_to_string(&output).unwrap().lines().count();
        assert_eq!(lines, 10);

        let cli = Cli::try_parse_from([
            "chaos-forge",
            "convert",
            "-i",
            input.to_str().unwrap(),
            "-f",
            "alpaca",
        ])
        .unwrap();
        run_with_cli(cli).await.unwrap();
        assert!(dir.path().join("run_complete_alpaca.json").exists());
    }

    #[test]
    fn test_default_convert_output() {
        let path = default_convert_output(Path::new("data/run_complete.json"), TrainingFormat::OpenAi);
        assert_eq!(path, Path::new("data/run_complete_openai.jsonl"));
    }

    #[tokio::test]
    async fn test_usecase_generate_spans_levels() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("usecase.json");
        let cli = Cli::try_parse_from([
            "chaos-forge",
            "generate",
            "--usecase",
            "payment retries",
            "-n",
            "10",
            "--seed",
            "3",
            "--enhance-timeout",
            "5",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        run_with_cli(cli).await.unwrap();

        let scenarios = read_scenarios(&output).unwrap();
        assert_eq!(scenarios.len(), 10);
        for level in DifficultyLevel::all() {
            assert_eq!(scenarios.iter().filter(|s| s.difficulty == level).count(), 2);
        }
    }
}
