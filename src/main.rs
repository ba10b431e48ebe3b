// Command-line runner for the `verdict_vision` library: classify image files, write a
// synthetic test set, or simulate the producer/consumer flow against the worker pools.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;
use verdict_vision::parallel_pipeline::ParallelPipeline;
use verdict_vision::producer::{self, PayloadSource};
use verdict_vision::{Category, ClassificationEngine, EngineConfig, ImagePayload, synthetic, telemetry};

#[derive(Parser, Debug)]
#[command(name = "verdict_vision", version, about = "Sentiment and football-crest classification from pixel statistics")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "VERDICT_VISION_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs and results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify image files
    Classify {
        /// face, team (or football)
        #[arg(long)]
        category: Category,

        /// Also print the extracted feature vector
        #[arg(long)]
        features: bool,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Write a synthetic test set (faces/ and teams/)
    Generate {
        #[arg(long, default_value = "test-images")]
        out: PathBuf,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Publish payloads to the worker pools and report the results
    Simulate {
        #[arg(long, default_value = "test-images/faces")]
        faces: PathBuf,

        #[arg(long, default_value = "test-images/teams")]
        teams: PathBuf,

        /// Number of payloads to publish
        #[arg(long, default_value_t = 60)]
        count: usize,

        /// Payloads per second; 0 publishes as fast as possible
        #[arg(long, default_value_t = 6.0)]
        rate: f64,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.json);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify {
            category,
            features,
            files,
        } => cmd_classify(&config, category, features, &files, cli.json),
        Commands::Generate { out, seed } => cmd_generate(&out, seed),
        Commands::Simulate {
            faces,
            teams,
            count,
            rate,
            seed,
        } => cmd_simulate(&config, &faces, &teams, count, rate, seed, cli.json).await,
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_toml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn cmd_classify(
    config: &EngineConfig,
    category: Category,
    show_features: bool,
    files: &[PathBuf],
    json: bool,
) -> Result<()> {
    let engine = ClassificationEngine::from_config(config)?;

    for path in files {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let payload = ImagePayload::with_fresh_id(category, filename, bytes);
        let result = engine.process(&payload);

        if json {
            let mut line = serde_json::json!({
                "file": path.display().to_string(),
                "result": result,
            });
            if show_features {
                line["features"] = serde_json::to_value(engine.features(&payload.bytes, category.profile())?)?;
            }
            println!("{line}");
        } else {
            println!("{}: {}", path.display(), result);
            if show_features {
                println!("  features: {:?}", engine.features(&payload.bytes, category.profile())?);
            }
        }
    }

    Ok(())
}

fn cmd_generate(out: &std::path::Path, seed: Option<u64>) -> Result<()> {
    let mut rng = rng_from(seed);
    let (faces, teams) = synthetic::write_test_set(out, &mut rng)?;

    println!("Created {faces} face images in {}", out.join("faces").display());
    println!("Created {teams} team images in {}", out.join("teams").display());
    Ok(())
}

async fn cmd_simulate(
    config: &EngineConfig,
    faces: &std::path::Path,
    teams: &std::path::Path,
    count: usize,
    rate: f64,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut rng = rng_from(seed);
    let source = PayloadSource::from_directories(faces, teams, &mut rng)?;
    let pipeline = Arc::new(ParallelPipeline::new(config)?);

    tracing::info!(
        count,
        rate,
        workers = config.workers.worker_count(),
        latency = ?config.latency.mode,
        "starting simulation"
    );
    let summary = producer::run_simulation(&source, Arc::clone(&pipeline), count, rate, &mut rng).await?;

    if let Ok(pipeline) = Arc::try_unwrap(pipeline) {
        pipeline.shutdown().await;
    }

    if json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!(
            "Published {} payloads ({} faces, {} teams), {} lost",
            summary.published, summary.faces, summary.teams, summary.lost
        );
        for (label, count) in &summary.labels {
            println!("  {label:<14} {count}");
        }
    }

    Ok(())
}
