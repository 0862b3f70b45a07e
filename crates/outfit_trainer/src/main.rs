//! Outfit CLI
//!
//! Trains the deterministic outfit forest, persists it, and answers
//! recommendation requests from the command line.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use outfit_core::{
    map_provider_category, ModelArtifact, Observation, Pipeline, Season, SkyFallback, MODEL_FILE,
};
use outfit_trainer::{train_pipeline, Dataset, OutfitConfig};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "outfit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic weather-based outfit recommender", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train on the dataset and write the model artifact
    Train(TrainArgs),
    /// Recommend an outfit for the given conditions
    Recommend(RecommendArgs),
    /// List the sky conditions, seasons and outfits the model knows
    Vocab(ModelSource),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Input CSV dataset path
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Output directory for model and hash
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of trees
    #[arg(long)]
    trees: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct ModelSource {
    /// Trained model artifact to load
    #[arg(long, conflicts_with = "dataset")]
    model: Option<PathBuf>,

    /// Train from this dataset instead of loading an artifact
    #[arg(long)]
    dataset: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RecommendArgs {
    /// Temperature in degrees Celsius
    #[arg(long, allow_hyphen_values = true)]
    temp: f64,

    /// Relative humidity percentage (0-100)
    #[arg(long, allow_hyphen_values = true)]
    humidity: f64,

    /// Wind speed
    #[arg(long, allow_hyphen_values = true)]
    wind: f64,

    /// Sky condition (sunny, cloudy, rainy, snowy, windy)
    #[arg(long, required_unless_present = "provider_category")]
    sky: Option<String>,

    /// Raw weather provider category (Clear, Clouds, Rain, ...)
    #[arg(long, conflicts_with = "sky")]
    provider_category: Option<String>,

    /// Treat unmapped provider categories as sunny
    #[arg(long, requires = "provider_category")]
    lenient_sky: bool,

    /// Season; defaults to the season of today's date
    #[arg(long)]
    season: Option<String>,

    #[command(flatten)]
    source: ModelSource,
}

fn init_logging(level: &str, verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(level).with_context(|| format!("Invalid log level: {}", level))?
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

fn train_from(path: &Path, config: &OutfitConfig) -> Result<Pipeline> {
    let dataset = Dataset::from_csv(path).context("Failed to load dataset")?;
    for stats in dataset.feature_stats() {
        info!("  {}: min={}, max={}", stats.column, stats.min, stats.max);
    }
    train_pipeline(&dataset, config.forest).context("Failed to train model")
}

/// Resolve the pipeline: explicit model, explicit dataset, saved artifact, configured dataset
fn resolve_pipeline(source: &ModelSource, config: &OutfitConfig) -> Result<Pipeline> {
    if let Some(model) = &source.model {
        return Pipeline::load(model)
            .with_context(|| format!("Failed to load model {}", model.display()));
    }
    if let Some(dataset) = &source.dataset {
        return train_from(dataset, config);
    }

    let saved = config.artifact.dir.join(MODEL_FILE);
    if saved.exists() {
        return Pipeline::load(&saved)
            .with_context(|| format!("Failed to load model {}", saved.display()));
    }

    info!(
        "No saved model at {}, training from {}",
        saved.display(),
        config.dataset.path.display()
    );
    train_from(&config.dataset.path, config)
}

fn run_train(args: TrainArgs, mut config: OutfitConfig) -> Result<()> {
    if let Some(trees) = args.trees {
        config.forest.n_trees = trees;
    }
    if let Some(depth) = args.max_depth {
        config.forest.max_depth = depth;
    }
    if let Some(seed) = args.seed {
        config.forest.seed = seed;
    }
    config.validate()?;

    let dataset = args.dataset.unwrap_or_else(|| config.dataset.path.clone());
    let output = args.output.unwrap_or_else(|| config.artifact.dir.clone());

    info!("Training configuration:");
    info!("  Dataset: {}", dataset.display());
    info!("  Trees: {}", config.forest.n_trees);
    info!("  Max depth: {}", config.forest.max_depth);
    info!("  Max features: {:?}", config.forest.max_features);
    info!("  Seed: {}", config.forest.seed);

    let pipeline = train_from(&dataset, &config)?;
    let artifact = ModelArtifact::from_pipeline(&pipeline)?;
    let path = artifact
        .save(&output)
        .with_context(|| format!("Failed to write model to {}", output.display()))?;

    info!("Training completed successfully");
    info!("  Model: {}", path.display());
    info!("  Hash: {}", artifact.model_hash);
    Ok(())
}

fn run_recommend(args: RecommendArgs, config: &OutfitConfig) -> Result<()> {
    let sky = match (&args.sky, &args.provider_category) {
        (Some(sky), _) => sky.clone(),
        (None, Some(category)) => {
            let fallback = if args.lenient_sky {
                SkyFallback::Sunny
            } else {
                config.weather.sky_fallback
            };
            map_provider_category(category, fallback)?.to_string()
        }
        (None, None) => anyhow::bail!("either --sky or --provider-category is required"),
    };

    let season = match args.season {
        Some(season) => season,
        None => {
            let season = Season::current();
            info!("No season given, using {}", season);
            season.to_string()
        }
    };

    let pipeline = resolve_pipeline(&args.source, config)?;
    let observation = Observation::new(args.temp, args.humidity, args.wind, sky, season);

    match pipeline.recommend_detailed(&observation) {
        Ok(recommendation) => {
            println!("{}", recommendation.outfit);
            info!(
                "confidence {:.1}% ({} trees)",
                recommendation.confidence * 100.0,
                pipeline.forest().num_trees()
            );
            Ok(())
        }
        Err(err) => {
            if err.is_recoverable() {
                warn!("Request rejected: {}", err);
            }
            Err(err.into())
        }
    }
}

fn run_vocab(source: ModelSource, config: &OutfitConfig) -> Result<()> {
    let pipeline = resolve_pipeline(&source, config)?;
    println!("sky conditions: {}", pipeline.sky_conditions().join(", "));
    println!("seasons: {}", pipeline.seasons().join(", "));
    println!("outfits:");
    for (code, outfit) in pipeline.outfits().iter().enumerate() {
        println!("  {:>3}  {}", code, outfit);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = OutfitConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(&config.logging.level, cli.verbose)?;

    info!("Outfit recommender v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Train(args) => run_train(args, config),
        Command::Recommend(args) => run_recommend(args, &config),
        Command::Vocab(source) => run_vocab(source, &config),
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}
