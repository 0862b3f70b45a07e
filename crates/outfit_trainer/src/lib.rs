//! Outfit Trainer - deterministic random forest training
//!
//! Loads the labeled weather/outfit dataset, fits the category encoders and
//! trains the forest that backs an [`outfit_core::Pipeline`].

pub mod cart;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod deterministic;
pub mod trainer;

use outfit_core::{ForestParams, Pipeline, Result};
use std::path::Path;
use tracing::info;

pub use classifier::OutfitClassifier;
pub use config::OutfitConfig;
pub use dataset::{Dataset, FeatureStats, TrainingExample, REQUIRED_COLUMNS};
pub use deterministic::{LcgRng, SplitTieBreaker};
pub use trainer::ForestTrainer;

/// Fit encoders and forest on the whole dataset
pub fn train_pipeline(dataset: &Dataset, params: ForestParams) -> Result<Pipeline> {
    let encoders = dataset.fit_encoders()?;
    info!(
        sky_conditions = encoders.weather.len(),
        seasons = encoders.season.len(),
        outfits = encoders.outfit.len(),
        "fitted encoders"
    );

    let (features, labels) = dataset.encode(&encoders)?;
    let mut classifier = OutfitClassifier::new(params);
    classifier.fit_vectors(&features, &labels)?;

    Pipeline::new(encoders, classifier.into_model()?)
}

/// Load a CSV dataset and train a pipeline from it
pub fn train_pipeline_from_csv(path: &Path, params: ForestParams) -> Result<Pipeline> {
    let dataset = Dataset::from_csv(path)?;
    train_pipeline(&dataset, params)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
