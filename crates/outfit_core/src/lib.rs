//! Outfit recommendation core
//!
//! Encodes weather observations and predicts an outfit with a random forest
//! trained on labeled weather/season examples.
//!
//! Modules:
//! - `encoder`: Deterministic categorical encoders for sky condition, season and outfit
//! - `weather`: Sky condition and season vocabularies, provider category mapping
//! - `features`: Fixed five-column numeric feature vectors
//! - `forest`: Classification trees and plurality-vote forest inference
//! - `pipeline`: Encoders + forest as one immutable recommendation pipeline
//! - `artifact`: Versioned, hash-verified persistence of a pipeline
//! - `service`: Shared, hot-swappable pipeline holder for concurrent callers

pub mod artifact;
pub mod encoder;
pub mod errors;
pub mod features;
pub mod forest;
pub mod pipeline;
pub mod serde_canon;
pub mod service;
pub mod weather;

pub use artifact::{ModelArtifact, HASH_FILE, MODEL_FILE};
pub use encoder::{EncoderRegistry, LabelEncoder, OUTFIT_COLUMN, SEASON_COLUMN, WEATHER_COLUMN};
pub use errors::{OutfitError, Result};
pub use features::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};
pub use forest::{ForestModel, ForestParams, MaxFeatures, Node, Tree, VotePrediction};
pub use pipeline::{split_outfit, Observation, Pipeline, Recommendation};
pub use service::{Recommender, ServiceState};
pub use weather::{
    map_provider_category, ProviderCategory, ProviderReport, Season, SkyCondition, SkyFallback,
};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
