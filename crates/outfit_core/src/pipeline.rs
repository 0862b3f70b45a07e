//! Recommendation pipeline
//!
//! A [`Pipeline`] is the trained pair of encoder registry and forest. It is
//! immutable once built: every request only reads it, so one instance can be
//! shared across threads behind an `Arc`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoder::EncoderRegistry;
use crate::errors::{OutfitError, Result};
use crate::features::{FeatureVector, FEATURE_COUNT};
use crate::forest::ForestModel;

/// Raw weather observation as supplied by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    pub wind_speed: f64,
    pub sky_condition: String,
    pub season: String,
}

impl Observation {
    pub fn new(
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
        sky_condition: impl Into<String>,
        season: impl Into<String>,
    ) -> Self {
        Self {
            temperature,
            humidity,
            wind_speed,
            sky_condition: sky_condition.into(),
            season: season.into(),
        }
    }

    /// Reject numeric values outside their domain; nothing is clamped
    pub fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() {
            return Err(OutfitError::InvalidInput(format!(
                "temperature must be finite, got {}",
                self.temperature
            )));
        }
        if !self.humidity.is_finite() || !(0.0..=100.0).contains(&self.humidity) {
            return Err(OutfitError::InvalidInput(format!(
                "humidity must be within [0, 100], got {}",
                self.humidity
            )));
        }
        if !self.wind_speed.is_finite() || self.wind_speed < 0.0 {
            return Err(OutfitError::InvalidInput(format!(
                "wind speed must be non-negative, got {}",
                self.wind_speed
            )));
        }
        Ok(())
    }
}

/// Detailed recommendation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Composite outfit label, exactly as it appears in the training data
    pub outfit: String,
    /// Garment items of the label
    pub items: Vec<String>,
    /// Fraction of trees voting for the outfit
    pub confidence: f64,
}

/// Split a composite outfit label into its garment items
pub fn split_outfit(label: &str) -> Vec<String> {
    label
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trained encoders and forest, built and persisted together
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    encoders: EncoderRegistry,
    forest: ForestModel,
}

impl Pipeline {
    /// Pair fitted encoders with a forest trained on their codes
    pub fn new(encoders: EncoderRegistry, forest: ForestModel) -> Result<Self> {
        encoders.validate()?;
        forest.validate()?;

        if forest.n_features != FEATURE_COUNT {
            return Err(OutfitError::Artifact(format!(
                "forest expects {} features, pipeline provides {}",
                forest.n_features, FEATURE_COUNT
            )));
        }
        if forest.n_classes != encoders.outfit.len() {
            return Err(OutfitError::Artifact(format!(
                "forest has {} classes but the outfit vocabulary has {}",
                forest.n_classes,
                encoders.outfit.len()
            )));
        }

        Ok(Self { encoders, forest })
    }

    pub fn encoders(&self) -> &EncoderRegistry {
        &self.encoders
    }

    pub fn forest(&self) -> &ForestModel {
        &self.forest
    }

    pub fn into_parts(self) -> (EncoderRegistry, ForestModel) {
        (self.encoders, self.forest)
    }

    /// Validate and encode an observation into the model's feature vector
    pub fn encode(&self, observation: &Observation) -> Result<FeatureVector> {
        observation.validate()?;
        let sky_code = self.encoders.encode_weather(&observation.sky_condition)?;
        let season_code = self.encoders.encode_season(&observation.season)?;

        Ok(FeatureVector::new(
            observation.temperature,
            observation.humidity,
            observation.wind_speed,
            sky_code,
            season_code,
        ))
    }

    /// Recommend an outfit label for the observation
    pub fn recommend(&self, observation: &Observation) -> Result<String> {
        Ok(self.recommend_detailed(observation)?.outfit)
    }

    pub fn recommend_detailed(&self, observation: &Observation) -> Result<Recommendation> {
        let features = self.encode(observation)?;
        let prediction = self.forest.predict_with_votes(features.as_slice())?;
        let outfit = self.encoders.decode_outfit(prediction.class)?;

        debug!(
            sky = %observation.sky_condition,
            season = %observation.season,
            outfit,
            confidence = prediction.confidence,
            "recommendation"
        );

        Ok(Recommendation {
            outfit: outfit.to_string(),
            items: split_outfit(outfit),
            confidence: prediction.confidence,
        })
    }

    /// Positional form of [`Pipeline::recommend`]
    pub fn recommend_values(
        &self,
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
        sky_condition: &str,
        season: &str,
    ) -> Result<String> {
        self.recommend(&Observation::new(
            temperature,
            humidity,
            wind_speed,
            sky_condition,
            season,
        ))
    }

    pub fn sky_conditions(&self) -> &[String] {
        self.encoders.weather.classes()
    }

    pub fn seasons(&self) -> &[String] {
        self.encoders.season.classes()
    }

    pub fn outfits(&self) -> &[String] {
        self.encoders.outfit.classes()
    }
}
