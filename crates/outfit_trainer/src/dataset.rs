//! CSV dataset loading and validation
//!
//! Expected header (exact names, any order, extra columns ignored):
//! `temp,humidity,wind_speed,weather,season,outfit`. Outfit labels contain
//! commas and must be quoted.

use outfit_core::{EncoderRegistry, FeatureVector, OutfitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns every dataset must provide
pub const REQUIRED_COLUMNS: [&str; 6] =
    ["temp", "humidity", "wind_speed", "weather", "season", "outfit"];

/// One labeled row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    #[serde(rename = "weather")]
    pub sky_condition: String,
    pub season: String,
    pub outfit: String,
}

impl TrainingExample {
    /// Domain check; the caller prefixes the row location
    fn check(&self) -> std::result::Result<(), String> {
        if !self.temperature.is_finite() {
            return Err(format!("temp is not finite: {}", self.temperature));
        }
        if !self.humidity.is_finite() || !(0.0..=100.0).contains(&self.humidity) {
            return Err(format!("humidity {} outside [0, 100]", self.humidity));
        }
        if !self.wind_speed.is_finite() || self.wind_speed < 0.0 {
            return Err(format!("wind_speed {} is negative", self.wind_speed));
        }
        for (column, value) in [
            ("weather", &self.sky_condition),
            ("season", &self.season),
            ("outfit", &self.outfit),
        ] {
            if value.is_empty() {
                return Err(format!("empty {} value", column));
            }
        }
        Ok(())
    }
}

/// Per-column numeric range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStats {
    pub column: &'static str,
    pub min: f64,
    pub max: f64,
}

/// Validated, non-empty training dataset
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    examples: Vec<TrainingExample>,
}

impl Dataset {
    /// Load dataset from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| {
            OutfitError::DatasetLoad(format!("cannot open {}: {}", path.display(), err))
        })?;

        let dataset = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            "loaded training dataset"
        );
        Ok(dataset)
    }

    /// Load dataset from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            // Header names are matched verbatim; only values are trimmed
            .trim(csv::Trim::Fields)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|err| OutfitError::DatasetLoad(format!("cannot read header: {}", err)))?
            .clone();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(OutfitError::DatasetLoad(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let mut examples = Vec::new();
        for (row_idx, record) in csv_reader.deserialize::<TrainingExample>().enumerate() {
            // header occupies line 1
            let line = row_idx + 2;
            let example = record
                .map_err(|err| OutfitError::DatasetLoad(format!("line {}: {}", line, err)))?;
            example
                .check()
                .map_err(|msg| OutfitError::DatasetLoad(format!("line {}: {}", line, msg)))?;
            examples.push(example);
        }

        Self::from_checked(examples)
    }

    /// Build from in-memory rows; errors name the 1-based row
    pub fn from_examples(examples: Vec<TrainingExample>) -> Result<Self> {
        for (idx, example) in examples.iter().enumerate() {
            example
                .check()
                .map_err(|msg| OutfitError::DatasetLoad(format!("row {}: {}", idx + 1, msg)))?;
        }
        Self::from_checked(examples)
    }

    fn from_checked(examples: Vec<TrainingExample>) -> Result<Self> {
        if examples.is_empty() {
            return Err(OutfitError::DatasetLoad("dataset is empty".to_string()));
        }
        debug!(rows = examples.len(), "dataset validated");
        Ok(Self { examples })
    }

    pub fn examples(&self) -> &[TrainingExample] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Fit the sky condition, season and outfit encoders on this dataset
    pub fn fit_encoders(&self) -> Result<EncoderRegistry> {
        let weather: Vec<&str> = self.examples.iter().map(|e| e.sky_condition.as_str()).collect();
        let season: Vec<&str> = self.examples.iter().map(|e| e.season.as_str()).collect();
        let outfit: Vec<&str> = self.examples.iter().map(|e| e.outfit.as_str()).collect();
        EncoderRegistry::fit(&weather, &season, &outfit)
    }

    /// Encode every row into a feature vector and label code
    pub fn encode(&self, encoders: &EncoderRegistry) -> Result<(Vec<FeatureVector>, Vec<usize>)> {
        let mut features = Vec::with_capacity(self.len());
        let mut labels = Vec::with_capacity(self.len());

        for example in &self.examples {
            features.push(FeatureVector::new(
                example.temperature,
                example.humidity,
                example.wind_speed,
                encoders.encode_weather(&example.sky_condition)?,
                encoders.encode_season(&example.season)?,
            ));
            labels.push(encoders.encode_outfit(&example.outfit)?);
        }

        Ok((features, labels))
    }

    /// Distinct `(sky condition, season)` pairs present in the data
    pub fn category_pairs(&self) -> BTreeSet<(String, String)> {
        self.examples
            .iter()
            .map(|e| (e.sky_condition.clone(), e.season.clone()))
            .collect()
    }

    /// Distinct outfit labels
    pub fn outfit_labels(&self) -> BTreeSet<&str> {
        self.examples.iter().map(|e| e.outfit.as_str()).collect()
    }

    /// Min/max of the numeric columns
    pub fn feature_stats(&self) -> [FeatureStats; 3] {
        let range = |column: &'static str, pick: fn(&TrainingExample) -> f64| {
            let (min, max) = self
                .examples
                .iter()
                .map(pick)
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(v), hi.max(v))
                });
            FeatureStats { column, min, max }
        };

        [
            range("temp", |e| e.temperature),
            range("humidity", |e| e.humidity),
            range("wind_speed", |e| e.wind_speed),
        ]
    }
}
