//! Categorical label encoders
//!
//! Each encoder maps the distinct string values of one column to dense codes
//! in `[0, n)`. Codes follow the byte-wise sort order of the distinct values,
//! so fitting the same column twice always yields the same mapping.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{OutfitError, Result};

/// Column holding the sky condition category
pub const WEATHER_COLUMN: &str = "weather";
/// Column holding the season category
pub const SEASON_COLUMN: &str = "season";
/// Column holding the composite outfit label
pub const OUTFIT_COLUMN: &str = "outfit";

/// Bidirectional mapping between the values of one categorical column and codes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelEncoder {
    /// Column this encoder was fitted on
    pub column: String,
    /// Sorted distinct values; a value's position is its code
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit an encoder over every value observed in `values`
    pub fn fit<I, S>(column: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = values
            .into_iter()
            .map(|value| value.as_ref().to_string())
            .collect();

        if classes.is_empty() {
            return Err(OutfitError::DatasetLoad(format!(
                "cannot fit encoder for column '{}' without values",
                column
            )));
        }

        classes.sort();
        classes.dedup();

        debug!(column, vocabulary = classes.len(), "fitted label encoder");

        Ok(Self {
            column: column.to_string(),
            classes,
        })
    }

    /// Code assigned to `value`
    pub fn encode(&self, value: &str) -> Result<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .map_err(|_| OutfitError::unknown_category(&self.column, value))
    }

    /// Value assigned to `code`
    pub fn decode(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| OutfitError::InvalidCode {
                column: self.column.clone(),
                code,
                size: self.classes.len(),
            })
    }

    pub fn contains(&self, value: &str) -> bool {
        self.encode(value).is_ok()
    }

    /// Vocabulary in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Check invariants of an encoder restored from disk
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(OutfitError::Artifact(format!(
                "encoder '{}' has an empty vocabulary",
                self.column
            )));
        }
        if self.classes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(OutfitError::Artifact(format!(
                "encoder '{}' vocabulary is not strictly sorted",
                self.column
            )));
        }
        Ok(())
    }
}

/// The three encoders fitted together from one dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncoderRegistry {
    pub weather: LabelEncoder,
    pub season: LabelEncoder,
    pub outfit: LabelEncoder,
}

impl EncoderRegistry {
    /// Fit all column encoders from parallel column slices
    pub fn fit<S: AsRef<str>>(weather: &[S], season: &[S], outfit: &[S]) -> Result<Self> {
        Ok(Self {
            weather: LabelEncoder::fit(WEATHER_COLUMN, weather)?,
            season: LabelEncoder::fit(SEASON_COLUMN, season)?,
            outfit: LabelEncoder::fit(OUTFIT_COLUMN, outfit)?,
        })
    }

    pub fn encode_weather(&self, value: &str) -> Result<usize> {
        self.weather.encode(value)
    }

    pub fn encode_season(&self, value: &str) -> Result<usize> {
        self.season.encode(value)
    }

    pub fn encode_outfit(&self, value: &str) -> Result<usize> {
        self.outfit.encode(value)
    }

    pub fn decode_outfit(&self, code: usize) -> Result<&str> {
        self.outfit.decode(code)
    }

    pub fn validate(&self) -> Result<()> {
        self.weather.validate()?;
        self.season.validate()?;
        self.outfit.validate()
    }
}
