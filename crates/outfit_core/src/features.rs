//! Numeric feature vectors fed to the forest
//!
//! Column order is fixed: temperature, humidity, wind speed, sky condition
//! code, season code. Training and inference must agree on it.

use serde::{Deserialize, Serialize};

use crate::errors::{OutfitError, Result};

/// Number of model features
pub const FEATURE_COUNT: usize = 5;

/// Feature names in model order
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] =
    ["temp", "humidity", "wind_speed", "weather", "season"];

/// One encoded observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(
        temperature: f64,
        humidity: f64,
        wind_speed: f64,
        sky_code: usize,
        season_code: usize,
    ) -> Self {
        Self([
            temperature,
            humidity,
            wind_speed,
            sky_code as f64,
            season_code as f64,
        ])
    }

    /// Build from an arbitrary row, checking its width and values
    pub fn from_slice(row: &[f64]) -> Result<Self> {
        let values: [f64; FEATURE_COUNT] = row.try_into().map_err(|_| {
            OutfitError::InvalidInput(format!(
                "expected {} features, got {}",
                FEATURE_COUNT,
                row.len()
            ))
        })?;
        let vector = Self(values);
        vector.validate()?;
        Ok(vector)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Reject NaN and infinite components
    pub fn validate(&self) -> Result<()> {
        for (name, value) in FEATURE_COLUMNS.iter().zip(self.0.iter()) {
            if !value.is_finite() {
                return Err(OutfitError::InvalidInput(format!(
                    "feature '{}' is not finite: {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order() {
        let v = FeatureVector::new(5.0, 80.0, 20.0, 2, 3);
        assert_eq!(v.as_slice(), &[5.0, 80.0, 20.0, 2.0, 3.0]);
    }

    #[test]
    fn test_from_slice_width() {
        assert!(FeatureVector::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]).is_ok());
        assert!(matches!(
            FeatureVector::from_slice(&[1.0, 2.0, 3.0, 4.0]),
            Err(OutfitError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(FeatureVector::from_slice(&[f64::NAN, 2.0, 3.0, 4.0, 5.0]).is_err());
        assert!(FeatureVector::from_slice(&[1.0, f64::INFINITY, 3.0, 4.0, 5.0]).is_err());
    }
}
