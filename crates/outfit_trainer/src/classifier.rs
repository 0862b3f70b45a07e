//! Outfit classifier: a forest trainer plus the most recently fitted forest

use outfit_core::{FeatureVector, ForestModel, ForestParams, OutfitError, Result};

use crate::trainer::ForestTrainer;

/// Classifier over `[temperature, humidity, wind_speed, sky_code, season_code]`
#[derive(Clone, Debug, Default)]
pub struct OutfitClassifier {
    trainer: ForestTrainer,
    model: Option<ForestModel>,
}

impl OutfitClassifier {
    /// Unfitted classifier; `predict` fails with `NotFitted` until `fit` succeeds
    pub fn new(params: ForestParams) -> Self {
        Self {
            trainer: ForestTrainer::new(params),
            model: None,
        }
    }

    /// Fit from raw rows; every row must hold exactly five finite values
    pub fn fit(&mut self, rows: &[Vec<f64>], labels: &[usize]) -> Result<&ForestModel> {
        let features = rows
            .iter()
            .map(|row| FeatureVector::from_slice(row))
            .collect::<Result<Vec<_>>>()?;
        self.fit_vectors(&features, labels)
    }

    /// Fit from encoded vectors, replacing any previous model
    pub fn fit_vectors(&mut self, features: &[FeatureVector], labels: &[usize]) -> Result<&ForestModel> {
        let model = self.trainer.train(features, labels)?;
        Ok(self.model.insert(model))
    }

    pub fn predict(&self, features: &[f64]) -> Result<usize> {
        self.model()?.predict(features)
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Result<&ForestModel> {
        self.model.as_ref().ok_or(OutfitError::NotFitted)
    }

    pub fn into_model(self) -> Result<ForestModel> {
        self.model.ok_or(OutfitError::NotFitted)
    }
}
