//! Random forest trainer
//!
//! Each tree gets its own generator seeded from `(seed, tree index)`, draws a
//! bootstrap sample and grows a CART tree. Trees are independent, so they are
//! built in parallel and collected in index order; the result is identical to
//! a sequential run.

use outfit_core::{FeatureVector, ForestModel, ForestParams, OutfitError, Result, FEATURE_COUNT};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cart::{CartBuilder, TreeConfig};
use crate::deterministic::LcgRng;

/// Random forest trainer
#[derive(Clone, Debug, Default)]
pub struct ForestTrainer {
    params: ForestParams,
}

impl ForestTrainer {
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split,
            min_samples_leaf: self.params.min_samples_leaf,
            max_features: self.params.max_features.resolve(FEATURE_COUNT),
        }
    }

    /// Train a forest on encoded rows; class count is `max(label) + 1`
    pub fn train(&self, features: &[FeatureVector], labels: &[usize]) -> Result<ForestModel> {
        self.params.validate()?;

        if features.is_empty() {
            return Err(OutfitError::Training("no training rows".to_string()));
        }
        if features.len() != labels.len() {
            return Err(OutfitError::Training(format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        for (i, row) in features.iter().enumerate() {
            row.validate()
                .map_err(|err| OutfitError::Training(format!("row {}: {}", i, err)))?;
        }

        let n_samples = features.len();
        let n_classes = labels.iter().copied().max().unwrap_or(0) + 1;
        let tree_config = self.tree_config();

        info!(
            samples = n_samples,
            classes = n_classes,
            trees = self.params.n_trees,
            max_depth = self.params.max_depth,
            max_features = tree_config.max_features,
            seed = self.params.seed,
            "training random forest"
        );

        let builder = CartBuilder::new(features, labels, n_classes, tree_config);
        let trees: Vec<_> = (0..self.params.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = LcgRng::for_tree(self.params.seed, tree_idx);
                let samples = if self.params.bootstrap {
                    rng.bootstrap(n_samples)
                } else {
                    (0..n_samples).collect()
                };
                let tree = builder.build(&samples, &mut rng);
                debug!(tree = tree_idx, nodes = tree.nodes.len(), "built tree");
                tree
            })
            .collect();

        let model = ForestModel::new(trees, FEATURE_COUNT, n_classes, self.params);
        info!(
            trees = model.num_trees(),
            nodes = model.total_nodes(),
            depth = model.max_tree_depth(),
            "training complete"
        );

        Ok(model)
    }
}
