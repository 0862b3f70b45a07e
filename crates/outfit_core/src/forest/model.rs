//! Random forest classifier with plurality voting
//!
//! - Every tree casts one vote for a class code
//! - The class with the most votes wins
//! - Ties go to the lowest class code
//! - Canonical JSON serialization and Blake3 hashing for reproducibility checks

use serde::{Deserialize, Serialize};

use super::tree::Tree;
use crate::errors::{OutfitError, Result};
use crate::serde_canon::{hash_canonical_hex, to_canonical_json};

/// Current forest format version
pub const FOREST_VERSION: u32 = 1;

/// Number of features examined when searching for a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    All,
    Sqrt,
    Log2,
    Count(usize),
}

impl MaxFeatures {
    /// Resolve to a concrete count in `[1, n_features]`
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = n_features.max(1);
        let count = match self {
            MaxFeatures::All => n,
            MaxFeatures::Sqrt => (n as f64).sqrt().floor() as usize,
            MaxFeatures::Log2 => (n as f64).log2().floor() as usize,
            MaxFeatures::Count(k) => *k,
        };
        count.clamp(1, n)
    }
}

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(OutfitError::InvalidInput("n_trees must be at least 1".into()));
        }
        if self.max_depth == 0 {
            return Err(OutfitError::InvalidInput("max_depth must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(OutfitError::InvalidInput(
                "min_samples_split must be at least 2".into(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(OutfitError::InvalidInput(
                "min_samples_leaf must be at least 1".into(),
            ));
        }
        if let MaxFeatures::Count(0) = self.max_features {
            return Err(OutfitError::InvalidInput("max_features must be at least 1".into()));
        }
        Ok(())
    }
}

/// Prediction with per-class vote counts
#[derive(Debug, Clone, PartialEq)]
pub struct VotePrediction {
    /// Winning class code
    pub class: usize,
    /// Votes per class code
    pub votes: Vec<usize>,
    /// Fraction of trees voting for the winner
    pub confidence: f64,
}

/// Fitted random forest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestModel {
    pub version: u32,
    pub params: ForestParams,
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<Tree>,
}

impl ForestModel {
    pub fn new(trees: Vec<Tree>, n_features: usize, n_classes: usize, params: ForestParams) -> Self {
        Self {
            version: FOREST_VERSION,
            params,
            n_features,
            n_classes,
            trees,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != FOREST_VERSION {
            return Err(OutfitError::Artifact(format!(
                "Unsupported forest version: {}",
                self.version
            )));
        }
        if self.trees.is_empty() {
            return Err(OutfitError::Artifact("Forest has no trees".to_string()));
        }
        if self.n_classes == 0 {
            return Err(OutfitError::Artifact("Forest has no classes".to_string()));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes).map_err(|e| {
                OutfitError::Artifact(format!("Tree {} validation failed: {}", i, e))
            })?;
        }

        Ok(())
    }

    /// Tally one vote per tree and pick the plurality class
    pub fn predict_with_votes(&self, features: &[f64]) -> Result<VotePrediction> {
        if features.len() != self.n_features {
            return Err(OutfitError::InvalidInput(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        if self.trees.is_empty() {
            return Err(OutfitError::Artifact("Forest has no trees".to_string()));
        }

        let mut votes = vec![0usize; self.n_classes];
        for (i, tree) in self.trees.iter().enumerate() {
            match tree.predict(features) {
                Some(class) if class < self.n_classes => votes[class] += 1,
                Some(class) => {
                    return Err(OutfitError::Artifact(format!(
                        "Tree {} voted for class {} outside [0, {})",
                        i, class, self.n_classes
                    )))
                }
                None => {
                    return Err(OutfitError::Artifact(format!(
                        "Tree {} did not reach a leaf",
                        i
                    )))
                }
            }
        }

        // Strict comparison keeps the first (lowest) class among equal counts
        let mut class = 0usize;
        for (code, &count) in votes.iter().enumerate() {
            if count > votes[class] {
                class = code;
            }
        }

        Ok(VotePrediction {
            class,
            confidence: votes[class] as f64 / self.trees.len() as f64,
            votes,
        })
    }

    pub fn predict(&self, features: &[f64]) -> Result<usize> {
        Ok(self.predict_with_votes(features)?.class)
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(|tree| tree.nodes.len()).sum()
    }

    pub fn max_tree_depth(&self) -> usize {
        self.trees.iter().map(Tree::depth).max().unwrap_or(0)
    }

    /// Serialize to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String> {
        to_canonical_json(self)
    }

    /// Blake3 hash of the canonical JSON form, hex encoded
    pub fn hash_hex(&self) -> Result<String> {
        hash_canonical_hex(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::tree::Node;

    fn constant(class: u32) -> Tree {
        Tree::new(vec![Node::leaf(0, class)])
    }

    fn threshold_tree(threshold: f64, low: u32, high: u32) -> Tree {
        Tree::new(vec![
            Node::internal(0, 0, threshold, 1, 2),
            Node::leaf(1, low),
            Node::leaf(2, high),
        ])
    }

    fn forest(trees: Vec<Tree>, n_classes: usize) -> ForestModel {
        ForestModel::new(trees, 1, n_classes, ForestParams::default())
    }

    #[test]
    fn test_plurality_vote() {
        let model = forest(vec![constant(2), constant(1), constant(2)], 3);
        let prediction = model.predict_with_votes(&[0.0]).unwrap();
        assert_eq!(prediction.class, 2);
        assert_eq!(prediction.votes, vec![0, 1, 2]);
        assert!((prediction.confidence - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tie_goes_to_lowest_code() {
        let model = forest(vec![constant(3), constant(1), constant(3), constant(1)], 4);
        assert_eq!(model.predict(&[0.0]).unwrap(), 1);

        let model = forest(vec![constant(2), constant(0)], 3);
        assert_eq!(model.predict(&[0.0]).unwrap(), 0);
    }

    #[test]
    fn test_votes_follow_features() {
        let model = forest(
            vec![
                threshold_tree(10.0, 0, 1),
                threshold_tree(20.0, 0, 1),
                threshold_tree(30.0, 0, 1),
            ],
            2,
        );
        assert_eq!(model.predict(&[5.0]).unwrap(), 0);
        assert_eq!(model.predict(&[25.0]).unwrap(), 1);
        assert_eq!(model.predict(&[35.0]).unwrap(), 1);
    }

    #[test]
    fn test_malformed_tree_fails_instead_of_abstaining() {
        let out_of_range = forest(vec![constant(0), constant(5), constant(0)], 2);
        assert!(matches!(
            out_of_range.predict_with_votes(&[0.0]),
            Err(OutfitError::Artifact(msg)) if msg.contains("Tree 1")
        ));

        let dangling = Tree::new(vec![Node::internal(0, 0, 1.0, 7, 8)]);
        let model = forest(vec![constant(1), dangling], 2);
        assert!(matches!(
            model.predict(&[0.0]),
            Err(OutfitError::Artifact(msg)) if msg.contains("did not reach a leaf")
        ));

        assert!(matches!(
            forest(Vec::new(), 2).predict(&[0.0]),
            Err(OutfitError::Artifact(_))
        ));
    }

    #[test]
    fn test_wrong_width_rejected() {
        let model = forest(vec![constant(0)], 1);
        assert!(matches!(
            model.predict(&[1.0, 2.0]),
            Err(OutfitError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(forest(vec![constant(0)], 1).validate().is_ok());
        assert!(forest(Vec::new(), 1).validate().is_err());
        assert!(forest(vec![constant(4)], 2).validate().is_err());
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(5), 2);
        assert_eq!(MaxFeatures::Log2.resolve(5), 2);
        assert_eq!(MaxFeatures::All.resolve(5), 5);
        assert_eq!(MaxFeatures::Count(9).resolve(5), 5);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
    }

    #[test]
    fn test_params_validation() {
        assert!(ForestParams::default().validate().is_ok());
        let params = ForestParams {
            n_trees: 0,
            ..ForestParams::default()
        };
        assert!(params.validate().is_err());
        let params = ForestParams {
            min_samples_split: 1,
            ..ForestParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_hash_is_stable_and_sensitive() {
        let a = forest(vec![threshold_tree(10.0, 0, 1)], 2);
        let b = forest(vec![threshold_tree(10.0, 0, 1)], 2);
        let c = forest(vec![threshold_tree(11.0, 0, 1)], 2);

        let hash_a = a.hash_hex().unwrap();
        assert_eq!(hash_a.len(), 64);
        assert_eq!(hash_a, b.hash_hex().unwrap());
        assert_ne!(hash_a, c.hash_hex().unwrap());
    }
}
