//! CART (Classification and Regression Tree) builder
//!
//! Greedy Gini-impurity classification trees over a bootstrap sample, with
//! per-node feature subsampling drawn from the tree's own seeded generator.

use outfit_core::{FeatureVector, Node, Tree, FEATURE_COUNT};

use crate::deterministic::{LcgRng, SplitTieBreaker};

/// Impurity differences below this are treated as ties
const IMPURITY_EPSILON: f64 = 1e-12;

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per node before settling for the best split found
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 2,
        }
    }
}

/// Split candidate with impurity and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    impurity: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn beats(&self, other: &SplitCandidate) -> bool {
        if self.impurity < other.impurity - IMPURITY_EPSILON {
            return true;
        }
        (self.impurity - other.impurity).abs() <= IMPURITY_EPSILON
            && self.tie_breaker < other.tie_breaker
    }
}

/// Gini impurity of a class histogram holding `total` samples
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Most frequent class; ties go to the lowest code
fn majority_class(counts: &[usize]) -> usize {
    let mut best = 0usize;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

/// Build a classification tree using the exact-greedy CART algorithm
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [FeatureVector],
    labels: &'a [usize],
    n_classes: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        features: &'a [FeatureVector],
        labels: &'a [usize],
        n_classes: usize,
        config: TreeConfig,
    ) -> Self {
        assert_eq!(features.len(), labels.len());

        Self {
            config,
            features,
            labels,
            n_classes,
        }
    }

    /// Build a tree over `samples` (row indices, repeats allowed)
    pub fn build(&self, samples: &[usize], rng: &mut LcgRng) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(samples, 0, &mut nodes, rng);
        Tree::new(nodes)
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &idx in indices {
            counts[self.labels[idx]] += 1;
        }
        counts
    }

    /// Recursively build tree nodes, returning the index of the created node
    fn build_node(
        &self,
        indices: &[usize],
        depth: usize,
        nodes: &mut Vec<Node>,
        rng: &mut LcgRng,
    ) -> i32 {
        let current_idx = nodes.len() as i32;
        let counts = self.class_counts(indices);
        let leaf = Node::leaf(current_idx, majority_class(&counts) as u32);

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if depth >= self.config.max_depth || indices.len() < self.config.min_samples_split || pure
        {
            nodes.push(leaf);
            return current_idx;
        }

        let split = match self.find_best_split(indices, &counts, rng) {
            Some(s) => s,
            None => {
                nodes.push(leaf);
                return current_idx;
            }
        };

        let (left_indices, right_indices) =
            self.split_samples(indices, split.feature_idx, split.threshold);

        // Reserve the slot; children are appended after it
        nodes.push(Node::internal(
            current_idx,
            split.feature_idx as i32,
            split.threshold,
            0,
            0,
        ));

        let left_idx = self.build_node(&left_indices, depth + 1, nodes, rng);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes, rng);

        nodes[current_idx as usize].left = left_idx;
        nodes[current_idx as usize].right = right_idx;

        current_idx
    }

    /// Visit features in random order; stop once `max_features` were examined
    /// and a valid split exists
    fn find_best_split(
        &self,
        indices: &[usize],
        counts: &[usize],
        rng: &mut LcgRng,
    ) -> Option<SplitCandidate> {
        let mut best: Option<SplitCandidate> = None;

        for (visited, feature_idx) in rng.permutation(FEATURE_COUNT).into_iter().enumerate() {
            if visited >= self.config.max_features && best.is_some() {
                break;
            }

            if let Some(candidate) = self.best_split_for_feature(indices, counts, feature_idx) {
                best = match best {
                    Some(current) if !candidate.beats(&current) => Some(current),
                    _ => Some(candidate),
                };
            }
        }

        best
    }

    /// Sweep the sorted values of one feature and score every boundary
    fn best_split_for_feature(
        &self,
        indices: &[usize],
        counts: &[usize],
        feature_idx: usize,
    ) -> Option<SplitCandidate> {
        let mut column: Vec<(f64, usize)> = indices
            .iter()
            .map(|&idx| (self.features[idx].0[feature_idx], self.labels[idx]))
            .collect();
        column.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let total = column.len();
        let mut left = vec![0usize; self.n_classes];
        let mut right = counts.to_vec();
        let mut best: Option<SplitCandidate> = None;
        let mut rank = 0usize;

        for pos in 0..total.saturating_sub(1) {
            let (value, label) = column[pos];
            left[label] += 1;
            right[label] -= 1;

            let next_value = column[pos + 1].0;
            if value == next_value {
                continue;
            }
            rank += 1;

            let n_left = pos + 1;
            let n_right = total - n_left;
            if n_left < self.config.min_samples_leaf || n_right < self.config.min_samples_leaf {
                continue;
            }

            let impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / total as f64;

            let mut threshold = value + (next_value - value) / 2.0;
            if threshold >= next_value {
                threshold = value;
            }

            let candidate = SplitCandidate {
                feature_idx,
                threshold,
                impurity,
                tie_breaker: SplitTieBreaker::new(feature_idx, rank),
            };

            best = match best {
                Some(current) if !candidate.beats(&current) => Some(current),
                _ => Some(candidate),
            };
        }

        best
    }

    /// Split samples based on threshold
    fn split_samples(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        indices
            .iter()
            .partition(|&&idx| self.features[idx].0[feature_idx] <= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(temp: f64, humidity: f64) -> FeatureVector {
        FeatureVector::new(temp, humidity, 5.0, 0, 0)
    }

    fn all_features(max_depth: usize) -> TreeConfig {
        TreeConfig {
            max_depth,
            max_features: FEATURE_COUNT,
            ..TreeConfig::default()
        }
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[], 0), 0.0);
    }

    #[test]
    fn test_majority_tie_lowest() {
        assert_eq!(majority_class(&[1, 3, 3]), 1);
        assert_eq!(majority_class(&[2, 2]), 0);
    }

    #[test]
    fn test_separable_split() {
        let features = vec![row(2.0, 50.0), row(4.0, 50.0), row(26.0, 50.0), row(30.0, 50.0)];
        let labels = vec![0, 0, 1, 1];
        let builder = CartBuilder::new(&features, &labels, 2, all_features(3));

        let tree = builder.build(&[0, 1, 2, 3], &mut LcgRng::new(42));

        assert_eq!(tree.nodes.len(), 3);
        let root = tree.root().unwrap();
        assert_eq!(root.feature_idx, 0);
        assert_eq!(root.threshold, 15.0);
        assert_eq!(tree.predict(row(10.0, 50.0).as_slice()), Some(0));
        assert_eq!(tree.predict(row(20.0, 50.0).as_slice()), Some(1));
        assert!(tree.validate(FEATURE_COUNT, 2).is_ok());
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let features = vec![row(1.0, 10.0), row(2.0, 20.0)];
        let labels = vec![1, 1];
        let tree = CartBuilder::new(&features, &labels, 2, all_features(5))
            .build(&[0, 1], &mut LcgRng::new(1));
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].class, Some(1));
    }

    #[test]
    fn test_depth_limit() {
        let features: Vec<FeatureVector> = (0..16).map(|i| row(i as f64, 0.0)).collect();
        let labels: Vec<usize> = (0..16).map(|i| i % 2).collect();
        let samples: Vec<usize> = (0..16).collect();

        let tree = CartBuilder::new(&features, &labels, 2, all_features(2))
            .build(&samples, &mut LcgRng::new(42));
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn test_identical_rows_cannot_split() {
        let features = vec![row(10.0, 50.0), row(10.0, 50.0)];
        let labels = vec![0, 1];
        let tree = CartBuilder::new(&features, &labels, 2, all_features(5))
            .build(&[0, 1], &mut LcgRng::new(42));
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].class, Some(0));
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let features = vec![row(1.0, 0.0), row(2.0, 0.0), row(3.0, 0.0), row(4.0, 0.0)];
        let labels = vec![0, 1, 1, 1];
        let config = TreeConfig {
            min_samples_leaf: 2,
            ..all_features(5)
        };
        let tree = CartBuilder::new(&features, &labels, 2, config)
            .build(&[0, 1, 2, 3], &mut LcgRng::new(42));

        // Only the 2/2 split is allowed
        let root = tree.root().unwrap();
        assert_eq!(root.threshold, 2.5);
    }

    #[test]
    fn test_same_seed_same_tree() {
        let features: Vec<FeatureVector> = (0..30)
            .map(|i| FeatureVector::new(i as f64, (i * 7 % 100) as f64, (i % 9) as f64, i % 3, i % 4))
            .collect();
        let labels: Vec<usize> = (0..30).map(|i| (i / 10) as usize).collect();
        let samples: Vec<usize> = (0..30).collect();
        let builder = CartBuilder::new(&features, &labels, 3, TreeConfig::default());

        let t1 = builder.build(&samples, &mut LcgRng::new(9));
        let t2 = builder.build(&samples, &mut LcgRng::new(9));
        assert_eq!(t1, t2);
    }
}
