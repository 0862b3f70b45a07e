//! Classification tree structures
//!
//! Trees are stored as flat node arrays. Node 0 is the root and children
//! always sit at higher indices than their parent.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes:
/// - `feature_idx >= 0`: index into the feature vector
/// - `left` and `right` point to child node indices
/// - `class` is `None`
///
/// For leaf nodes:
/// - `feature_idx == -1`
/// - `class` holds the predicted label code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: i32,
    pub left: i32,
    pub right: i32,
    pub feature_idx: i32,
    /// Samples with `feature <= threshold` go left
    pub threshold: f64,
    pub class: Option<u32>,
}

impl Node {
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            class: None,
        }
    }

    pub fn leaf(id: i32, class: u32) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            class: Some(class),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.class.is_some()
    }
}

/// A single classification tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Class code of the leaf reached by `features`
    ///
    /// Returns `None` if the walk hits a malformed node.
    pub fn predict(&self, features: &[f64]) -> Option<usize> {
        let mut idx = 0usize;

        // A valid walk visits each node at most once
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(idx)?;

            if node.is_leaf() {
                return node.class.map(|class| class as usize);
            }

            let value = *features.get(usize::try_from(node.feature_idx).ok()?)?;
            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            idx = usize::try_from(next).ok()?;
        }

        None
    }

    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Length of the longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if !node.is_leaf() => {
                    let left = walk(nodes, node.left as usize);
                    let right = walk(nodes, node.right as usize);
                    1 + left.max(right)
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Validate tree structure against the expected feature and class counts
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                match node.class {
                    None => return Err(format!("Leaf node {} has no class", i)),
                    Some(class) if class as usize >= n_classes => {
                        return Err(format!(
                            "Leaf node {} predicts class {} but only {} classes exist",
                            i, class, n_classes
                        ))
                    }
                    Some(_) => {}
                }
                continue;
            }

            for (side, child) in [("left", node.left), ("right", node.right)] {
                if child <= i as i32 || child as usize >= self.nodes.len() {
                    return Err(format!("Node {} has invalid {} child: {}", i, side, child));
                }
            }

            if node.feature_idx < 0 || node.feature_idx as usize >= n_features {
                return Err(format!(
                    "Internal node {} has invalid feature index: {}",
                    i, node.feature_idx
                ));
            }

            if !node.threshold.is_finite() {
                return Err(format!("Internal node {} has non-finite threshold", i));
            }
        }

        Ok(())
    }
}
