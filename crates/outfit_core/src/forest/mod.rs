//! Random forest inference
//!
//! A forest is a list of classification trees over the fixed five-column
//! feature vector. Each tree walks to a leaf and votes for that leaf's class;
//! the plurality class is the prediction.
//!
//! # Model Format
//!
//! ```json
//! {
//!   "n_classes": 3,
//!   "n_features": 5,
//!   "params": {"bootstrap": true, "max_depth": 10, "max_features": "sqrt", ...},
//!   "trees": [
//!     {"nodes": [
//!       {"class": null, "feature_idx": 0, "id": 0, "left": 1, "right": 2, "threshold": 12.5},
//!       {"class": 2, "feature_idx": -1, "id": 1, "left": -1, "right": -1, "threshold": 0.0},
//!       {"class": 0, "feature_idx": -1, "id": 2, "left": -1, "right": -1, "threshold": 0.0}
//!     ]}
//!   ],
//!   "version": 1
//! }
//! ```

pub mod model;
pub mod tree;

pub use model::{ForestModel, ForestParams, MaxFeatures, VotePrediction, FOREST_VERSION};
pub use tree::{Node, Tree};
