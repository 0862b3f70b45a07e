//! Persisted model artifact
//!
//! Encoders and forest are only meaningful together, so they are written to
//! and restored from a single versioned JSON document. The embedded hash is
//! the Blake3 digest of the canonical JSON of `{encoders, forest}`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::encoder::EncoderRegistry;
use crate::errors::{OutfitError, Result};
use crate::features::FEATURE_COLUMNS;
use crate::forest::ForestModel;
use crate::pipeline::Pipeline;
use crate::serde_canon::{hash_canonical_hex, to_canonical_json};

/// Current artifact format version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;
/// Artifact file name inside a model directory
pub const MODEL_FILE: &str = "outfit_model.json";
/// Sidecar file holding the artifact hash
pub const HASH_FILE: &str = "outfit_model.hash";

#[derive(Serialize)]
struct HashedContent<'a> {
    encoders: &'a EncoderRegistry,
    forest: &'a ForestModel,
}

fn content_hash(encoders: &EncoderRegistry, forest: &ForestModel) -> Result<String> {
    hash_canonical_hex(&HashedContent { encoders, forest })
}

/// Serialized pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub feature_columns: Vec<String>,
    pub encoders: EncoderRegistry,
    pub forest: ForestModel,
    /// Hex Blake3 hash of the encoders and forest
    pub model_hash: String,
    /// Unix timestamp of creation, not covered by the hash
    pub created_at: i64,
}

impl ModelArtifact {
    pub fn from_pipeline(pipeline: &Pipeline) -> Result<Self> {
        let encoders = pipeline.encoders().clone();
        let forest = pipeline.forest().clone();
        let model_hash = content_hash(&encoders, &forest)?;

        Ok(Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            encoders,
            forest,
            model_hash,
            created_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Check version, feature layout and hash
    pub fn verify(&self) -> Result<()> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(OutfitError::Artifact(format!(
                "unsupported artifact format version {}",
                self.format_version
            )));
        }
        if self.feature_columns != FEATURE_COLUMNS {
            return Err(OutfitError::Artifact(format!(
                "feature columns {:?} do not match {:?}",
                self.feature_columns, FEATURE_COLUMNS
            )));
        }

        let actual = content_hash(&self.encoders, &self.forest)?;
        if actual != self.model_hash {
            return Err(OutfitError::Artifact(format!(
                "model hash mismatch: recorded {}, computed {}",
                self.model_hash, actual
            )));
        }
        Ok(())
    }

    /// Verify and rebuild the pipeline
    pub fn into_pipeline(self) -> Result<Pipeline> {
        self.verify()?;
        Pipeline::new(self.encoders, self.forest)
    }

    pub fn to_canonical_json(&self) -> Result<String> {
        to_canonical_json(self)
    }

    /// Write the artifact and its hash file into `dir`, returning the artifact path
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let model_path = dir.join(MODEL_FILE);
        fs::write(&model_path, self.to_canonical_json()?)?;
        fs::write(dir.join(HASH_FILE), &self.model_hash)?;

        info!(
            path = %model_path.display(),
            hash = %self.model_hash,
            "saved model artifact"
        );
        Ok(model_path)
    }

    /// Read and verify an artifact file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&json)?;
        artifact.verify()?;
        info!(
            path = %path.display(),
            hash = %artifact.model_hash,
            trees = artifact.forest.num_trees(),
            "loaded model artifact"
        );
        Ok(artifact)
    }
}

impl Pipeline {
    /// Load a pipeline from an artifact file
    pub fn load(path: &Path) -> Result<Self> {
        ModelArtifact::load(path)?.into_pipeline()
    }

    /// Persist the pipeline into `dir`
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        ModelArtifact::from_pipeline(self)?.save(dir)
    }
}
