//! Shared recommendation service
//!
//! Holds the currently installed pipeline behind an `Arc`. Requests clone the
//! `Arc` and evaluate without holding the lock; reloading installs a new
//! pipeline in a single swap and never touches the one in use.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use crate::errors::{OutfitError, Result};
use crate::pipeline::{Observation, Pipeline, Recommendation};

/// Lifecycle state of the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    /// No pipeline installed yet
    Uninitialized,
    /// A trained pipeline is answering requests
    Serving { model_hash: String },
}

/// Thread-safe holder of the active pipeline
#[derive(Debug, Default)]
pub struct Recommender {
    active: RwLock<Option<Installed>>,
}

/// Pipeline plus the hash computed when it was installed
#[derive(Debug, Clone)]
struct Installed {
    pipeline: Arc<Pipeline>,
    model_hash: String,
}

impl Recommender {
    /// Service with no pipeline; requests fail with `NotFitted` until one is installed
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pipeline(pipeline: Pipeline) -> Result<Self> {
        let service = Self::new();
        service.install(pipeline)?;
        Ok(service)
    }

    /// Atomically replace the active pipeline, returning the previous one
    ///
    /// The forest hash is computed before the swap; on failure the active
    /// pipeline is left untouched.
    pub fn install(&self, pipeline: Pipeline) -> Result<Option<Arc<Pipeline>>> {
        let model_hash = pipeline.forest().hash_hex()?;
        let installed = Installed {
            pipeline: Arc::new(pipeline),
            model_hash: model_hash.clone(),
        };
        let previous = self.active.write().replace(installed);
        info!(
            model_hash = %model_hash,
            replaced = previous.is_some(),
            "installed recommendation pipeline"
        );
        Ok(previous.map(|p| p.pipeline))
    }

    pub fn state(&self) -> ServiceState {
        match self.active.read().as_ref() {
            None => ServiceState::Uninitialized,
            Some(installed) => ServiceState::Serving {
                model_hash: installed.model_hash.clone(),
            },
        }
    }

    /// Snapshot of the active pipeline
    pub fn pipeline(&self) -> Result<Arc<Pipeline>> {
        self.active
            .read()
            .as_ref()
            .map(|installed| Arc::clone(&installed.pipeline))
            .ok_or(OutfitError::NotFitted)
    }

    pub fn recommend(&self, observation: &Observation) -> Result<String> {
        self.pipeline()?.recommend(observation)
    }

    pub fn recommend_detailed(&self, observation: &Observation) -> Result<Recommendation> {
        self.pipeline()?.recommend_detailed(observation)
    }
}
