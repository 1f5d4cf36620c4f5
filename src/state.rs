//! Application state: predefined store, prompts, and the optional generation client.
//!
//! Built once at startup and shared read-only across requests. Nothing here is
//! mutated after construction, so no locking is needed.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{load_app_config_from_env, Prompts};
use crate::error::GenerationError;
use crate::gemini::{Gemini, TextGenerator};
use crate::store::PredefinedStore;

#[derive(Clone)]
pub struct AppState {
    pub store: PredefinedStore,
    /// None when no API key was configured; generation then fails fast.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load optional TOML config, open the store, init Gemini.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env().unwrap_or_default();
        let store = PredefinedStore::new(cfg.predefined_dir());
        if store.dir().is_dir() {
            info!(target: "learngrid", dir = %store.dir().display(), "Predefined roadmap store ready");
        } else {
            warn!(target: "learngrid", dir = %store.dir().display(), "Predefined roadmap directory not found; every roadmap will be generated");
        }

        let generator: Option<Arc<dyn TextGenerator>> = match Gemini::from_env() {
            Ok(g) => {
                info!(target: "learngrid", base_url = %g.base_url(), model = %g.model(), "Gemini enabled.");
                Some(Arc::new(g))
            }
            Err(GenerationError::NotConfigured) => {
                warn!(target: "learngrid", "Gemini disabled (no GEMINI_API_KEY). Only predefined roadmaps will be served.");
                None
            }
            Err(e) => {
                warn!(target: "learngrid", error = %e, "Gemini client could not be built; generation disabled.");
                None
            }
        };

        Self::from_parts(store, generator, cfg.prompts)
    }

    pub fn from_parts(
        store: PredefinedStore,
        generator: Option<Arc<dyn TextGenerator>>,
        prompts: Prompts,
    ) -> Self {
        Self { store, generator, prompts }
    }

    pub fn generation_enabled(&self) -> bool {
        self.generator.is_some()
    }
}
