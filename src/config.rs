//! Loading service configuration (prompt overrides + predefined store) from TOML.
//!
//! Schema:
//! ```toml
//! [prompts]
//! roadmap_template = "... {skill} ..."
//! quiz_template = "... {topic} ..."
//!
//! [store]
//! dir = "predefined_roadmaps"
//! ```
//! Every key is optional.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::prompts::{QUIZ_PROMPT_TEMPLATE, ROADMAP_PROMPT_TEMPLATE};

pub const DEFAULT_PREDEFINED_DIR: &str = "predefined_roadmaps";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub store: StoreCfg,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct StoreCfg {
  #[serde(default)] pub dir: Option<String>,
}

/// Prompt templates used by the generation path.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub roadmap_template: String,
  pub quiz_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      roadmap_template: ROADMAP_PROMPT_TEMPLATE.into(),
      quiz_template: QUIZ_PROMPT_TEMPLATE.into(),
    }
  }
}

impl AppConfig {
  /// Predefined store directory: PREDEFINED_ROADMAPS_DIR, then TOML, then the default.
  pub fn predefined_dir(&self) -> PathBuf {
    self.predefined_dir_with(std::env::var("PREDEFINED_ROADMAPS_DIR").ok())
  }

  /// Same precedence, with the env value passed in. A blank env value is ignored.
  pub fn predefined_dir_with(&self, env_dir: Option<String>) -> PathBuf {
    env_dir
      .filter(|s| !s.trim().is_empty())
      .or_else(|| self.store.dir.clone())
      .unwrap_or_else(|| DEFAULT_PREDEFINED_DIR.into())
      .into()
  }
}

/// Attempt to load `AppConfig` from LEARNGRID_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("LEARNGRID_CONFIG_PATH").ok()?;
  load_app_config(&path)
}

pub fn load_app_config(path: &str) -> Option<AppConfig> {
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "learngrid", %path, "Loaded service config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "learngrid", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "learngrid", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
