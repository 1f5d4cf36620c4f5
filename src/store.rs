//! Predefined roadmap store: a read-only directory of `<skill>.json` files.
//!
//! A hit is returned verbatim as JSON. A missing file is a plain miss; an unreadable
//! or corrupt file is logged and also treated as a miss so generation can take over.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::LookupError;

#[derive(Clone, Debug)]
pub struct PredefinedStore {
  dir: PathBuf,
}

impl PredefinedStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// Path of the document for `skill`, or None if the name could leave the directory.
  pub fn path_for(&self, skill: &str) -> Option<PathBuf> {
    let unsafe_name = skill.is_empty()
      || skill.contains(['/', '\\', '\0'])
      || skill.contains("..");
    if unsafe_name {
      return None;
    }
    Some(self.dir.join(format!("{skill}.json")))
  }

  /// Fallible read: Ok(None) when no file exists, Err when it exists but can't be used.
  pub async fn try_lookup(&self, skill: &str) -> Result<Option<Value>, LookupError> {
    let Some(path) = self.path_for(skill) else {
      return Ok(None);
    };
    let raw = match tokio::fs::read_to_string(&path).await {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&raw)?))
  }

  /// Lookup used on the serving path. Failures are logged, never surfaced.
  #[instrument(level = "debug", skip(self), fields(dir = %self.dir.display()))]
  pub async fn lookup(&self, skill: &str) -> Option<Value> {
    match self.try_lookup(skill).await {
      Ok(Some(doc)) => Some(doc),
      Ok(None) => {
        debug!(target: "roadmap", %skill, "No predefined roadmap");
        None
      }
      Err(e) => {
        warn!(target: "roadmap", %skill, error = %e, "Error reading predefined file; falling back to generation");
        None
      }
    }
  }
}
