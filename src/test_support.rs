//! Shared fixtures for unit tests: a recording generator stub and temp predefined stores.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::config::Prompts;
use crate::error::GenerationError;
use crate::gemini::TextGenerator;
use crate::state::AppState;
use crate::store::PredefinedStore;

/// Generator stub: replies with canned text (or an error) and records every prompt.
pub(crate) struct StubGenerator {
    reply: Result<String, fn() -> GenerationError>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub(crate) fn replying(text: impl Into<String>) -> Arc<Self> {
        Arc::new(Self { reply: Ok(text.into()), calls: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()) })
    }

    pub(crate) fn failing(err: fn() -> GenerationError) -> Arc<Self> {
        Arc::new(Self { reply: Err(err), calls: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()) })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(make) => Err(make()),
        }
    }

    fn model(&self) -> &str {
        "stub"
    }
}

/// Temp predefined directory seeded with `(file name, body)` pairs.
pub(crate) fn predefined_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in files {
        std::fs::write(dir.path().join(name), body).unwrap();
    }
    dir
}

pub(crate) fn state_with(dir: &Path, generator: Option<Arc<StubGenerator>>) -> AppState {
    let generator = generator.map(|g| g as Arc<dyn TextGenerator>);
    AppState::from_parts(PredefinedStore::new(dir), generator, Prompts::default())
}
