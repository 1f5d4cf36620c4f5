//! Request resolution shared by the HTTP handlers.
//!
//! Roadmap: predefined store first, then generation. Quiz: always generation.
//! Generation is prompt -> one model call -> fence stripping + JSON parse.
//! Every failure becomes a `ServiceError`; nothing here panics or aborts the server.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{QuizDocument, RoadmapDocument};
use crate::error::{ServiceError, Subject};
use crate::parse::parse_generated;
use crate::prompts::{build_quiz_prompt, build_roadmap_prompt};
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Where a served document came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
  Predefined,
  Generated,
}

impl fmt::Display for Origin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Origin::Predefined => "predefined",
      Origin::Generated => "generated",
    })
  }
}

/// Skill identifiers are looked up by file name, so they are lower-cased as well as trimmed.
pub fn normalize_skill(raw: Option<&str>) -> Option<String> {
  raw.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty())
}

/// Quiz topics are subtopic titles; only surrounding whitespace is dropped.
pub fn normalize_topic(raw: Option<&str>) -> Option<String> {
  raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[instrument(level = "info", skip(state))]
pub async fn resolve_roadmap(state: &AppState, raw_skill: Option<&str>) -> Result<(Value, Origin), ServiceError> {
  let skill = normalize_skill(raw_skill).ok_or(ServiceError::MissingInput(Subject::Roadmap))?;

  if let Some(doc) = state.store.lookup(&skill).await {
    info!(target: "roadmap", %skill, "Serving predefined roadmap");
    return Ok((doc, Origin::Predefined));
  }

  info!(target: "roadmap", %skill, "Generating AI roadmap");
  let prompt = build_roadmap_prompt(&state.prompts, &skill);
  let doc = generate_document(state, Subject::Roadmap, &skill, &prompt).await?;
  Ok((doc, Origin::Generated))
}

#[instrument(level = "info", skip(state))]
pub async fn resolve_quiz(state: &AppState, raw_topic: Option<&str>) -> Result<Value, ServiceError> {
  let topic = normalize_topic(raw_topic).ok_or(ServiceError::MissingInput(Subject::Quiz))?;

  info!(target: "quiz", %topic, "Generating AI quiz");
  let prompt = build_quiz_prompt(&state.prompts, &topic);
  generate_document(state, Subject::Quiz, &topic, &prompt).await
}

/// One generation attempt followed by parsing. Detailed failures are logged here.
async fn generate_document(state: &AppState, subject: Subject, name: &str, prompt: &str) -> Result<Value, ServiceError> {
  let Some(generator) = &state.generator else {
    error!(target: "learngrid", ?subject, %name, "Generation requested but no model is configured");
    return Err(ServiceError::NotConfigured);
  };

  let raw = generator.generate(prompt).await.map_err(|source| {
    error!(target: "learngrid", ?subject, %name, model = %generator.model(), error = %source, "Generation call failed");
    ServiceError::Generation { subject, name: name.to_string(), source }
  })?;
  debug!(target: "learngrid", ?subject, %name, raw = %trunc_for_log(&raw, 200), "Raw model output");

  let doc = parse_generated(&raw).map_err(|source| {
    error!(target: "learngrid", ?subject, %name, error = %source, raw_len = raw.len(), "Generated text is not valid JSON");
    ServiceError::Parse { subject, name: name.to_string(), source }
  })?;
  warn_on_unexpected_shape(subject, name, &doc);
  Ok(doc)
}

/// Generated documents are served as-is; shape problems are only reported.
fn warn_on_unexpected_shape(subject: Subject, name: &str, doc: &Value) {
  match subject {
    Subject::Roadmap => {
      if let Err(e) = RoadmapDocument::deserialize(doc) {
        warn!(target: "roadmap", %name, error = %e, "Generated roadmap does not match the expected shape");
      }
    }
    Subject::Quiz => match QuizDocument::deserialize(doc) {
      Ok(quiz) if !quiz.has_expected_option_count() => {
        warn!(target: "quiz", %name, options = quiz.options.len(), "Generated quiz has an unexpected number of options");
      }
      Ok(quiz) if !quiz.answer_is_an_option() => {
        warn!(target: "quiz", %name, "Generated quiz answer is not one of its options");
      }
      Ok(_) => {}
      Err(e) => warn!(target: "quiz", %name, error = %e, "Generated quiz does not match the expected shape"),
    },
  }
}
