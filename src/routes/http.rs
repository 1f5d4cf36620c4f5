//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs the request parameter and result origin.

use std::sync::Arc;
use axum::{extract::{State, Query}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::ServiceError;
use crate::logic::{resolve_quiz, resolve_roadmap};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, generation: state.generation_enabled() })
}

#[instrument(level = "info", skip(state), fields(skill = ?q.skill))]
pub async fn http_get_roadmap(
  State(state): State<Arc<AppState>>,
  Query(q): Query<RoadmapQuery>,
) -> Result<impl IntoResponse, ServiceError> {
  let (doc, origin) = resolve_roadmap(&state, q.skill.as_deref()).await?;
  info!(target: "roadmap", %origin, "HTTP roadmap served");
  Ok(Json(doc))
}

#[instrument(level = "info", skip(state), fields(topic = ?q.topic))]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  Query(q): Query<QuizQuery>,
) -> Result<impl IntoResponse, ServiceError> {
  let doc = resolve_quiz(&state, q.topic.as_deref()).await?;
  info!(target: "quiz", "HTTP quiz served");
  Ok(Json(doc))
}
