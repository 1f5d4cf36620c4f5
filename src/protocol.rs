//! HTTP request/response DTOs (serde ready).
//! Success bodies are the documents themselves, so only queries and envelopes live here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RoadmapQuery {
    pub skill: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
    pub topic: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub generation: bool,
}
