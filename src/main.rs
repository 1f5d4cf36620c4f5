//! LearnGrid · Learning Roadmap Backend
//!
//! - Axum HTTP API: `/api/roadmap?skill=`, `/api/quiz?topic=`, `/api/health`
//! - Predefined roadmaps from a local directory, Gemini generation as fallback
//! - Static frontend fallback (./static/index.html)
//!
//! Important env variables (a `.env` file is honored):
//!   PORT                     : u16 (default 5000)
//!   GEMINI_API_KEY           : enables generation if present
//!   GEMINI_BASE_URL          : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODEL             : default "gemini-pro"
//!   GEMINI_TIMEOUT_SECS      : default 60
//!   PREDEFINED_ROADMAPS_DIR  : default "predefined_roadmaps"
//!   LEARNGRID_CONFIG_PATH    : path to TOML config (prompt overrides, store dir)
//!   STATIC_DIR               : default "./static"
//!   LOG_LEVEL                : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT               : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod prompts;
mod store;
mod parse;
mod gemini;
mod state;
mod protocol;
mod logic;
mod routes;
#[cfg(test)]
mod test_support;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::routes::build_router;
use crate::state::AppState;

const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  // A missing .env is normal in production.
  let dotenv_loaded = dotenv::dotenv().is_ok();
  telemetry::init_tracing();
  debug!(target: "learngrid", dotenv_loaded, "Environment loaded");

  // Shared read-only state: predefined store, prompts, optional Gemini client.
  let state = Arc::new(AppState::new());

  let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());
  let app = build_router(state, &static_dir);

  let port = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .unwrap_or(DEFAULT_PORT);
  let addr = SocketAddr::from(([0, 0, 0, 0], port));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "learngrid", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "learngrid", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "learngrid", "Shutdown signal received");
}
