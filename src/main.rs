//! SproutMind · Cognitive-Rehabilitation Backend
//!
//! - Axum HTTP API for activity/game session records and derived summaries
//! - Optional local LLM integration (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT          : u16 (default 3000)
//!   DATA_DIR      : directory for the flat-file JSON store (default ./data)
//!   LLM_BASE_URL  : enables the LLM gateway if present, e.g. "http://localhost:11434/v1"
//!   LLM_MODEL     : default "llama3.1"
//!   LLM_API_KEY   : optional bearer token (most local servers ignore it)
//!   AGENT_CONFIG_PATH : path to TOML config (prompts + extra fallback pool)
//!   LOG_LEVEL     : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT    : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod fallbacks;
mod store;
mod stats;
mod state;
mod protocol;
mod logic;
mod llm;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (flat-file store, LLM client, prompts).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "sproutmind_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
