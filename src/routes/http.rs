//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; store failures map to a uniform 500 JSON body.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(user = %body.user_id))]
pub async fn http_post_activity(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ActivityIn>,
) -> Response {
  match record_activity(&state, body).await {
    Ok(rec) => {
      info!(target: "sessions", id = %rec.id, user = %rec.user_id, "Activity recorded");
      Json(rec).into_response()
    }
    Err(e) => store_error(e),
  }
}

#[instrument(level = "info", skip(state), fields(user = %q.user_id))]
pub async fn http_list_activities(
  State(state): State<Arc<AppState>>,
  Query(q): Query<UserQuery>,
) -> impl IntoResponse {
  let items = state.store.activities_for(&q.user_id).await;
  Json(items)
}

#[instrument(level = "info", skip(state), fields(user = %q.user_id))]
pub async fn http_activity_summary(
  State(state): State<Arc<AppState>>,
  Query(q): Query<UserQuery>,
) -> impl IntoResponse {
  let summary = activity_summary_for(&state, &q.user_id).await;
  info!(
    target: "sessions",
    user = %q.user_id,
    sessions = summary.total_sessions,
    streak = summary.current_streak,
    "Activity summary served"
  );
  Json(summary)
}

#[instrument(level = "info", skip(state, body), fields(user = %body.user_id, game = %body.game.label()))]
pub async fn http_post_game(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GameIn>,
) -> Response {
  match record_game(&state, body).await {
    Ok(rec) => {
      info!(target: "sessions", id = %rec.id, user = %rec.user_id, "Game attempt recorded");
      Json(rec).into_response()
    }
    Err(e) => store_error(e),
  }
}

#[instrument(level = "info", skip(state), fields(user = %q.user_id, game = ?q.game))]
pub async fn http_list_games(
  State(state): State<Arc<AppState>>,
  Query(q): Query<GamesQuery>,
) -> impl IntoResponse {
  let items = state.store.games_for(&q.user_id, q.game).await;
  Json(items)
}

#[instrument(level = "info", skip(state), fields(user = %q.user_id))]
pub async fn http_games_summary(
  State(state): State<Arc<AppState>>,
  Query(q): Query<UserQuery>,
) -> impl IntoResponse {
  let summary = games_summary_for(&state, &q.user_id).await;
  Json(summary)
}

#[instrument(level = "info", skip(state, body), fields(user = %body.user_id))]
pub async fn http_ai_encouragement(
  State(state): State<Arc<AppState>>,
  Json(body): Json<UserQuery>,
) -> impl IntoResponse {
  let out = make_encouragement(&state, &body.user_id).await;
  info!(target: "ai", user = %body.user_id, source = out.source, "Encouragement served");
  Json(out)
}

#[instrument(level = "info", skip(state, body), fields(user = %body.user_id, game = %body.game.label()))]
pub async fn http_ai_difficulty(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AiDifficultyIn>,
) -> impl IntoResponse {
  let out = make_difficulty(&state, &body.user_id, body.game).await;
  info!(
    target: "ai",
    user = %body.user_id,
    adjustment = out.adjustment,
    target = out.target_level,
    source = out.source,
    "Difficulty advice served"
  );
  Json(out)
}

#[instrument(level = "info", skip(state, body), fields(user = %body.user_id))]
pub async fn http_ai_report(
  State(state): State<Arc<AppState>>,
  Json(body): Json<UserQuery>,
) -> impl IntoResponse {
  let out = make_report(&state, &body.user_id).await;
  info!(target: "ai", user = %body.user_id, source = out.source, "Weekly report served");
  Json(out)
}

fn store_error(e: String) -> Response {
  error!(target: "sessions", error = %e, "Store write failed");
  (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorOut { error: e })).into_response()
}
