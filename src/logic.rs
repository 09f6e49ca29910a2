//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Recording activity/game sessions (id + timestamp assignment, clamping)
//!   - Computing summaries from the stored records
//!   - The three AI operations, each falling back to hardcoded content when
//!     the LLM is disabled or misbehaves

use chrono::Utc;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::domain::{ActivityRecord, GameKind, GameRecord};
use crate::fallbacks::{fallback_adjustment, fallback_report, pick_encouragement};
use crate::protocol::{ActivityIn, DifficultyOut, EncouragementOut, GameIn, ReportOut};
use crate::state::AppState;
use crate::stats;
use crate::stats::{ActivitySummary, GamesSummary, OverallSummary};

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;

#[instrument(level = "info", skip(state, input), fields(user = %input.user_id, activity = %input.activity))]
pub async fn record_activity(state: &AppState, input: ActivityIn) -> Result<ActivityRecord, String> {
  let rec = ActivityRecord {
    id: Uuid::new_v4().to_string(),
    user_id: input.user_id,
    activity: input.activity,
    category: input.category,
    duration_seconds: input.duration_seconds,
    mood_before: input.mood_before,
    mood_after: input.mood_after,
    notes: input.notes,
    completed_at: input.completed_at.unwrap_or_else(Utc::now),
  };
  state.store.append_activity(rec.clone()).await?;
  Ok(rec)
}

#[instrument(level = "info", skip(state, input), fields(user = %input.user_id, game = %input.game.label()))]
pub async fn record_game(state: &AppState, input: GameIn) -> Result<GameRecord, String> {
  let rec = GameRecord {
    id: Uuid::new_v4().to_string(),
    user_id: input.user_id,
    game: input.game,
    level: input.level.clamp(MIN_LEVEL, MAX_LEVEL),
    score: input.score,
    accuracy: input.accuracy.clamp(0.0, 100.0),
    duration_seconds: input.duration_seconds,
    completed_at: input.completed_at.unwrap_or_else(Utc::now),
  };
  state.store.append_game(rec.clone()).await?;
  Ok(rec)
}

pub async fn activity_summary_for(state: &AppState, user_id: &str) -> ActivitySummary {
  let acts = state.store.activities_for(user_id).await;
  let games = state.store.games_for(user_id, None).await;
  stats::activity_summary(&acts, &games, Utc::now().date_naive())
}

pub async fn games_summary_for(state: &AppState, user_id: &str) -> GamesSummary {
  let games = state.store.games_for(user_id, None).await;
  stats::games_summary(&games)
}

async fn overall_summary_for(state: &AppState, user_id: &str) -> OverallSummary {
  OverallSummary {
    activity: activity_summary_for(state, user_id).await,
    games: games_summary_for(state, user_id).await,
  }
}

/// Encouragement for the child, from the LLM when possible.
#[instrument(level = "info", skip(state), fields(user = %user_id))]
pub async fn make_encouragement(state: &AppState, user_id: &str) -> EncouragementOut {
  let summary = activity_summary_for(state, user_id).await;
  let summary_json = serde_json::to_string(&summary).unwrap_or_else(|_| "{}".into());

  if let Some(llm) = &state.llm {
    match llm.encouragement(&state.prompts, &summary_json).await {
      Ok(raw) if !raw.message.trim().is_empty() => {
        let tip = if raw.tip.trim().is_empty() {
          pick_encouragement(&state.encouragements).1
        } else {
          raw.tip
        };
        return EncouragementOut { message: raw.message, tip, source: "llm" };
      }
      Ok(_) => {
        error!(target: "ai", user = %user_id, "LLM returned empty encouragement; using fallback pool.");
      }
      Err(e) => {
        error!(target: "ai", user = %user_id, error = %e, "LLM encouragement failed; using fallback pool.");
      }
    }
  }

  let (message, tip) = pick_encouragement(&state.encouragements);
  EncouragementOut { message, tip, source: "fallback" }
}

/// Difficulty advice for one game, conservative by construction: whatever the
/// model says is clamped to one level in either direction.
#[instrument(level = "info", skip(state), fields(user = %user_id, game = %game.label()))]
pub async fn make_difficulty(state: &AppState, user_id: &str, game: GameKind) -> DifficultyOut {
  let plays = state.store.games_for(user_id, Some(game)).await;
  // `plays` is newest first.
  let current_level = plays.first().map(|g| g.level).unwrap_or(MIN_LEVEL);
  let breakdown = stats::game_breakdowns(&plays);
  let avg_accuracy = breakdown.first().map(|b| b.avg_accuracy).unwrap_or(0.0);

  if let Some(llm) = &state.llm {
    let breakdown_json = serde_json::to_string(&breakdown).unwrap_or_else(|_| "[]".into());
    match llm
      .difficulty(&state.prompts, game.label(), current_level, &breakdown_json)
      .await
    {
      Ok(raw) => {
        let adjustment = raw.adjustment.clamp(-1, 1);
        let reason = if raw.reason.trim().is_empty() {
          fallback_adjustment(avg_accuracy, plays.len() as u32).1
        } else {
          raw.reason
        };
        return DifficultyOut {
          game,
          current_level,
          adjustment,
          target_level: apply_adjustment(current_level, adjustment),
          reason,
          source: "llm",
        };
      }
      Err(e) => {
        error!(target: "ai", user = %user_id, error = %e, "LLM difficulty failed; using local rule.");
      }
    }
  }

  let (adjustment, reason) = fallback_adjustment(avg_accuracy, plays.len() as u32);
  DifficultyOut {
    game,
    current_level,
    adjustment,
    target_level: apply_adjustment(current_level, adjustment),
    reason,
    source: "fallback",
  }
}

/// Weekly clinical-style narrative. Field-level fallback: any piece the model
/// left empty is filled from the locally assembled note.
#[instrument(level = "info", skip(state), fields(user = %user_id))]
pub async fn make_report(state: &AppState, user_id: &str) -> ReportOut {
  let summary = overall_summary_for(state, user_id).await;
  let (overview, strengths, attention_points, recommendation) = fallback_report(&summary);

  if let Some(llm) = &state.llm {
    let summary_json = serde_json::to_string(&summary).unwrap_or_else(|_| "{}".into());
    match llm.weekly_report(&state.prompts, &summary_json).await {
      Ok(raw) => {
        return ReportOut {
          overview: if raw.overview.trim().is_empty() { overview } else { raw.overview },
          strengths: if raw.strengths.is_empty() { strengths } else { raw.strengths },
          attention_points: if raw.attention_points.is_empty() {
            attention_points
          } else {
            raw.attention_points
          },
          recommendation: if raw.recommendation.trim().is_empty() {
            recommendation
          } else {
            raw.recommendation
          },
          source: "llm",
        };
      }
      Err(e) => {
        error!(target: "ai", user = %user_id, error = %e, "LLM report failed; using static note.");
      }
    }
  }

  ReportOut { overview, strengths, attention_points, recommendation, source: "fallback" }
}

fn apply_adjustment(level: u8, adjustment: i8) -> u8 {
  (i16::from(level) + i16::from(adjustment)).clamp(i16::from(MIN_LEVEL), i16::from(MAX_LEVEL)) as u8
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn adjustment_clamps_to_level_range() {
    assert_eq!(apply_adjustment(1, -1), 1);
    assert_eq!(apply_adjustment(5, 1), 5);
    assert_eq!(apply_adjustment(3, 1), 4);
    assert_eq!(apply_adjustment(3, -1), 2);
    assert_eq!(apply_adjustment(3, 0), 3);
  }
}
