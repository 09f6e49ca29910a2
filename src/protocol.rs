//! Public request/response DTOs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{GameKind, Mood};

//
// HTTP request DTOs
//

#[derive(Debug, Deserialize)]
pub struct ActivityIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub activity: String,
    #[serde(default)]
    pub category: String,
    pub duration_seconds: u32,
    #[serde(default)]
    pub mood_before: Option<Mood>,
    #[serde(default)]
    pub mood_after: Option<Mood>,
    #[serde(default)]
    pub notes: String,
    /// Client timestamp; the server fills in "now" when absent.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct GameIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub game: GameKind,
    #[serde(default = "default_level")]
    pub level: u8,
    pub score: u32,
    pub accuracy: f32,
    pub duration_seconds: u32,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_level() -> u8 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GamesQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub game: Option<GameKind>,
}

#[derive(Debug, Deserialize)]
pub struct AiDifficultyIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub game: GameKind,
}

//
// HTTP response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct EncouragementOut {
    pub message: String,
    pub tip: String,
    /// "llm" or "fallback" so the frontend can mark canned content.
    pub source: &'static str,
}

#[derive(Serialize)]
pub struct DifficultyOut {
    pub game: GameKind,
    pub current_level: u8,
    pub adjustment: i8,
    pub target_level: u8,
    pub reason: String,
    pub source: &'static str,
}

#[derive(Serialize)]
pub struct ReportOut {
    pub overview: String,
    pub strengths: Vec<String>,
    pub attention_points: Vec<String>,
    pub recommendation: String,
    pub source: &'static str,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}
