//! Domain models: session records for activities and games, moods, game kinds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Self-reported mood on a 5-point scale. Children pick these from emoji in
/// the frontend; we only see the label.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
  Sad,
  Tired,
  Okay,
  Happy,
  Excited,
}

impl Mood {
  /// Numeric value used for trend math (1 = sad … 5 = excited).
  pub fn score(self) -> f32 {
    match self {
      Mood::Sad => 1.0,
      Mood::Tired => 2.0,
      Mood::Okay => 3.0,
      Mood::Happy => 4.0,
      Mood::Excited => 5.0,
    }
  }
}

/// The cognitive domain a game trains.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
  Memory,
  Attention,
  Logic,
  Language,
  Motor,
}

impl GameKind {
  pub fn label(self) -> &'static str {
    match self {
      GameKind::Memory => "memory",
      GameKind::Attention => "attention",
      GameKind::Logic => "logic",
      GameKind::Language => "language",
      GameKind::Motor => "motor",
    }
  }
}

/// One completed non-game activity session (drawing, story time, exercises).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityRecord {
  pub id: String,
  pub user_id: String,
  pub activity: String,
  #[serde(default)] pub category: String,
  pub duration_seconds: u32,
  #[serde(default)] pub mood_before: Option<Mood>,
  #[serde(default)] pub mood_after: Option<Mood>,
  #[serde(default)] pub notes: String,
  pub completed_at: DateTime<Utc>,
}

/// One completed game attempt. Scoring happens client-side; we persist and
/// aggregate whatever the game reported.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRecord {
  pub id: String,
  pub user_id: String,
  pub game: GameKind,
  /// Difficulty level the attempt was played at (1..=5).
  pub level: u8,
  pub score: u32,
  /// Percentage of correct responses, 0..=100.
  pub accuracy: f32,
  pub duration_seconds: u32,
  pub completed_at: DateTime<Utc>,
}
