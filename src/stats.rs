//! Aggregation layer: pure functions computing summaries from in-memory
//! session records.
//!
//! Everything here is deterministic and side-effect free; handlers load the
//! records from the store and pass them in. Dates are bucketed on UTC
//! calendar days, matching how the frontend displays the week view.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{ActivityRecord, GameKind, GameRecord};

/// Direction of a measured series. Used for both mood deltas and accuracy.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
  Improving,
  Steady,
  Declining,
}

#[derive(Clone, Debug, Serialize)]
pub struct MoodSummary {
  /// Mean of (mood_after - mood_before) over sessions reporting both.
  pub average_delta: Option<f32>,
  pub trend: Trend,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct DayBucket {
  pub date: NaiveDate,
  pub sessions: u32,
  pub minutes: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct ActivitySummary {
  /// Activities + game attempts combined; streaks count any session kind.
  pub total_sessions: u32,
  pub total_minutes: u32,
  pub current_streak: u32,
  pub best_streak: u32,
  pub mood: MoodSummary,
  /// Last 7 calendar days, oldest first, today inclusive.
  pub week: Vec<DayBucket>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameBreakdown {
  pub game: GameKind,
  pub plays: u32,
  pub avg_score: f32,
  pub best_score: u32,
  pub avg_accuracy: f32,
  pub accuracy_variance: f32,
  pub trend: Trend,
}

#[derive(Clone, Debug, Serialize)]
pub struct GamesSummary {
  pub total_plays: u32,
  pub avg_accuracy: f32,
  pub games: Vec<GameBreakdown>,
}

/// Combined view handed to the weekly report builder.
#[derive(Clone, Debug, Serialize)]
pub struct OverallSummary {
  pub activity: ActivitySummary,
  pub games: GamesSummary,
}

/// Collapse timestamps to the set of distinct active calendar days.
pub fn active_days<I: IntoIterator<Item = DateTime<Utc>>>(stamps: I) -> BTreeSet<NaiveDate> {
  stamps.into_iter().map(|ts| ts.date_naive()).collect()
}

/// Consecutive active days ending at the most recent one, but only when that
/// run is still "alive" (latest day is today or yesterday). A child who last
/// trained three days ago has a streak of 0, not of whatever the old run was.
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
  let latest = match days.iter().next_back() {
    Some(d) => *d,
    None => return 0,
  };
  if (today - latest).num_days() > 1 {
    return 0;
  }
  let mut streak = 1u32;
  let mut cur = latest;
  while let Some(prev) = cur.pred_opt() {
    if !days.contains(&prev) {
      break;
    }
    streak += 1;
    cur = prev;
  }
  streak
}

/// Longest run of consecutive active days anywhere in the history.
pub fn best_streak(days: &BTreeSet<NaiveDate>) -> u32 {
  let mut best = 0u32;
  let mut run = 0u32;
  let mut prev: Option<NaiveDate> = None;
  for &day in days {
    run = match prev {
      Some(p) if (day - p).num_days() == 1 => run + 1,
      _ => 1,
    };
    best = best.max(run);
    prev = Some(day);
  }
  best
}

/// Mean mood delta over activities reporting both before and after moods.
pub fn mood_average_delta(acts: &[ActivityRecord]) -> Option<f32> {
  let deltas: Vec<f32> = acts
    .iter()
    .filter_map(|a| match (a.mood_before, a.mood_after) {
      (Some(b), Some(aft)) => Some(aft.score() - b.score()),
      _ => None,
    })
    .collect();
  if deltas.is_empty() { None } else { Some(mean(&deltas)) }
}

pub fn mood_trend(average_delta: Option<f32>) -> Trend {
  match average_delta {
    Some(d) if d > 0.25 => Trend::Improving,
    Some(d) if d < -0.25 => Trend::Declining,
    _ => Trend::Steady,
  }
}

/// Bucket sessions into the last 7 calendar days (oldest first).
pub fn weekly_buckets(sessions: &[(DateTime<Utc>, u32)], today: NaiveDate) -> Vec<DayBucket> {
  (0..7i64)
    .rev()
    .map(|back| {
      let date = today - Duration::days(back);
      let mut n = 0u32;
      let mut secs = 0u64;
      for (ts, dur) in sessions {
        if ts.date_naive() == date {
          n += 1;
          secs += u64::from(*dur);
        }
      }
      DayBucket { date, sessions: n, minutes: (secs / 60) as u32 }
    })
    .collect()
}

pub fn mean(xs: &[f32]) -> f32 {
  if xs.is_empty() { 0.0 } else { xs.iter().sum::<f32>() / xs.len() as f32 }
}

/// Population variance.
pub fn variance(xs: &[f32]) -> f32 {
  if xs.is_empty() {
    return 0.0;
  }
  let m = mean(xs);
  xs.iter().map(|x| (x - m) * (x - m)).sum::<f32>() / xs.len() as f32
}

/// Compare older-half vs newer-half mean accuracy of a play series.
/// Fewer than 4 plays is too little signal to call a direction.
pub fn accuracy_trend(ordered: &[f32]) -> Trend {
  if ordered.len() < 4 {
    return Trend::Steady;
  }
  let mid = ordered.len() / 2;
  let diff = mean(&ordered[mid..]) - mean(&ordered[..mid]);
  if diff > 2.0 {
    Trend::Improving
  } else if diff < -2.0 {
    Trend::Declining
  } else {
    Trend::Steady
  }
}

/// Per-game breakdowns, most-played first.
pub fn game_breakdowns(games: &[GameRecord]) -> Vec<GameBreakdown> {
  let kinds = [
    GameKind::Memory,
    GameKind::Attention,
    GameKind::Logic,
    GameKind::Language,
    GameKind::Motor,
  ];
  let mut out = Vec::new();
  for kind in kinds {
    let mut plays: Vec<&GameRecord> = games.iter().filter(|g| g.game == kind).collect();
    if plays.is_empty() {
      continue;
    }
    plays.sort_by_key(|g| g.completed_at);
    let scores: Vec<f32> = plays.iter().map(|g| g.score as f32).collect();
    let accuracies: Vec<f32> = plays.iter().map(|g| g.accuracy).collect();
    out.push(GameBreakdown {
      game: kind,
      plays: plays.len() as u32,
      avg_score: mean(&scores),
      best_score: plays.iter().map(|g| g.score).max().unwrap_or(0),
      avg_accuracy: mean(&accuracies),
      accuracy_variance: variance(&accuracies),
      trend: accuracy_trend(&accuracies),
    });
  }
  out.sort_by(|a, b| b.plays.cmp(&a.plays));
  out
}

/// Streaks, mood trend and week view across both session domains.
pub fn activity_summary(
  acts: &[ActivityRecord],
  games: &[GameRecord],
  today: NaiveDate,
) -> ActivitySummary {
  let stamps = acts
    .iter()
    .map(|a| a.completed_at)
    .chain(games.iter().map(|g| g.completed_at));
  let days = active_days(stamps);

  let sessions: Vec<(DateTime<Utc>, u32)> = acts
    .iter()
    .map(|a| (a.completed_at, a.duration_seconds))
    .chain(games.iter().map(|g| (g.completed_at, g.duration_seconds)))
    .collect();
  let total_secs: u64 = sessions.iter().map(|(_, d)| u64::from(*d)).sum();

  let average_delta = mood_average_delta(acts);
  ActivitySummary {
    total_sessions: sessions.len() as u32,
    total_minutes: (total_secs / 60) as u32,
    current_streak: current_streak(&days, today),
    best_streak: best_streak(&days),
    mood: MoodSummary { average_delta, trend: mood_trend(average_delta) },
    week: weekly_buckets(&sessions, today),
  }
}

pub fn games_summary(games: &[GameRecord]) -> GamesSummary {
  let accuracies: Vec<f32> = games.iter().map(|g| g.accuracy).collect();
  GamesSummary {
    total_plays: games.len() as u32,
    avg_accuracy: mean(&accuracies),
    games: game_breakdowns(games),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Mood;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("date")
  }

  fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    day(y, m, d).and_hms_opt(h, 0, 0).expect("time").and_utc()
  }

  fn activity(at: DateTime<Utc>, before: Option<Mood>, after: Option<Mood>) -> ActivityRecord {
    ActivityRecord {
      id: "a".into(),
      user_id: "u1".into(),
      activity: "drawing".into(),
      category: "creative".into(),
      duration_seconds: 600,
      mood_before: before,
      mood_after: after,
      notes: String::new(),
      completed_at: at,
    }
  }

  fn game(at: DateTime<Utc>, kind: GameKind, accuracy: f32, score: u32) -> GameRecord {
    GameRecord {
      id: "g".into(),
      user_id: "u1".into(),
      game: kind,
      level: 2,
      score,
      accuracy,
      duration_seconds: 300,
      completed_at: at,
    }
  }

  #[test]
  fn streak_counts_back_from_today() {
    let days = active_days(vec![ts(2026, 8, 21, 9), ts(2026, 8, 22, 10), ts(2026, 8, 23, 8)]);
    assert_eq!(current_streak(&days, day(2026, 8, 23)), 3);
  }

  #[test]
  fn streak_alive_when_latest_was_yesterday() {
    let days = active_days(vec![ts(2026, 8, 21, 9), ts(2026, 8, 22, 10)]);
    assert_eq!(current_streak(&days, day(2026, 8, 23)), 2);
  }

  #[test]
  fn streak_dead_after_a_missed_day() {
    let days = active_days(vec![ts(2026, 8, 19, 9), ts(2026, 8, 20, 10)]);
    assert_eq!(current_streak(&days, day(2026, 8, 23)), 0);
  }

  #[test]
  fn streak_ignores_multiple_sessions_per_day() {
    let days = active_days(vec![ts(2026, 8, 22, 9), ts(2026, 8, 22, 15), ts(2026, 8, 23, 8)]);
    assert_eq!(current_streak(&days, day(2026, 8, 23)), 2);
  }

  #[test]
  fn best_streak_finds_longest_historic_run() {
    let days = active_days(vec![
      ts(2026, 8, 1, 9),
      ts(2026, 8, 2, 9),
      ts(2026, 8, 3, 9),
      ts(2026, 8, 10, 9),
      ts(2026, 8, 11, 9),
      ts(2026, 8, 23, 9),
    ]);
    assert_eq!(best_streak(&days), 3);
    assert_eq!(current_streak(&days, day(2026, 8, 23)), 1);
  }

  #[test]
  fn empty_history_has_no_streaks() {
    let days = BTreeSet::new();
    assert_eq!(current_streak(&days, day(2026, 8, 23)), 0);
    assert_eq!(best_streak(&days), 0);
  }

  #[test]
  fn mood_delta_skips_incomplete_pairs() {
    let acts = vec![
      activity(ts(2026, 8, 23, 9), Some(Mood::Tired), Some(Mood::Happy)),
      activity(ts(2026, 8, 23, 10), Some(Mood::Okay), None),
      activity(ts(2026, 8, 23, 11), None, Some(Mood::Excited)),
    ];
    // Single usable pair: tired(2) -> happy(4) = +2.
    assert_eq!(mood_average_delta(&acts), Some(2.0));
    assert_eq!(mood_trend(Some(2.0)), Trend::Improving);
  }

  #[test]
  fn mood_trend_classification() {
    assert_eq!(mood_trend(None), Trend::Steady);
    assert_eq!(mood_trend(Some(0.1)), Trend::Steady);
    assert_eq!(mood_trend(Some(-0.1)), Trend::Steady);
    assert_eq!(mood_trend(Some(0.5)), Trend::Improving);
    assert_eq!(mood_trend(Some(-0.5)), Trend::Declining);
  }

  #[test]
  fn weekly_buckets_cover_seven_days_oldest_first() {
    let sessions = vec![
      (ts(2026, 8, 23, 9), 600u32),
      (ts(2026, 8, 23, 15), 300u32),
      (ts(2026, 8, 20, 9), 1200u32),
      (ts(2026, 8, 10, 9), 900u32), // outside the window
    ];
    let week = weekly_buckets(&sessions, day(2026, 8, 23));
    assert_eq!(week.len(), 7);
    assert_eq!(week[0].date, day(2026, 8, 17));
    assert_eq!(week[6].date, day(2026, 8, 23));
    assert_eq!(week[6].sessions, 2);
    assert_eq!(week[6].minutes, 15);
    assert_eq!(week[3].sessions, 1);
    assert_eq!(week[3].minutes, 20);
    assert_eq!(week[1].sessions, 0);
  }

  #[test]
  fn variance_of_constant_series_is_zero() {
    assert_eq!(variance(&[70.0, 70.0, 70.0]), 0.0);
    assert_eq!(variance(&[]), 0.0);
  }

  #[test]
  fn variance_matches_hand_computation() {
    // mean 75, squared deviations 25+25 -> /2 = 25
    let v = variance(&[70.0, 80.0]);
    assert!((v - 25.0).abs() < 1e-4);
  }

  #[test]
  fn accuracy_trend_needs_four_plays() {
    assert_eq!(accuracy_trend(&[50.0, 90.0, 95.0]), Trend::Steady);
  }

  #[test]
  fn accuracy_trend_detects_direction() {
    assert_eq!(accuracy_trend(&[60.0, 62.0, 80.0, 84.0]), Trend::Improving);
    assert_eq!(accuracy_trend(&[85.0, 88.0, 60.0, 58.0]), Trend::Declining);
    assert_eq!(accuracy_trend(&[70.0, 71.0, 70.0, 72.0]), Trend::Steady);
  }

  #[test]
  fn breakdown_groups_by_game_and_orders_by_plays() {
    let games = vec![
      game(ts(2026, 8, 20, 9), GameKind::Memory, 60.0, 100),
      game(ts(2026, 8, 21, 9), GameKind::Memory, 70.0, 140),
      game(ts(2026, 8, 22, 9), GameKind::Memory, 80.0, 120),
      game(ts(2026, 8, 22, 10), GameKind::Logic, 90.0, 300),
    ];
    let breakdowns = game_breakdowns(&games);
    assert_eq!(breakdowns.len(), 2);
    assert_eq!(breakdowns[0].game, GameKind::Memory);
    assert_eq!(breakdowns[0].plays, 3);
    assert_eq!(breakdowns[0].best_score, 140);
    assert!((breakdowns[0].avg_accuracy - 70.0).abs() < 1e-4);
    assert_eq!(breakdowns[1].game, GameKind::Logic);
    assert_eq!(breakdowns[1].plays, 1);
  }

  #[test]
  fn summary_combines_both_domains() {
    let acts = vec![activity(ts(2026, 8, 22, 9), Some(Mood::Okay), Some(Mood::Happy))];
    let games = vec![game(ts(2026, 8, 23, 9), GameKind::Attention, 75.0, 80)];
    let s = activity_summary(&acts, &games, day(2026, 8, 23));
    assert_eq!(s.total_sessions, 2);
    assert_eq!(s.total_minutes, 15);
    assert_eq!(s.current_streak, 2);
    assert_eq!(s.best_streak, 2);
    assert_eq!(s.mood.trend, Trend::Improving);
  }
}
