//! Hardcoded fallback content used when the LLM is disabled or unreachable.

use rand::seq::SliceRandom;

use crate::stats::{GameBreakdown, OverallSummary, Trend};

/// Built-in encouragement pool. TOML config entries are appended to these,
/// so the app stays useful even without config or an LLM.
pub fn encouragement_pool() -> Vec<(String, String)> {
  [
    (
      "You showed up and gave it your best — that is what champions do!",
      "Try one round of your favorite game tomorrow morning.",
    ),
    (
      "Every session makes your brain a little bit stronger. Great work!",
      "A short break and a glass of water help you focus.",
    ),
    (
      "Practicing takes courage, and you keep coming back. Be proud!",
      "Ask a grown-up to play one round with you next time.",
    ),
    (
      "Look at you go! Small steps every day add up to big jumps.",
      "Pick the game you found hardest and try just one round.",
    ),
  ]
  .into_iter()
  .map(|(m, t)| (m.to_string(), t.to_string()))
  .collect()
}

/// Pick one entry from the pool (built-ins plus any configured extras).
pub fn pick_encouragement(pool: &[(String, String)]) -> (String, String) {
  pool
    .choose(&mut rand::thread_rng())
    .cloned()
    .unwrap_or_else(|| ("Great job today!".into(), "Come back tomorrow for more.".into()))
}

/// Local difficulty rule: raise on consistently high accuracy, lower when the
/// child is clearly struggling, otherwise hold.
pub fn fallback_adjustment(avg_accuracy: f32, plays: u32) -> (i8, String) {
  if plays == 0 {
    return (0, "No plays recorded yet; keeping the current level.".into());
  }
  if avg_accuracy >= 85.0 {
    (1, format!("Average accuracy {:.0}% is high; time for a bigger challenge.", avg_accuracy))
  } else if avg_accuracy < 55.0 {
    (-1, format!("Average accuracy {:.0}% is low; an easier level rebuilds confidence.", avg_accuracy))
  } else {
    (0, format!("Average accuracy {:.0}% is in the training zone; keeping the level.", avg_accuracy))
  }
}

/// Static weekly note assembled from the numbers alone.
pub fn fallback_report(summary: &OverallSummary) -> (String, Vec<String>, Vec<String>, String) {
  let a = &summary.activity;
  let overview = format!(
    "This week the child completed {} sessions totalling {} minutes, with a current streak of {} day(s). \
     Overall game accuracy averaged {:.0}%.",
    a.total_sessions, a.total_minutes, a.current_streak, summary.games.avg_accuracy
  );

  let mut strengths = Vec::new();
  let mut attention = Vec::new();
  for b in &summary.games.games {
    match b.trend {
      Trend::Improving => strengths.push(format!("{} games are trending upward.", label(b))),
      Trend::Declining => attention.push(format!("{} accuracy has dipped recently.", label(b))),
      Trend::Steady => {}
    }
    if b.avg_accuracy >= 85.0 {
      strengths.push(format!("Strong accuracy in {} games ({:.0}%).", label(b), b.avg_accuracy));
    } else if b.avg_accuracy < 55.0 {
      attention.push(format!("{} games remain difficult ({:.0}%).", label(b), b.avg_accuracy));
    }
  }
  if a.current_streak >= 3 {
    strengths.push(format!("Consistent daily practice ({}-day streak).", a.current_streak));
  }
  if matches!(a.mood.trend, Trend::Declining) {
    attention.push("Self-reported mood tends to drop across sessions.".into());
  }
  if strengths.is_empty() {
    strengths.push("Regular participation in the training programme.".into());
  }
  if attention.is_empty() {
    attention.push("No particular concerns from this week's data.".into());
  }

  let recommendation =
    "Continue short, regular sessions and review difficulty settings together at the next check-in."
      .to_string();

  (overview, strengths, attention, recommendation)
}

fn label(b: &GameBreakdown) -> String {
  let s = b.game.label();
  let mut c = s.chars();
  match c.next() {
    Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    None => String::new(),
  }
}
