//! Loading agent configuration (prompts + optional extra encouragement pool)
//! from TOML.
//!
//! See `AgentConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{info, error};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Extra fallback encouragement entries merged with the built-in pool.
  #[serde(default)]
  pub encouragements: Vec<EncouragementCfg>,
}

/// Encouragement entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct EncouragementCfg {
  pub message: String,
  #[serde(default)] pub tip: String,
}

/// Prompts used by the LLM gateway. Defaults are tuned for short,
/// child-friendly output. Override them in TOML to adjust tone/structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  // Encouragement message
  pub encouragement_system: String,
  pub encouragement_user_template: String,
  // Difficulty adjustment
  pub difficulty_system: String,
  pub difficulty_user_template: String,
  // Weekly clinical-style narrative
  pub report_system: String,
  pub report_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      encouragement_system: "You write warm, simple encouragement for a child in cognitive rehabilitation. One or two short sentences, no medical terms. Respond ONLY with strict JSON.".into(),
      encouragement_user_template: "Recent training summary (JSON): {summary_json}\nReturn JSON with fields: message (encouragement addressed to the child), tip (one tiny, concrete suggestion for the next session).".into(),
      difficulty_system: "You tune difficulty for children's cognitive training games. Be conservative: change at most one level at a time. Respond ONLY with strict JSON.".into(),
      difficulty_user_template: "Game: {game}\nCurrent level: {level}\nRecent performance (JSON): {breakdown_json}\nReturn JSON {\"adjustment\": -1 | 0 | 1, \"reason\": string}. Raise only on consistently high accuracy; lower when the child is struggling.".into(),
      report_system: "You are a paediatric cognitive-rehabilitation assistant writing a weekly progress note for caregivers. Professional but plain language, no diagnoses. Respond ONLY with strict JSON.".into(),
      report_user_template: "Weekly summary (JSON): {summary_json}\nReturn JSON with fields: overview (2-3 sentences), strengths (array of short strings), attention_points (array of short strings), recommendation (one sentence).".into(),
    }
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AgentConfig>(&s) {
      Ok(cfg) => {
        info!(target: "sproutmind_backend", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "sproutmind_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "sproutmind_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
