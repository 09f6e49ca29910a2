//! Application state: session store, prompts, fallback pool, LLM client.

use std::path::PathBuf;

use tracing::{info, instrument};

use crate::config::{load_agent_config_from_env, Prompts};
use crate::fallbacks::encouragement_pool;
use crate::llm::Llm;
use crate::store::SessionStore;

pub struct AppState {
    pub store: SessionStore,
    pub llm: Option<Llm>,
    pub prompts: Prompts,
    /// Built-in fallback encouragements plus any configured extras.
    pub encouragements: Vec<(String, String)>,
}

impl AppState {
    /// Build state from env: load config, open the flat-file store, init LLM.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        // Load TOML config if provided (prompts + optional extra pool entries).
        let cfg_opt = load_agent_config_from_env();
        let prompts = cfg_opt
            .as_ref()
            .map(|c| c.prompts.clone())
            .unwrap_or_default();

        let mut encouragements = encouragement_pool();
        if let Some(cfg) = &cfg_opt {
            for e in &cfg.encouragements {
                encouragements.push((e.message.clone(), e.tip.clone()));
            }
        }
        info!(target: "ai", pool = encouragements.len(), "Fallback encouragement pool ready");

        let data_dir: PathBuf = std::env::var("DATA_DIR")
            .unwrap_or_else(|_| "./data".into())
            .into();
        let store = SessionStore::open(data_dir);

        // Build optional LLM client (enabled when LLM_BASE_URL is set).
        let llm = Llm::from_env();
        if let Some(c) = &llm {
            info!(target: "sproutmind_backend", base_url = %c.base_url, model = %c.model, "LLM gateway enabled.");
        } else {
            info!(target: "sproutmind_backend", "LLM gateway disabled (no LLM_BASE_URL). Using fallback responses.");
        }

        Self { store, llm, prompts, encouragements }
    }
}
