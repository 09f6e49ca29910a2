//! Gateway to a local LLM chat-completions endpoint.
//!
//! We only call chat.completions with a JSON-shaped prompt. Local servers
//! (Ollama, llama.cpp, LM Studio) expose the OpenAI wire format but do not
//! reliably honor `response_format`, so replies are treated as free text and
//! the first balanced JSON object is scraped out of them. Target structs use
//! field-level defaults so a partial object still yields a usable value.
//!
//! Calls are instrumented and log model names, latencies, and response sizes
//! (not contents). The prompt only ever carries aggregated numbers, never a
//! child's free-text notes.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{instrument, info};

use crate::config::Prompts;
use crate::util::{extract_json_object, fill_template, trunc_for_log};

#[derive(Clone)]
pub struct Llm {
  pub client: reqwest::Client,
  pub base_url: String,
  pub model: String,
  pub api_key: Option<String>,
}

/// Encouragement payload as the model returns it.
#[derive(Debug, Deserialize)]
pub struct EncouragementRaw {
  #[serde(default)] pub message: String,
  #[serde(default)] pub tip: String,
}

/// Difficulty advice payload as the model returns it.
#[derive(Debug, Deserialize)]
pub struct DifficultyRaw {
  #[serde(default)] pub adjustment: i8,
  #[serde(default)] pub reason: String,
}

/// Weekly narrative payload as the model returns it.
#[derive(Debug, Deserialize)]
pub struct ReportRaw {
  #[serde(default)] pub overview: String,
  #[serde(default)] pub strengths: Vec<String>,
  #[serde(default)] pub attention_points: Vec<String>,
  #[serde(default)] pub recommendation: String,
}

impl Llm {
  /// Construct the client if LLM_BASE_URL is set; otherwise return None and
  /// the app runs on fallbacks alone. The key is optional because most local
  /// servers ignore it.
  pub fn from_env() -> Option<Self> {
    let base_url = std::env::var("LLM_BASE_URL").ok()?;
    let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "llama3.1".into());
    let api_key = std::env::var("LLM_API_KEY").ok();

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .ok()?;

    Some(Self { client, base_url, model, api_key })
  }

  /// One chat completion returning the raw assistant text.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model, user_len = user.len()))]
  async fn chat_text(&self, system: &str, user: &str, temperature: f32) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
    };

    let mut builder = self.client.post(&url)
      .header(USER_AGENT, "sproutmind-backend/0.1")
      .header(CONTENT_TYPE, "application/json");
    if let Some(key) = &self.api_key {
      builder = builder.header(AUTHORIZATION, format!("Bearer {}", key));
    }

    let res = builder.json(&req).send().await.map_err(|e| e.to_string())?;
    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_api_error(&body).unwrap_or(body);
      return Err(format!("LLM HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "LLM usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();

    Ok(text)
  }

  /// Chat completion decoded into `T` via JSON scraping.
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<T, String> {
    let text = self.chat_text(system, user, temperature).await?;
    decode_json_reply(&text)
  }

  // --- High-level helpers (domain-specialized) ---

  #[instrument(level = "info", skip(self, prompts, summary_json), fields(summary_len = summary_json.len()))]
  pub async fn encouragement(
    &self,
    prompts: &Prompts,
    summary_json: &str,
  ) -> Result<EncouragementRaw, String> {
    let user = fill_template(
      &prompts.encouragement_user_template,
      &[("summary_json", summary_json)],
    );
    self.chat_json(&prompts.encouragement_system, &user, 0.8).await
  }

  #[instrument(level = "info", skip(self, prompts, breakdown_json), fields(%game, level))]
  pub async fn difficulty(
    &self,
    prompts: &Prompts,
    game: &str,
    level: u8,
    breakdown_json: &str,
  ) -> Result<DifficultyRaw, String> {
    let level_s = level.to_string();
    let user = fill_template(
      &prompts.difficulty_user_template,
      &[("game", game), ("level", &level_s), ("breakdown_json", breakdown_json)],
    );
    self.chat_json(&prompts.difficulty_system, &user, 0.2).await
  }

  #[instrument(level = "info", skip(self, prompts, summary_json), fields(summary_len = summary_json.len()))]
  pub async fn weekly_report(
    &self,
    prompts: &Prompts,
    summary_json: &str,
  ) -> Result<ReportRaw, String> {
    let user = fill_template(
      &prompts.report_user_template,
      &[("summary_json", summary_json)],
    );
    self.chat_json(&prompts.report_system, &user, 0.4).await
  }
}

/// Scrape the first JSON object out of assistant text and deserialize it.
pub fn decode_json_reply<T: for<'a> Deserialize<'a>>(text: &str) -> Result<T, String> {
  let payload = extract_json_object(text)
    .ok_or_else(|| format!("no JSON object in reply: {}", trunc_for_log(text, 120)))?;
  serde_json::from_str::<T>(payload).map_err(|e| format!("JSON parse error: {}", e))
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI-style error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decode_tolerates_prose_and_missing_fields() {
    let text = "Of course! Here you go:\n{\"message\": \"Nice work today!\"}\nAnything else?";
    let e: EncouragementRaw = decode_json_reply(text).expect("decode");
    assert_eq!(e.message, "Nice work today!");
    assert_eq!(e.tip, ""); // field-level default
  }

  #[test]
  fn decode_difficulty_defaults_to_hold() {
    let d: DifficultyRaw = decode_json_reply("{\"reason\": \"keep steady\"}").expect("decode");
    assert_eq!(d.adjustment, 0);
  }

  #[test]
  fn decode_rejects_text_without_json() {
    let r: Result<EncouragementRaw, String> = decode_json_reply("I cannot answer that.");
    let err = r.expect_err("no object");
    // The error carries a (truncated) reply preview for the logs.
    assert!(err.contains("I cannot answer that."));
  }

  #[test]
  fn api_error_extraction() {
    let body = r#"{"error": {"message": "model not found"}}"#;
    assert_eq!(extract_api_error(body).as_deref(), Some("model not found"));
    assert_eq!(extract_api_error("plain failure"), None);
  }
}
