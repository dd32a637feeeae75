//! Text moderation and claim analysis over an OpenAI-compatible HTTP API.
//!
//! Both operations are non-blocking for callers: an unconfigured client or a
//! failed request yields a structured "not moderated" / "not analyzed" result
//! instead of an error.
//!
//! # Examples
//!
//! ```no_run
//! use credence_moderation::{ModerationClient, ModerationConfig};
//!
//! # async fn demo() -> Result<(), credence_moderation::ModerationError> {
//! let client = ModerationClient::new(ModerationConfig {
//!   api_key: std::env::var("OPENAI_API_KEY").ok(),
//!   ..ModerationConfig::default()
//! })?;
//! let result = client.moderate("Drinking coffee prevents all cancers").await;
//! if result.moderated {
//!   println!("overall score: {:?}", result.overall_score);
//! }
//! # Ok(())
//! # }
//! ```

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model used by [`ModerationClient::analyze`].
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default request timeout (10 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const NOT_CONFIGURED: &str = "moderation API key not configured";

const ANALYSIS_MAX_TOKENS: u32 = 150;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Failures talking to the moderation service. These never reach callers of
/// [`ModerationClient::moderate`] or [`ModerationClient::analyze`]; they are
/// folded into the result's `error` field.
#[derive(Debug, Error)]
pub enum ModerationError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("moderation response contained no results")]
  EmptyResponse,
}

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ModerationConfig {
  /// Bearer token for the API. `None` leaves the client unconfigured.
  pub api_key:  Option<String>,
  pub base_url: String,
  pub model:    String,
  /// Upper bound on each request, connection included.
  pub timeout:  Duration,
}

impl Default for ModerationConfig {
  fn default() -> Self {
    Self {
      api_key:  None,
      base_url: DEFAULT_BASE_URL.to_owned(),
      model:    DEFAULT_MODEL.to_owned(),
      timeout:  Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// Outcome of [`ModerationClient::moderate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
  /// Whether the service actually classified the text.
  pub moderated:       bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub flagged:         Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub categories:      Option<BTreeMap<String, bool>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub category_scores: Option<BTreeMap<String, f64>>,
  /// The highest category score, or 0 when there are none.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub overall_score:   Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:           Option<String>,
}

impl ModerationResult {
  pub fn not_configured() -> Self {
    Self { reason: Some(NOT_CONFIGURED.to_owned()), ..Self::default() }
  }

  pub fn failed(error: &ModerationError) -> Self {
    Self { error: Some(error.to_string()), ..Self::default() }
  }

  fn from_verdict(v: Verdict) -> Self {
    let overall = v.category_scores.values().copied().fold(0.0, f64::max);
    Self {
      moderated:       true,
      flagged:         Some(v.flagged),
      categories:      Some(v.categories),
      category_scores: Some(v.category_scores),
      overall_score:   Some(overall),
      reason:          None,
      error:           None,
    }
  }

  /// The score to persist on a claim: `overall_score` if moderated.
  pub fn score(&self) -> Option<f64> {
    if self.moderated { Some(self.overall_score.unwrap_or(0.0)) } else { None }
  }
}

/// Outcome of [`ModerationClient::analyze`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimAnalysis {
  pub analyzed: bool,
  /// Free-form assessment text from the model.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub analysis: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason:   Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:    Option<String>,
}

impl ClaimAnalysis {
  pub fn not_configured() -> Self {
    Self { reason: Some(NOT_CONFIGURED.to_owned()), ..Self::default() }
  }

  pub fn failed(error: &ModerationError) -> Self {
    Self { error: Some(error.to_string()), ..Self::default() }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ModerationRequest<'a> {
  input: &'a str,
}

#[derive(Deserialize)]
struct ModerationResponse {
  results: Vec<Verdict>,
}

#[derive(Deserialize)]
struct Verdict {
  flagged:         bool,
  #[serde(default)]
  categories:      BTreeMap<String, bool>,
  #[serde(default)]
  category_scores: BTreeMap<String, f64>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:      &'a str,
  messages:   Vec<ChatMessage>,
  max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
  role:    String,
  content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
  message: ChatMessage,
}

fn analysis_prompt(claim_text: &str) -> String {
  format!(
    "Analyze this claim for fact-checking: \"{claim_text}\"\n\n\
     Provide analysis in this format:\n\
     Category: [news/science/politics/health/other]\n\
     Complexity: [low/medium/high]\n\
     Verifiability: [low/medium/high]\n\
     Risk Level: [low/medium/high]"
  )
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// HTTP client for the moderation service.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ModerationClient {
  client: reqwest::Client,
  config: ModerationConfig,
}

impl ModerationClient {
  pub fn new(config: ModerationConfig) -> Result<Self, ModerationError> {
    let client = reqwest::Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  pub fn is_configured(&self) -> bool { self.config.api_key.is_some() }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Classify `text`. Never fails; see [`ModerationResult`].
  pub async fn moderate(&self, text: &str) -> ModerationResult {
    let Some(key) = self.config.api_key.as_deref() else {
      return ModerationResult::not_configured();
    };
    match self.request_moderation(key, text).await {
      Ok(result) => result,
      Err(e) => {
        tracing::warn!(error = %e, "moderation request failed");
        ModerationResult::failed(&e)
      }
    }
  }

  async fn request_moderation(
    &self,
    key: &str,
    text: &str,
  ) -> Result<ModerationResult, ModerationError> {
    let resp: ModerationResponse = self
      .client
      .post(self.url("/moderations"))
      .bearer_auth(key)
      .json(&ModerationRequest { input: text })
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    let verdict = resp
      .results
      .into_iter()
      .next()
      .ok_or(ModerationError::EmptyResponse)?;
    Ok(ModerationResult::from_verdict(verdict))
  }

  /// Ask the chat model for a fact-checking assessment of `claim_text`.
  /// Never fails; see [`ClaimAnalysis`].
  pub async fn analyze(&self, claim_text: &str) -> ClaimAnalysis {
    let Some(key) = self.config.api_key.as_deref() else {
      return ClaimAnalysis::not_configured();
    };
    match self.request_analysis(key, claim_text).await {
      Ok(text) => ClaimAnalysis {
        analyzed: true,
        analysis: Some(text),
        ..ClaimAnalysis::default()
      },
      Err(e) => {
        tracing::warn!(error = %e, "claim analysis request failed");
        ClaimAnalysis::failed(&e)
      }
    }
  }

  async fn request_analysis(
    &self,
    key: &str,
    claim_text: &str,
  ) -> Result<String, ModerationError> {
    let body = ChatRequest {
      model:      &self.config.model,
      messages:   vec![ChatMessage {
        role:    "user".to_owned(),
        content: analysis_prompt(claim_text),
      }],
      max_tokens: ANALYSIS_MAX_TOKENS,
    };

    let resp: ChatResponse = self
      .client
      .post(self.url("/chat/completions"))
      .bearer_auth(key)
      .json(&body)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    let choice = resp
      .choices
      .into_iter()
      .next()
      .ok_or(ModerationError::EmptyResponse)?;
    Ok(choice.message.content.trim().to_owned())
  }
}
