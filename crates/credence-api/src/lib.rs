//! JSON REST API for Credence.
//!
//! Exposes an axum [`Router`] backed by any [`CredenceStore`], with every
//! route mounted under `/api`.

pub mod auth;
pub mod claims;
pub mod comments;
pub mod error;
pub mod evidence;
pub mod token;
pub mod votes;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{delete, get, post},
};
use credence_core::store::CredenceStore;
use credence_moderation::{ModerationClient, ModerationConfig};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use token::TokenIssuer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CREDENCE_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "defaults::host")]
  pub host:                    String,
  #[serde(default = "defaults::port")]
  pub port:                    u16,
  #[serde(default = "defaults::database_path")]
  pub database_path:           PathBuf,
  /// HMAC secret for signing tokens.
  pub jwt_secret:              String,
  #[serde(default = "defaults::access_ttl")]
  pub access_token_ttl_secs:   u64,
  #[serde(default = "defaults::refresh_ttl")]
  pub refresh_token_ttl_secs:  u64,
  /// Falls back to `OPENAI_API_KEY` when unset.
  #[serde(default)]
  pub moderation_api_key:      Option<String>,
  #[serde(default = "defaults::moderation_base_url")]
  pub moderation_base_url:     String,
  #[serde(default = "defaults::moderation_model")]
  pub moderation_model:        String,
  #[serde(default = "defaults::moderation_timeout")]
  pub moderation_timeout_secs: u64,
}

mod defaults {
  use std::path::PathBuf;

  pub fn host() -> String { "127.0.0.1".to_owned() }
  pub fn port() -> u16 { 5000 }
  pub fn database_path() -> PathBuf { PathBuf::from("credence.db") }
  pub fn access_ttl() -> u64 { crate::token::DEFAULT_ACCESS_TTL_SECS }
  pub fn refresh_ttl() -> u64 { crate::token::DEFAULT_REFRESH_TTL_SECS }
  pub fn moderation_base_url() -> String {
    credence_moderation::DEFAULT_BASE_URL.to_owned()
  }
  pub fn moderation_model() -> String {
    credence_moderation::DEFAULT_MODEL.to_owned()
  }
  pub fn moderation_timeout() -> u64 { credence_moderation::DEFAULT_TIMEOUT_SECS }
}

impl ServerConfig {
  pub fn token_issuer(&self) -> TokenIssuer {
    TokenIssuer::new(
      &self.jwt_secret,
      Duration::from_secs(self.access_token_ttl_secs),
      Duration::from_secs(self.refresh_token_ttl_secs),
    )
  }

  pub fn moderation_config(&self) -> ModerationConfig {
    ModerationConfig {
      api_key:  self.moderation_api_key.clone().filter(|k| !k.is_empty()),
      base_url: self.moderation_base_url.clone(),
      model:    self.moderation_model.clone(),
      timeout:  Duration::from_secs(self.moderation_timeout_secs),
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CredenceStore> {
  pub store:      Arc<S>,
  pub tokens:     Arc<TokenIssuer>,
  pub moderation: Arc<ModerationClient>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CredenceStore + Clone + 'static,
{
  let api = Router::new()
    // Auth
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/login",    post(auth::login::<S>))
    .route("/auth/profile",  get(auth::profile::<S>))
    .route("/auth/refresh",  post(auth::refresh::<S>))
    // Claims
    .route("/claims", get(claims::list::<S>).post(claims::create::<S>))
    .route(
      "/claims/{id}",
      get(claims::get_one::<S>)
        .put(claims::update::<S>)
        .delete(claims::delete::<S>),
    )
    .route("/claims/{id}/analysis", get(claims::analysis::<S>))
    // Evidence
    .route("/evidence",                  post(evidence::create::<S>))
    .route("/evidence/claim/{claim_id}", get(evidence::list_for_claim::<S>))
    .route("/evidence/{id}",             delete(evidence::delete::<S>))
    // Votes
    .route("/votes", post(votes::cast::<S>).delete(votes::remove::<S>))
    .route("/votes/claim/{claim_id}", get(votes::tally::<S>))
    // Comments
    .route("/comments",                  post(comments::create::<S>))
    .route("/comments/claim/{claim_id}", get(comments::list_for_claim::<S>))
    .route("/comments/{id}",             delete(comments::delete::<S>));

  Router::new()
    .nest("/api", api)
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use credence_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  struct TestApp {
    app:   Router,
    state: AppState<SqliteStore>,
  }

  struct Session {
    access:  String,
    refresh: String,
    user_id: Uuid,
  }

  async fn make_app() -> TestApp {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let state = AppState {
      store:      Arc::new(store),
      tokens:     Arc::new(TokenIssuer::new(
        "test-secret",
        Duration::from_secs(900),
        Duration::from_secs(3600),
      )),
      moderation: Arc::new(ModerationClient::new(ModerationConfig::default()).unwrap()),
    };
    TestApp { app: router(state.clone()), state }
  }

  impl TestApp {
    async fn send(
      &self,
      method: &str,
      uri: &str,
      token: Option<&str>,
      body: Option<Value>,
    ) -> (StatusCode, Value) {
      let mut builder = Request::builder().method(method).uri(uri);
      if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
      }
      let body = match body {
        Some(v) => {
          builder = builder.header(header::CONTENT_TYPE, "application/json");
          Body::from(v.to_string())
        }
        None => Body::empty(),
      };
      let resp = self.app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
      let status = resp.status();
      let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
      let json = if bytes.is_empty() {
        Value::Null
      } else {
        serde_json::from_slice(&bytes).unwrap()
      };
      (status, json)
    }

    async fn register(&self, username: &str) -> Session {
      let (status, body) = self
        .send(
          "POST",
          "/api/auth/register",
          None,
          Some(json!({
            "username": username,
            "email":    format!("{username}@example.com"),
            "password": "correct horse",
          })),
        )
        .await;
      assert_eq!(status, StatusCode::CREATED, "{body}");
      Session {
        access:  body["access_token"].as_str().unwrap().to_owned(),
        refresh: body["refresh_token"].as_str().unwrap().to_owned(),
        user_id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
      }
    }

    async fn create_claim(&self, who: &Session, title: &str) -> String {
      let (status, body) = self
        .send(
          "POST",
          "/api/claims",
          Some(&who.access),
          Some(json!({ "title": title, "description": "Some description" })),
        )
        .await;
      assert_eq!(status, StatusCode::CREATED, "{body}");
      body["claim"]["id"].as_str().unwrap().to_owned()
    }
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_returns_user_and_tokens() {
    let t = make_app().await;
    let (status, body) = t
      .send(
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "email": "alice@example.com", "password": "pw" })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
  }

  #[tokio::test]
  async fn duplicate_email_is_rejected_without_new_row() {
    let t = make_app().await;
    t.register("alice").await;

    let (status, body) = t
      .send(
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
          "username": "alice2",
          "email":    "alice@example.com",
          "password": "pw",
        })),
      )
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Email already registered" }));
    assert!(
      t.state
        .store
        .find_user_by_username("alice2".into())
        .await
        .unwrap()
        .is_none()
    );
  }

  #[tokio::test]
  async fn duplicate_username_is_rejected() {
    let t = make_app().await;
    t.register("alice").await;

    let (status, body) = t
      .send(
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "email": "other@example.com", "password": "pw" })),
      )
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already taken");
  }

  #[tokio::test]
  async fn register_requires_all_fields() {
    let t = make_app().await;
    let (status, body) = t
      .send(
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "alice", "password": "pw" })),
      )
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: username, email, password");
  }

  #[tokio::test]
  async fn login_checks_password() {
    let t = make_app().await;
    let alice = t.register("alice").await;

    let (status, body) = t
      .send(
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "correct horse" })),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], alice.user_id.to_string());

    let (status, body) = t
      .send(
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong" })),
      )
      .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");

    let (status, _) = t
      .send(
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "wrong" })),
      )
      .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn profile_and_refresh_respect_token_kind() {
    let t = make_app().await;
    let alice = t.register("alice").await;

    let (status, body) = t.send("GET", "/api/auth/profile", Some(&alice.access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");

    let (status, _) = t.send("GET", "/api/auth/profile", Some(&alice.refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = t.send("POST", "/api/auth/refresh", Some(&alice.access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) =
      t.send("POST", "/api/auth/refresh", Some(&alice.refresh), None).await;
    assert_eq!(status, StatusCode::OK);
    let fresh = body["access_token"].as_str().unwrap();

    let (status, _) = t.send("GET", "/api/auth/profile", Some(fresh), None).await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn token_for_missing_user_is_unauthenticated() {
    let t = make_app().await;
    let ghost = Uuid::new_v4();
    let access = t.state.tokens.issue_access(ghost).unwrap();
    let refresh = t.state.tokens.issue_refresh(ghost).unwrap();

    let (status, body) = t
      .send(
        "POST",
        "/api/claims",
        Some(&access),
        Some(json!({ "title": "t", "description": "d" })),
      )
      .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token");

    let (status, _) = t.send("POST", "/api/auth/refresh", Some(&refresh), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = t.send("GET", "/api/claims", None, None).await;
    assert_eq!(body["count"], 0);
  }

  // ── Claims ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn unauthenticated_create_claim_is_rejected() {
    let t = make_app().await;
    let (status, body) = t
      .send(
        "POST",
        "/api/claims",
        None,
        Some(json!({ "title": "T", "description": "D" })),
      )
      .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (_, body) = t.send("GET", "/api/claims", None, None).await;
    assert_eq!(body["count"], 0);
  }

  #[tokio::test]
  async fn create_claim_without_moderation_key() {
    let t = make_app().await;
    let alice = t.register("alice").await;

    let (status, body) = t
      .send(
        "POST",
        "/api/claims",
        Some(&alice.access),
        Some(json!({ "title": "Coffee", "description": "Coffee cures colds" })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Claim created successfully");
    assert_eq!(body["claim"]["category"], "general");
    assert_eq!(body["claim"]["status"], "pending");
    assert_eq!(body["claim"]["credibility_score"], 0);
    assert_eq!(body["claim"]["author_username"], "alice");
    assert!(body["claim"]["ai_moderation_score"].is_null());
    assert_eq!(body["moderation"]["moderated"], false);
    assert_eq!(body["moderation"]["reason"], "moderation API key not configured");

    let id = body["claim"]["id"].as_str().unwrap();
    let (status, body) = t.send("GET", &format!("/api/claims/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["claim"]["title"], "Coffee");
  }

  #[tokio::test]
  async fn create_claim_requires_title_and_description() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    let (status, body) = t
      .send("POST", "/api/claims", Some(&alice.access), Some(json!({ "title": "T" })))
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title and description are required");
  }

  #[tokio::test]
  async fn list_claims_filters_by_category() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    t.create_claim(&alice, "one").await;
    t.send(
      "POST",
      "/api/claims",
      Some(&alice.access),
      Some(json!({ "title": "two", "description": "d", "category": "science" })),
    )
    .await;

    let (_, body) = t.send("GET", "/api/claims", None, None).await;
    assert_eq!(body["count"], 2);
    // Newest first.
    assert_eq!(body["claims"][0]["title"], "two");

    let (_, body) = t.send("GET", "/api/claims?category=science", None, None).await;
    assert_eq!(body["count"], 1);

    let (_, body) = t.send("GET", "/api/claims?status=bogus", None, None).await;
    assert_eq!(body["count"], 0);

    let (_, body) = t.send("GET", "/api/claims?category=&status=", None, None).await;
    assert_eq!(body["count"], 2);
  }

  #[tokio::test]
  async fn bad_query_string_is_a_json_validation_error() {
    let t = make_app().await;
    let (status, body) =
      t.send("GET", "/api/claims?category=a&category=b", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("category"), "{body}");
  }

  #[tokio::test]
  async fn empty_category_falls_back_to_general() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    let (status, body) = t
      .send(
        "POST",
        "/api/claims",
        Some(&alice.access),
        Some(json!({ "title": "t", "description": "d", "category": "" })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["claim"]["category"], "general");
  }

  #[tokio::test]
  async fn only_the_author_may_update_or_delete_a_claim() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    let bob = t.register("bob").await;
    let id = t.create_claim(&alice, "original").await;
    let uri = format!("/api/claims/{id}");

    let (status, body) =
      t.send("PUT", &uri, Some(&bob.access), Some(json!({ "title": "hijacked" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not authorized to update this claim");

    let (status, _) = t.send("DELETE", &uri, Some(&bob.access), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = t
      .send(
        "PUT",
        &uri,
        Some(&alice.access),
        Some(json!({ "title": "edited", "description": "", "credibility_score": 99 })),
      )
      .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["claim"]["title"], "edited");
    assert_eq!(body["claim"]["description"], "Some description");
    assert_eq!(body["claim"]["credibility_score"], 0);

    let (status, _) = t.send("DELETE", &uri, Some(&alice.access), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = t.send("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Claim not found");
  }

  #[tokio::test]
  async fn deleting_a_claim_removes_its_children() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    let id = t.create_claim(&alice, "doomed").await;

    t.send(
      "POST",
      "/api/evidence",
      Some(&alice.access),
      Some(json!({ "claim_id": id, "content": "src", "type": "supporting" })),
    )
    .await;
    t.send(
      "POST",
      "/api/votes",
      Some(&alice.access),
      Some(json!({ "claim_id": id, "vote_type": "upvote" })),
    )
    .await;
    t.send(
      "POST",
      "/api/comments",
      Some(&alice.access),
      Some(json!({ "claim_id": id, "content": "hm" })),
    )
    .await;

    let (status, _) =
      t.send("DELETE", &format!("/api/claims/{id}"), Some(&alice.access), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = t.send("GET", &format!("/api/evidence/claim/{id}"), None, None).await;
    assert_eq!(body["count"], 0);
    let (_, body) = t.send("GET", &format!("/api/votes/claim/{id}"), None, None).await;
    assert_eq!(body["total_votes"], 0);
    let (_, body) = t.send("GET", &format!("/api/comments/claim/{id}"), None, None).await;
    assert_eq!(body["count"], 0);
  }

  #[tokio::test]
  async fn analysis_without_key_is_not_analyzed() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    let id = t.create_claim(&alice, "analyse me").await;

    let (status, body) =
      t.send("GET", &format!("/api/claims/{id}/analysis"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["claim_id"], id);
    assert_eq!(body["analysis"]["analyzed"], false);

    let missing = Uuid::new_v4();
    let (status, _) =
      t.send("GET", &format!("/api/claims/{missing}/analysis"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn malformed_input_is_a_validation_error() {
    let t = make_app().await;
    let alice = t.register("alice").await;

    let (status, body) = t.send("GET", "/api/claims/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid id");

    let req = Request::builder()
      .method("POST")
      .uri("/api/claims")
      .header(header::AUTHORIZATION, format!("Bearer {}", alice.access))
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{not json"))
      .unwrap();
    let resp = t.app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Evidence ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn user_cannot_delete_someone_elses_evidence() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    let bob = t.register("bob").await;
    let claim_id = t.create_claim(&alice, "claim").await;

    let (status, body) = t
      .send(
        "POST",
        "/api/evidence",
        Some(&bob.access),
        Some(json!({
          "claim_id":   claim_id,
          "content":    "A study",
          "type":       "refuting",
          "source_url": "https://example.com/study",
        })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["evidence"]["type"], "refuting");
    let evidence_id = body["evidence"]["id"].as_str().unwrap().to_owned();

    let (status, body) = t
      .send("DELETE", &format!("/api/evidence/{evidence_id}"), Some(&alice.access), None)
      .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not authorized to delete this evidence");

    let (_, body) =
      t.send("GET", &format!("/api/evidence/claim/{claim_id}"), None, None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["evidence"][0]["content"], "A study");

    let (status, _) = t
      .send("DELETE", &format!("/api/evidence/{evidence_id}"), Some(&bob.access), None)
      .await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn evidence_validation() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    let claim_id = t.create_claim(&alice, "claim").await;

    let (status, _) = t
      .send(
        "POST",
        "/api/evidence",
        Some(&alice.access),
        Some(json!({ "claim_id": claim_id, "content": "x", "type": "neutral" })),
      )
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = t
      .send(
        "POST",
        "/api/evidence",
        Some(&alice.access),
        Some(json!({ "claim_id": Uuid::new_v4(), "content": "x", "type": "supporting" })),
      )
      .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Claim not found");
  }

  // ── Votes ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn voting_updates_tally_and_claim_score() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    let bob = t.register("bob").await;
    let claim_id = t.create_claim(&alice, "claim").await;

    for who in [&alice, &bob] {
      let (status, body) = t
        .send(
          "POST",
          "/api/votes",
          Some(&who.access),
          Some(json!({ "claim_id": claim_id, "vote_type": "upvote" })),
        )
        .await;
      assert_eq!(status, StatusCode::OK);
      assert_eq!(body["message"], "Vote cast successfully");
    }

    // Bob changes his mind; still one row per user.
    t.send(
      "POST",
      "/api/votes",
      Some(&bob.access),
      Some(json!({ "claim_id": claim_id, "vote_type": "downvote" })),
    )
    .await;

    let (_, tally) = t.send("GET", &format!("/api/votes/claim/{claim_id}"), None, None).await;
    assert_eq!(
      tally,
      json!({ "upvotes": 1, "downvotes": 1, "total_votes": 2, "credibility_score": 0 })
    );

    let (status, _) = t
      .send("DELETE", "/api/votes", Some(&bob.access), Some(json!({ "claim_id": claim_id })))
      .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = t.send("GET", &format!("/api/claims/{claim_id}"), None, None).await;
    assert_eq!(body["claim"]["credibility_score"], 1);

    let (status, body) = t
      .send("DELETE", "/api/votes", Some(&bob.access), Some(json!({ "claim_id": claim_id })))
      .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No vote found to remove");
  }

  #[tokio::test]
  async fn vote_validation() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    let claim_id = t.create_claim(&alice, "claim").await;

    let (status, body) = t
      .send(
        "POST",
        "/api/votes",
        Some(&alice.access),
        Some(json!({ "claim_id": claim_id, "vote_type": "sideways" })),
      )
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Vote type must be upvote or downvote");

    let (status, _) = t
      .send(
        "POST",
        "/api/votes",
        Some(&alice.access),
        Some(json!({ "claim_id": Uuid::new_v4(), "vote_type": "upvote" })),
      )
      .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
      t.send("DELETE", "/api/votes", Some(&alice.access), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Comments ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn comments_are_threaded_and_owner_deletable() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    let bob = t.register("bob").await;
    let claim_id = t.create_claim(&alice, "claim").await;

    let (status, body) = t
      .send(
        "POST",
        "/api/comments",
        Some(&alice.access),
        Some(json!({ "claim_id": claim_id, "content": "root" })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);
    let root_id = body["comment"]["id"].as_str().unwrap().to_owned();

    let (status, _) = t
      .send(
        "POST",
        "/api/comments",
        Some(&bob.access),
        Some(json!({ "claim_id": claim_id, "content": "reply", "parent_comment_id": root_id })),
      )
      .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = t.send("GET", &format!("/api/comments/claim/{claim_id}"), None, None).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["comments"][0]["content"], "root");
    assert_eq!(body["comments"][0]["replies"][0]["content"], "reply");

    let (status, _) = t
      .send("DELETE", &format!("/api/comments/{root_id}"), Some(&bob.access), None)
      .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = t
      .send("DELETE", &format!("/api/comments/{root_id}"), Some(&alice.access), None)
      .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = t.send("GET", &format!("/api/comments/claim/{claim_id}"), None, None).await;
    assert_eq!(body["count"], 0);
  }

  #[tokio::test]
  async fn reply_must_stay_on_its_claim() {
    let t = make_app().await;
    let alice = t.register("alice").await;
    let first = t.create_claim(&alice, "first").await;
    let second = t.create_claim(&alice, "second").await;

    let (_, body) = t
      .send(
        "POST",
        "/api/comments",
        Some(&alice.access),
        Some(json!({ "claim_id": first, "content": "on first" })),
      )
      .await;
    let parent = body["comment"]["id"].as_str().unwrap().to_owned();

    let (status, body) = t
      .send(
        "POST",
        "/api/comments",
        Some(&alice.access),
        Some(json!({ "claim_id": second, "content": "stray", "parent_comment_id": parent })),
      )
      .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Parent comment belongs to a different claim");
  }
}
