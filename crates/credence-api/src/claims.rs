//! Handlers for `/claims` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/claims` | Optional `?category=&status=&sort_by=newest\|credibility\|most_discussed` |
//! | `POST`   | `/claims` | Auth. Body: `{"title","description","category"?}` |
//! | `GET`    | `/claims/{id}` | 404 if not found |
//! | `PUT`    | `/claims/{id}` | Author only |
//! | `DELETE` | `/claims/{id}` | Author only; removes evidence, votes and comments |
//! | `GET`    | `/claims/{id}/analysis` | Fact-checking analysis of the description |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use credence_core::{
  claim::{Claim, ClaimPatch, DEFAULT_CATEGORY, NewClaim},
  query::ClaimQuery,
  store::CredenceStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, error::ApiError};

async fn load<S>(store: &S, id: Uuid) -> Result<Claim, ApiError>
where
  S: CredenceStore,
{
  store
    .get_claim(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound("Claim not found".into()))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub category: Option<String>,
  pub status:   Option<String>,
  pub sort_by:  Option<String>,
}

/// `GET /claims`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  query: Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Query(params) = query?;
  let query =
    ClaimQuery::from_params(params.category, params.status, params.sort_by.as_deref());
  let claims = state
    .store
    .list_claims(query)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "count": claims.len(), "claims": claims })))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub category:    Option<String>,
}

/// `POST /claims`
///
/// The description is run through moderation first. A moderation failure
/// never blocks creation; it only leaves `ai_moderation_score` empty.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Json(body) = body?;
  let title = body.title.filter(|t| !t.trim().is_empty());
  let description = body.description.filter(|d| !d.trim().is_empty());
  let (Some(title), Some(description)) = (title, description) else {
    return Err(ApiError::Validation("Title and description are required".into()));
  };

  let moderation = state.moderation.moderate(&description).await;

  let input = NewClaim {
    category: body
      .category
      .filter(|c| !c.is_empty())
      .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
    ai_moderation_score: moderation.score(),
    ..NewClaim::new(user.0, title, description)
  };
  let claim = state
    .store
    .create_claim(input)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(claim_id = %claim.id, user_id = %user.0, "claim created");

  Ok((
    StatusCode::CREATED,
    Json(json!({
      "message":    "Claim created successfully",
      "claim":      claim,
      "moderation": moderation,
    })),
  ))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /claims/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Path(id) = path?;
  let claim = load(state.store.as_ref(), id).await?;
  Ok(Json(json!({ "claim": claim })))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub category:    Option<String>,
}

impl From<UpdateBody> for ClaimPatch {
  /// Empty strings leave the field unchanged.
  fn from(body: UpdateBody) -> Self {
    let keep = |v: Option<String>| v.filter(|s| !s.is_empty());
    ClaimPatch {
      title:       keep(body.title),
      description: keep(body.description),
      category:    keep(body.category),
    }
  }
}

/// `PUT /claims/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  path: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<UpdateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Path(id) = path?;
  let Json(body) = body?;

  let existing = load(state.store.as_ref(), id).await?;
  user.require_owner(existing.user_id, "Not authorized to update this claim")?;

  let patch = ClaimPatch::from(body);
  let claim = if patch.is_empty() {
    existing
  } else {
    state
      .store
      .update_claim(id, patch)
      .await
      .map_err(ApiError::from_store)?
  };

  Ok(Json(json!({ "message": "Claim updated successfully", "claim": claim })))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /claims/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Path(id) = path?;
  let existing = load(state.store.as_ref(), id).await?;
  user.require_owner(existing.user_id, "Not authorized to delete this claim")?;

  state
    .store
    .delete_claim(id)
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(claim_id = %id, "claim deleted");

  Ok(Json(json!({ "message": "Claim deleted successfully" })))
}

// ─── Analysis ────────────────────────────────────────────────────────────────

/// `GET /claims/{id}/analysis`
pub async fn analysis<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Path(id) = path?;
  let claim = load(state.store.as_ref(), id).await?;
  let analysis = state.moderation.analyze(&claim.description).await;
  Ok(Json(json!({ "claim_id": claim.id, "analysis": analysis })))
}
