//! Handlers for `/votes` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/votes` | Auth. Body: `{"claim_id","vote_type":"upvote"\|"downvote"}`; re-voting flips in place |
//! | `GET`    | `/votes/claim/{claim_id}` | Tally |
//! | `DELETE` | `/votes` | Auth. Body: `{"claim_id"}` |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  response::IntoResponse,
};
use credence_core::{store::CredenceStore, vote::VoteType};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CastBody {
  pub claim_id:  Option<Uuid>,
  pub vote_type: Option<String>,
}

/// `POST /votes`
pub async fn cast<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  body: Result<Json<CastBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Json(body) = body?;
  let (Some(claim_id), Some(vote_type)) = (body.claim_id, body.vote_type) else {
    return Err(ApiError::Validation("Claim ID and vote type are required".into()));
  };
  let vote_type: VoteType = vote_type.parse().map_err(|_| {
    ApiError::Validation("Vote type must be upvote or downvote".into())
  })?;

  let vote = state
    .store
    .cast_vote(claim_id, user.0, vote_type)
    .await
    .map_err(ApiError::from_store)?;
  tracing::debug!(%claim_id, user_id = %user.0, vote = vote_type.as_str(), "vote cast");

  Ok(Json(json!({ "message": "Vote cast successfully", "vote": vote })))
}

/// `GET /votes/claim/{claim_id}`
pub async fn tally<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Path(claim_id) = path?;
  let tally = state
    .store
    .vote_tally(claim_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(tally))
}

#[derive(Debug, Deserialize)]
pub struct RemoveBody {
  pub claim_id: Option<Uuid>,
}

/// `DELETE /votes`
pub async fn remove<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  body: Result<Json<RemoveBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Json(body) = body?;
  let Some(claim_id) = body.claim_id else {
    return Err(ApiError::Validation("Claim ID is required".into()));
  };

  state
    .store
    .remove_vote(claim_id, user.0)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound("No vote found to remove".into()))?;

  Ok(Json(json!({ "message": "Vote removed successfully" })))
}
