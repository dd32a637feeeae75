//! Handlers for `/comments` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/comments` | Auth. Body: `{"claim_id","content","parent_comment_id"?}` |
//! | `GET`    | `/comments/claim/{claim_id}` | Threaded; `count` covers replies too |
//! | `DELETE` | `/comments/{id}` | Author only; replies go with it |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use credence_core::{
  comment::{NewComment, build_threads},
  store::CredenceStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub claim_id:          Option<Uuid>,
  pub content:           Option<String>,
  pub parent_comment_id: Option<Uuid>,
}

/// `POST /comments`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Json(body) = body?;
  let content = body.content.filter(|c| !c.trim().is_empty());
  let (Some(claim_id), Some(content)) = (body.claim_id, content) else {
    return Err(ApiError::Validation("Claim ID and content are required".into()));
  };

  let comment = state
    .store
    .add_comment(NewComment {
      claim_id,
      user_id: user.0,
      content,
      parent_comment_id: body.parent_comment_id,
    })
    .await
    .map_err(ApiError::from_store)?;

  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Comment added successfully", "comment": comment })),
  ))
}

/// `GET /comments/claim/{claim_id}`
pub async fn list_for_claim<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Path(claim_id) = path?;
  let rows = state
    .store
    .list_comments(claim_id)
    .await
    .map_err(ApiError::from_store)?;
  let count = rows.len();
  Ok(Json(json!({ "count": count, "comments": build_threads(rows) })))
}

/// `DELETE /comments/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Path(id) = path?;
  let comment = state
    .store
    .get_comment(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound("Comment not found".into()))?;
  user.require_owner(comment.user_id, "Not authorized to delete this comment")?;

  state
    .store
    .delete_comment(id)
    .await
    .map_err(ApiError::from_store)?;

  Ok(Json(json!({ "message": "Comment deleted successfully" })))
}
