//! Handlers for `/evidence` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/evidence` | Auth. Body: `{"claim_id","content","type","source_url"?}` |
//! | `GET`    | `/evidence/claim/{claim_id}` | Oldest first |
//! | `DELETE` | `/evidence/{id}` | Author only |

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
  evidence::{EvidenceKind, NewEvidence},
  store::CredenceStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::AuthUser, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub claim_id:   Option<Uuid>,
  pub content:    Option<String>,
  #[serde(rename = "type")]
  pub kind:       Option<String>,
  pub source_url: Option<String>,
}

/// `POST /evidence`
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
  let (Some(claim_id), Some(content), Some(kind)) = (body.claim_id, content, body.kind)
  else {
    return Err(ApiError::Validation(
      "Claim ID, content, and type are required".into(),
    ));
  };
  let kind: EvidenceKind = kind.parse().map_err(|_| {
    ApiError::Validation("Evidence type must be supporting or refuting".into())
  })?;

  let evidence = state
    .store
    .add_evidence(NewEvidence {
      claim_id,
      user_id: user.0,
      content,
      kind,
      source_url: body.source_url.filter(|u| !u.is_empty()),
    })
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(evidence_id = %evidence.id, %claim_id, "evidence added");

  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Evidence added successfully", "evidence": evidence })),
  ))
}

/// `GET /evidence/claim/{claim_id}`
pub async fn list_for_claim<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Path(claim_id) = path?;
  let evidence = state
    .store
    .list_evidence(claim_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(json!({ "count": evidence.len(), "evidence": evidence })))
}

/// `DELETE /evidence/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  user: AuthUser,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Path(id) = path?;
  let evidence = state
    .store
    .get_evidence(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound("Evidence not found".into()))?;
  user.require_owner(evidence.user_id, "Not authorized to delete this evidence")?;

  state
    .store
    .delete_evidence(id)
    .await
    .map_err(ApiError::from_store)?;

  Ok(Json(json!({ "message": "Evidence deleted successfully" })))
}
