//! Password hashing, bearer-token extractors and the `/auth` handlers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: `{"username","email","password"}` |
//! | `POST` | `/auth/login`    | Body: `{"email","password"}` |
//! | `GET`  | `/auth/profile`  | Access token |
//! | `POST` | `/auth/refresh`  | Refresh token; returns a new access token |

use std::sync::LazyLock;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State, rejection::JsonRejection},
  http::{HeaderMap, StatusCode, header, request::Parts},
  response::IntoResponse,
};
use credence_core::{store::CredenceStore, user::NewUser};
use rand_core::OsRng;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
  AppState,
  error::ApiError,
  token::{TokenError, TokenIssuer, TokenKind},
};

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` with argon2id and a fresh random salt, as a PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// `true` if `password` matches the PHC string `hash`. A malformed hash never
/// matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Hash verified against when a login names an unknown email, so both
/// outcomes cost one argon2 verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(b"credence-dummy-password", &salt)
    .map(|hash| hash.to_string())
    .unwrap_or_default()
});

// ─── Extractors ──────────────────────────────────────────────────────────────

impl From<TokenError> for ApiError {
  fn from(e: TokenError) -> Self {
    match e {
      TokenError::Encode(e) => ApiError::Internal(e.to_string()),
      TokenError::Expired => ApiError::Unauthenticated("Token has expired".into()),
      TokenError::Invalid | TokenError::WrongKind { .. } => {
        ApiError::Unauthenticated("Invalid token".into())
      }
    }
  }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or_else(|| ApiError::Unauthenticated("Missing authorization token".into()))
}

/// A validly signed token whose user row is gone (e.g. after a database
/// reset) is rejected like any other invalid token.
async fn require_known_user<S>(state: &AppState<S>, user_id: Uuid) -> Result<(), ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let user = state
    .store
    .get_user(user_id)
    .await
    .map_err(ApiError::from_store)?;
  if user.is_none() {
    tracing::debug!(%user_id, "token for unknown user");
    return Err(ApiError::Unauthenticated("Invalid token".into()));
  }
  Ok(())
}

/// The caller, authenticated by an access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

impl AuthUser {
  /// Fail with 403 unless the caller is `owner`.
  pub fn require_owner(&self, owner: Uuid, message: &str) -> Result<(), ApiError> {
    if self.0 == owner {
      Ok(())
    } else {
      Err(ApiError::Forbidden(message.to_owned()))
    }
  }
}

impl<S> FromRequestParts<AppState<S>> for AuthUser
where
  S: CredenceStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;
    let user_id = state.tokens.verify(token, TokenKind::Access)?;
    require_known_user(state, user_id).await?;
    Ok(AuthUser(user_id))
  }
}

/// The caller, authenticated by a refresh token.
#[derive(Debug, Clone, Copy)]
pub struct RefreshUser(pub Uuid);

impl<S> FromRequestParts<AppState<S>> for RefreshUser
where
  S: CredenceStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)?;
    let user_id = state.tokens.verify(token, TokenKind::Refresh)?;
    require_known_user(state, user_id).await?;
    Ok(RefreshUser(user_id))
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

fn token_pair(tokens: &TokenIssuer, user_id: Uuid) -> Result<(String, String), ApiError> {
  Ok((tokens.issue_access(user_id)?, tokens.issue_refresh(user_id)?))
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: Option<String>,
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// `POST /auth/register`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Json(body) = body?;
  let (Some(username), Some(email), Some(password)) = (
    non_empty(body.username),
    non_empty(body.email),
    non_empty(body.password),
  ) else {
    return Err(ApiError::Validation(
      "Missing required fields: username, email, password".into(),
    ));
  };

  // Email is checked before username; the UNIQUE constraints catch races.
  let store = &state.store;
  if store
    .find_credentials_by_email(email.clone())
    .await
    .map_err(ApiError::from_store)?
    .is_some()
  {
    return Err(ApiError::Conflict("Email already registered".into()));
  }
  if store
    .find_user_by_username(username.clone())
    .await
    .map_err(ApiError::from_store)?
    .is_some()
  {
    return Err(ApiError::Conflict("Username already taken".into()));
  }

  let password_hash = hash_password(&password)?;
  let user = store
    .create_user(NewUser { username, email, password_hash })
    .await
    .map_err(ApiError::from_store)?;
  tracing::info!(user_id = %user.id, username = %user.username, "user registered");

  let (access_token, refresh_token) = token_pair(&state.tokens, user.id)?;
  Ok((
    StatusCode::CREATED,
    Json(json!({
      "message":       "User registered successfully",
      "access_token":  access_token,
      "refresh_token": refresh_token,
      "user":          user,
    })),
  ))
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let Json(body) = body?;
  let (Some(email), Some(password)) = (non_empty(body.email), body.password) else {
    return Err(ApiError::Validation("Email and password required".into()));
  };

  let found = state
    .store
    .find_credentials_by_email(email)
    .await
    .map_err(ApiError::from_store)?;
  let hash = found.as_ref().map_or(DUMMY_HASH.as_str(), |c| c.password_hash.as_str());
  let verified = verify_password(&password, hash);
  let creds = found
    .filter(|_| verified)
    .ok_or_else(|| ApiError::Unauthenticated("Invalid email or password".into()))?;

  let (access_token, refresh_token) = token_pair(&state.tokens, creds.user.id)?;
  tracing::debug!(user_id = %creds.user.id, "user logged in");
  Ok(Json(json!({
    "access_token":  access_token,
    "refresh_token": refresh_token,
    "user":          creds.user,
  })))
}

/// `GET /auth/profile`
pub async fn profile<S>(
  State(state): State<AppState<S>>,
  AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let user = state
    .store
    .get_user(user_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
  Ok(Json(json!({ "user": user })))
}

/// `POST /auth/refresh`
pub async fn refresh<S>(
  State(state): State<AppState<S>>,
  RefreshUser(user_id): RefreshUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: CredenceStore + Clone + 'static,
{
  let access_token = state.tokens.issue_access(user_id)?;
  Ok(Json(json!({ "access_token": access_token })))
}
