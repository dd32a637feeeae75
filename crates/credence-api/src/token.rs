//! Signed bearer tokens.
//!
//! Access and refresh tokens are HS256 JWTs that differ only in their `kind`
//! claim and lifetime. A token of one kind is never accepted where the other
//! is expected.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
  errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default access-token lifetime (15 minutes).
pub const DEFAULT_ACCESS_TTL_SECS: u64 = 15 * 60;

/// Default refresh-token lifetime (30 days).
pub const DEFAULT_REFRESH_TTL_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
  #[error("failed to encode token: {0}")]
  Encode(#[from] jsonwebtoken::errors::Error),

  #[error("token expired")]
  Expired,

  #[error("invalid token")]
  Invalid,

  #[error("expected {expected:?} token")]
  WrongKind { expected: TokenKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
  Access,
  Refresh,
}

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
  /// User id.
  pub sub:  Uuid,
  pub kind: TokenKind,
  pub iat:  i64,
  pub exp:  i64,
}

/// Issues and verifies tokens with a single shared secret.
pub struct TokenIssuer {
  encoding:    EncodingKey,
  decoding:    DecodingKey,
  validation:  Validation,
  access_ttl:  Duration,
  refresh_ttl: Duration,
}

impl TokenIssuer {
  pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation: Validation::new(Algorithm::HS256),
      access_ttl,
      refresh_ttl,
    }
  }

  pub fn issue_access(&self, user_id: Uuid) -> Result<String, TokenError> {
    self.issue(user_id, TokenKind::Access, self.access_ttl)
  }

  pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, TokenError> {
    self.issue(user_id, TokenKind::Refresh, self.refresh_ttl)
  }

  fn issue(
    &self,
    user_id: Uuid,
    kind: TokenKind,
    ttl: Duration,
  ) -> Result<String, TokenError> {
    let iat = Utc::now().timestamp();
    let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    let claims = TokenClaims {
      sub: user_id,
      kind,
      iat,
      exp: iat.saturating_add(ttl),
    };
    Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
  }

  /// Check the signature, expiry and kind of `token`, returning its user id.
  pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Uuid, TokenError> {
    let data = decode::<TokenClaims>(token, &self.decoding, &self.validation)
      .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
      })?;

    if data.claims.kind != expected {
      return Err(TokenError::WrongKind { expected });
    }
    Ok(data.claims.sub)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn issuer() -> TokenIssuer {
    TokenIssuer::new(
      "test-secret",
      Duration::from_secs(DEFAULT_ACCESS_TTL_SECS),
      Duration::from_secs(DEFAULT_REFRESH_TTL_SECS),
    )
  }

  #[test]
  fn access_token_round_trips_user_id() {
    let tokens = issuer();
    let user = Uuid::new_v4();
    let token = tokens.issue_access(user).unwrap();
    assert_eq!(tokens.verify(&token, TokenKind::Access).unwrap(), user);
  }

  #[test]
  fn kinds_are_not_interchangeable() {
    let tokens = issuer();
    let user = Uuid::new_v4();

    let refresh = tokens.issue_refresh(user).unwrap();
    assert!(matches!(
      tokens.verify(&refresh, TokenKind::Access),
      Err(TokenError::WrongKind { expected: TokenKind::Access })
    ));

    let access = tokens.issue_access(user).unwrap();
    assert!(tokens.verify(&access, TokenKind::Refresh).is_err());
  }

  #[test]
  fn expired_token_is_rejected() {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
      sub:  Uuid::new_v4(),
      kind: TokenKind::Access,
      iat:  now - 7200,
      exp:  now - 3600,
    };
    let token = encode(
      &Header::new(Algorithm::HS256),
      &claims,
      &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap();

    assert!(matches!(
      issuer().verify(&token, TokenKind::Access),
      Err(TokenError::Expired)
    ));
  }

  #[test]
  fn foreign_signature_is_rejected() {
    let other = TokenIssuer::new(
      "another-secret",
      Duration::from_secs(60),
      Duration::from_secs(60),
    );
    let token = other.issue_access(Uuid::new_v4()).unwrap();
    assert!(matches!(
      issuer().verify(&token, TokenKind::Access),
      Err(TokenError::Invalid)
    ));
  }

  #[test]
  fn garbage_is_rejected() {
    assert!(matches!(
      issuer().verify("not.a.jwt", TokenKind::Access),
      Err(TokenError::Invalid)
    ));
  }
}
