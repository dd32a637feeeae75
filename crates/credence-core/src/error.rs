//! Error types for `credence-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("claim not found: {0}")]
  ClaimNotFound(Uuid),

  #[error("evidence not found: {0}")]
  EvidenceNotFound(Uuid),

  #[error("comment not found: {0}")]
  CommentNotFound(Uuid),

  #[error("email already registered")]
  EmailTaken,

  #[error("username already taken")]
  UsernameTaken,

  #[error("parent comment {parent} belongs to a different claim")]
  ParentCommentMismatch { parent: Uuid },

  #[error("unknown claim status: {0:?}")]
  UnknownStatus(String),

  #[error("unknown evidence type: {0:?}")]
  UnknownEvidenceType(String),

  #[error("unknown vote type: {0:?}")]
  UnknownVoteType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
