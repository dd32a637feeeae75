//! Claims: user-submitted factual assertions.
//!
//! A claim's `credibility_score` and `status` are derived state. Clients
//! never write them; they are recomputed from the vote set by the
//! credibility scorer (see [`crate::credibility`]).

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Category assigned when the author does not pick one.
pub const DEFAULT_CATEGORY: &str = "general";

// ─── Status ──────────────────────────────────────────────────────────────────

/// Derived classification of a claim.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
  #[default]
  Pending,
  Verified,
  Debunked,
}

impl ClaimStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Verified => "verified",
      Self::Debunked => "debunked",
    }
  }
}

impl fmt::Display for ClaimStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ClaimStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(Self::Pending),
      "verified" => Ok(Self::Verified),
      "debunked" => Ok(Self::Debunked),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// A claim as returned by the store, with denormalized author and counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
  pub id:                  Uuid,
  pub title:               String,
  pub description:         String,
  pub user_id:             Uuid,
  pub author_username:     Option<String>,
  pub credibility_score:   i64,
  pub status:              ClaimStatus,
  pub category:            String,
  pub ai_moderation_score: Option<f64>,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
  pub evidence_count:      u32,
  pub vote_count:          u32,
  pub comment_count:       u32,
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Input to [`CredenceStore::create_claim`](crate::store::CredenceStore::create_claim).
#[derive(Debug, Clone)]
pub struct NewClaim {
  pub title:               String,
  pub description:         String,
  pub user_id:             Uuid,
  pub category:            String,
  pub ai_moderation_score: Option<f64>,
}

impl NewClaim {
  /// A claim in the default category with no moderation score.
  pub fn new(
    user_id: Uuid,
    title: impl Into<String>,
    description: impl Into<String>,
  ) -> Self {
    Self {
      title: title.into(),
      description: description.into(),
      user_id,
      category: DEFAULT_CATEGORY.to_owned(),
      ai_moderation_score: None,
    }
  }
}

/// Author-editable fields of a claim. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ClaimPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub category:    Option<String>,
}

impl ClaimPatch {
  pub fn is_empty(&self) -> bool {
    self.title.is_none() && self.description.is_none() && self.category.is_none()
  }
}
