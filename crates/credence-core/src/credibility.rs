//! The credibility scorer's rule: score and status from a vote tally.
//!
//! Persisting the result is the store's job; it applies [`Credibility::from_counts`]
//! inside the same transaction as the vote write.

use serde::{Deserialize, Serialize};

use crate::claim::ClaimStatus;

/// A score at or above this marks the claim verified.
pub const VERIFIED_THRESHOLD: i64 = 10;
/// A score at or below this marks the claim debunked.
pub const DEBUNKED_THRESHOLD: i64 = -5;

/// Derived credibility state of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credibility {
  pub score:  i64,
  pub status: ClaimStatus,
}

impl Credibility {
  pub fn from_counts(upvotes: u32, downvotes: u32) -> Self {
    Self::from_score(i64::from(upvotes) - i64::from(downvotes))
  }

  pub fn from_score(score: i64) -> Self {
    Self { score, status: status_for(score) }
  }
}

/// Both comparisons are inclusive.
pub fn status_for(score: i64) -> ClaimStatus {
  if score >= VERIFIED_THRESHOLD {
    ClaimStatus::Verified
  } else if score <= DEBUNKED_THRESHOLD {
    ClaimStatus::Debunked
  } else {
    ClaimStatus::Pending
  }
}
