//! Votes and the per-claim tally.
//!
//! Each (claim, user) pair holds at most one vote. Re-voting changes
//! `vote_type` on the existing row; removing deletes it.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
  Upvote,
  Downvote,
}

impl VoteType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Upvote => "upvote",
      Self::Downvote => "downvote",
    }
  }
}

impl fmt::Display for VoteType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for VoteType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "upvote" => Ok(Self::Upvote),
      "downvote" => Ok(Self::Downvote),
      other => Err(Error::UnknownVoteType(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
  pub id:         Uuid,
  pub claim_id:   Uuid,
  pub user_id:    Uuid,
  pub vote_type:  VoteType,
  pub created_at: DateTime<Utc>,
}

/// Vote counts for one claim, computed from the vote rows themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteTally {
  pub upvotes:           u32,
  pub downvotes:         u32,
  pub total_votes:       u32,
  pub credibility_score: i64,
}

impl VoteTally {
  pub fn new(upvotes: u32, downvotes: u32) -> Self {
    Self {
      upvotes,
      downvotes,
      total_votes: upvotes + downvotes,
      credibility_score: i64::from(upvotes) - i64::from(downvotes),
    }
  }
}
