//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix, so lexical order in SQL equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings. Enums are stored as
//! their lowercase wire names.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use credence_core::{
  claim::Claim,
  comment::Comment,
  evidence::Evidence,
  user::{User, UserCredentials},
  vote::Vote,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at storage precision, so values handed back to callers
/// compare equal to what a later read returns.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns selected for a user, in order. Prefix with `u.`.
pub const USER_COLUMNS: &str =
  "u.user_id, u.username, u.email, u.created_at, u.password_hash";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub email:         String,
  pub created_at:    String,
  pub password_hash: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      username:      row.get(1)?,
      email:         row.get(2)?,
      created_at:    row.get(3)?,
      password_hash: row.get(4)?,
    })
  }

  pub fn into_credentials(self) -> Result<UserCredentials> {
    Ok(UserCredentials {
      user:          User {
        id:         decode_uuid(&self.user_id)?,
        username:   self.username,
        email:      self.email,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }

  pub fn into_user(self) -> Result<User> {
    self.into_credentials().map(|c| c.user)
  }
}

/// Claim read model: the row, its author's username and child counts.
pub const CLAIM_SELECT: &str = "
  SELECT
    c.claim_id, c.title, c.description, c.user_id, u.username,
    c.credibility_score, c.status, c.category, c.ai_moderation_score,
    c.created_at, c.updated_at,
    (SELECT COUNT(*) FROM evidence e WHERE e.claim_id = c.claim_id),
    (SELECT COUNT(*) FROM votes    v WHERE v.claim_id = c.claim_id),
    (SELECT COUNT(*) FROM comments m WHERE m.claim_id = c.claim_id)
  FROM claims c
  LEFT JOIN users u ON u.user_id = c.user_id";

/// Raw values read from [`CLAIM_SELECT`].
pub struct RawClaim {
  pub claim_id:            String,
  pub title:               String,
  pub description:         String,
  pub user_id:             String,
  pub author_username:     Option<String>,
  pub credibility_score:   i64,
  pub status:              String,
  pub category:            String,
  pub ai_moderation_score: Option<f64>,
  pub created_at:          String,
  pub updated_at:          String,
  pub evidence_count:      u32,
  pub vote_count:          u32,
  pub comment_count:       u32,
}

impl RawClaim {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      claim_id:            row.get(0)?,
      title:               row.get(1)?,
      description:         row.get(2)?,
      user_id:             row.get(3)?,
      author_username:     row.get(4)?,
      credibility_score:   row.get(5)?,
      status:              row.get(6)?,
      category:            row.get(7)?,
      ai_moderation_score: row.get(8)?,
      created_at:          row.get(9)?,
      updated_at:          row.get(10)?,
      evidence_count:      row.get(11)?,
      vote_count:          row.get(12)?,
      comment_count:       row.get(13)?,
    })
  }

  pub fn into_claim(self) -> Result<Claim> {
    Ok(Claim {
      id:                  decode_uuid(&self.claim_id)?,
      title:               self.title,
      description:         self.description,
      user_id:             decode_uuid(&self.user_id)?,
      author_username:     self.author_username,
      credibility_score:   self.credibility_score,
      status:              self.status.parse()?,
      category:            self.category,
      ai_moderation_score: self.ai_moderation_score,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
      evidence_count:      self.evidence_count,
      vote_count:          self.vote_count,
      comment_count:       self.comment_count,
    })
  }
}

pub const EVIDENCE_SELECT: &str = "
  SELECT
    e.evidence_id, e.claim_id, e.user_id, u.username,
    e.content, e.kind, e.source_url, e.created_at
  FROM evidence e
  LEFT JOIN users u ON u.user_id = e.user_id";

/// Raw strings read from [`EVIDENCE_SELECT`].
pub struct RawEvidence {
  pub evidence_id:     String,
  pub claim_id:        String,
  pub user_id:         String,
  pub author_username: Option<String>,
  pub content:         String,
  pub kind:            String,
  pub source_url:      Option<String>,
  pub created_at:      String,
}

impl RawEvidence {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      evidence_id:     row.get(0)?,
      claim_id:        row.get(1)?,
      user_id:         row.get(2)?,
      author_username: row.get(3)?,
      content:         row.get(4)?,
      kind:            row.get(5)?,
      source_url:      row.get(6)?,
      created_at:      row.get(7)?,
    })
  }

  pub fn into_evidence(self) -> Result<Evidence> {
    Ok(Evidence {
      id:              decode_uuid(&self.evidence_id)?,
      claim_id:        decode_uuid(&self.claim_id)?,
      user_id:         decode_uuid(&self.user_id)?,
      author_username: self.author_username,
      content:         self.content,
      kind:            self.kind.parse()?,
      source_url:      self.source_url,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

pub const VOTE_SELECT: &str =
  "SELECT vote_id, claim_id, user_id, vote_type, created_at FROM votes";

/// Raw strings read from [`VOTE_SELECT`].
pub struct RawVote {
  pub vote_id:    String,
  pub claim_id:   String,
  pub user_id:    String,
  pub vote_type:  String,
  pub created_at: String,
}

impl RawVote {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      vote_id:    row.get(0)?,
      claim_id:   row.get(1)?,
      user_id:    row.get(2)?,
      vote_type:  row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      id:         decode_uuid(&self.vote_id)?,
      claim_id:   decode_uuid(&self.claim_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      vote_type:  self.vote_type.parse()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const COMMENT_SELECT: &str = "
  SELECT
    m.comment_id, m.claim_id, m.user_id, u.username,
    m.content, m.parent_comment_id, m.created_at
  FROM comments m
  LEFT JOIN users u ON u.user_id = m.user_id";

/// Raw strings read from [`COMMENT_SELECT`].
pub struct RawComment {
  pub comment_id:        String,
  pub claim_id:          String,
  pub user_id:           String,
  pub author_username:   Option<String>,
  pub content:           String,
  pub parent_comment_id: Option<String>,
  pub created_at:        String,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id:        row.get(0)?,
      claim_id:          row.get(1)?,
      user_id:           row.get(2)?,
      author_username:   row.get(3)?,
      content:           row.get(4)?,
      parent_comment_id: row.get(5)?,
      created_at:        row.get(6)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:                decode_uuid(&self.comment_id)?,
      claim_id:          decode_uuid(&self.claim_id)?,
      user_id:           decode_uuid(&self.user_id)?,
      author_username:   self.author_username,
      content:           self.content,
      parent_comment_id: self
        .parent_comment_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}
