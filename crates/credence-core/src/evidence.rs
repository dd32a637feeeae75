//! Evidence: supporting or refuting material attached to a claim.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Whether a piece of evidence backs the claim or argues against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
  Supporting,
  Refuting,
}

impl EvidenceKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Supporting => "supporting",
      Self::Refuting => "refuting",
    }
  }
}

impl fmt::Display for EvidenceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for EvidenceKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "supporting" => Ok(Self::Supporting),
      "refuting" => Ok(Self::Refuting),
      other => Err(Error::UnknownEvidenceType(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
  pub id:              Uuid,
  pub claim_id:        Uuid,
  pub user_id:         Uuid,
  pub author_username: Option<String>,
  pub content:         String,
  #[serde(rename = "type")]
  pub kind:            EvidenceKind,
  pub source_url:      Option<String>,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`CredenceStore::add_evidence`](crate::store::CredenceStore::add_evidence).
#[derive(Debug, Clone)]
pub struct NewEvidence {
  pub claim_id:   Uuid,
  pub user_id:    Uuid,
  pub content:    String,
  pub kind:       EvidenceKind,
  pub source_url: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_serializes_under_type_key() {
    let ev = Evidence {
      id:              Uuid::nil(),
      claim_id:        Uuid::nil(),
      user_id:         Uuid::nil(),
      author_username: Some("alice".into()),
      content:         "NASA press release".into(),
      kind:            EvidenceKind::Refuting,
      source_url:      None,
      created_at:      Utc::now(),
    };
    let json = serde_json::to_value(&ev).unwrap();
    assert_eq!(json["type"], "refuting");
    assert!(json["source_url"].is_null());
  }

  #[test]
  fn unknown_kind_is_rejected() {
    assert!(matches!(
      "neutral".parse::<EvidenceKind>(),
      Err(Error::UnknownEvidenceType(_))
    ));
  }
}
