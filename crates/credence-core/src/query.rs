//! Query type for listing claims.

use serde::{Deserialize, Serialize};

/// Ordering applied by [`CredenceStore::list_claims`](crate::store::CredenceStore::list_claims).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ClaimSort {
  /// Descending creation time.
  #[default]
  Newest,
  /// Descending credibility score.
  Credibility,
  /// Descending `updated_at`.
  ///
  /// This is a stand-in: the name promises ordering by comment count, but
  /// claims are ordered by last update instead.
  // TODO: order by comment_count once the listing query joins a per-claim
  // comment tally into the sort.
  MostDiscussed,
}

impl ClaimSort {
  /// Parse a `sort_by` query value. Unrecognised values fall back to
  /// [`ClaimSort::Newest`].
  pub fn from_param(value: Option<&str>) -> Self {
    match value {
      Some("credibility") => Self::Credibility,
      Some("most_discussed") => Self::MostDiscussed,
      _ => Self::Newest,
    }
  }
}

/// Parameters for listing claims. `None` filters are unrestricted.
#[derive(Debug, Clone, Default)]
pub struct ClaimQuery {
  /// Exact category match.
  pub category: Option<String>,
  /// Exact status match against the stored status string. A value that is
  /// not a known status simply matches nothing.
  pub status:   Option<String>,
  pub sort:     ClaimSort,
}

impl ClaimQuery {
  /// Build a query from raw request parameters; empty strings count as absent.
  pub fn from_params(
    category: Option<String>,
    status: Option<String>,
    sort_by: Option<&str>,
  ) -> Self {
    Self {
      category: category.filter(|c| !c.is_empty()),
      status:   status.filter(|s| !s.is_empty()),
      sort:     ClaimSort::from_param(sort_by),
    }
  }
}
