//! Threaded comments on a claim.
//!
//! Comments form an adjacency list through `parent_comment_id`. The store
//! returns a claim's comments as flat rows; [`build_threads`] assembles the
//! forest in memory by grouping children under their parent id.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub id:                Uuid,
  pub claim_id:          Uuid,
  pub user_id:           Uuid,
  pub author_username:   Option<String>,
  pub content:           String,
  pub parent_comment_id: Option<Uuid>,
  pub created_at:        DateTime<Utc>,
}

/// Input to [`CredenceStore::add_comment`](crate::store::CredenceStore::add_comment).
#[derive(Debug, Clone)]
pub struct NewComment {
  pub claim_id:          Uuid,
  pub user_id:           Uuid,
  pub content:           String,
  pub parent_comment_id: Option<Uuid>,
}

/// A comment with its replies nested beneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentThread {
  #[serde(flatten)]
  pub comment: Comment,
  pub replies: Vec<CommentThread>,
}

impl CommentThread {
  /// Number of comments in this thread, the root included.
  pub fn len(&self) -> usize {
    1 + self.replies.iter().map(CommentThread::len).sum::<usize>()
  }
}

/// Assemble flat comment rows into a forest.
///
/// Roots are comments without a parent, plus any comment whose parent is not
/// among `comments`. Siblings are ordered oldest first.
pub fn build_threads(comments: Vec<Comment>) -> Vec<CommentThread> {
  let ids: std::collections::HashSet<Uuid> =
    comments.iter().map(|c| c.id).collect();

  let mut roots = Vec::new();
  let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
  for c in comments {
    match c.parent_comment_id {
      Some(parent) if ids.contains(&parent) => {
        children.entry(parent).or_default().push(c);
      }
      _ => roots.push(c),
    }
  }

  let mut forest: Vec<CommentThread> = roots
    .into_iter()
    .map(|c| attach(c, &mut children))
    .collect();
  sort_threads(&mut forest);
  forest
}

fn attach(
  comment: Comment,
  children: &mut HashMap<Uuid, Vec<Comment>>,
) -> CommentThread {
  let replies = children
    .remove(&comment.id)
    .unwrap_or_default()
    .into_iter()
    .map(|c| attach(c, children))
    .collect();
  CommentThread { comment, replies }
}

fn sort_threads(threads: &mut [CommentThread]) {
  threads.sort_by_key(|t| t.comment.created_at);
  for t in threads {
    sort_threads(&mut t.replies);
  }
}
