//! [`SqliteStore`], the SQLite implementation of [`CredenceStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use credence_core::{
  Error as CoreError,
  claim::{Claim, ClaimPatch, NewClaim},
  comment::{Comment, NewComment},
  credibility::Credibility,
  evidence::{Evidence, NewEvidence},
  query::{ClaimQuery, ClaimSort},
  store::CredenceStore,
  user::{NewUser, User, UserCredentials},
  vote::{Vote, VoteTally, VoteType},
};

use crate::{
  Result,
  encode::{
    CLAIM_SELECT, COMMENT_SELECT, EVIDENCE_SELECT, RawClaim, RawComment,
    RawEvidence, RawUser, RawVote, USER_COLUMNS, VOTE_SELECT, encode_dt,
    encode_uuid, now,
  },
  schema::SCHEMA,
};

/// Closure result for operations that can fail with a domain error after the
/// database call itself succeeded.
type Checked<T> = tokio_rusqlite::Result<std::result::Result<T, CoreError>>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Credence store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema initialised");
    Ok(())
  }

  /// Row count of `table`, for asserting cascade behaviour in tests.
  #[cfg(test)]
  pub(crate) async fn count_rows(&self, table: &'static str) -> Result<i64> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| {
            r.get(0)
          })?)
        })
        .await?,
    )
  }
}

// ─── CredenceStore impl ──────────────────────────────────────────────────────

impl CredenceStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      id:         Uuid::new_v4(),
      username:   input.username,
      email:      input.email,
      created_at: now(),
    };

    let id_str   = encode_uuid(user.id);
    let at_str   = encode_dt(user.created_at);
    let username = user.username.clone();
    let email    = user.email.clone();
    let hash     = input.password_hash;

    self
      .conn
      .call(move |conn| -> Checked<()> {
        let inserted = conn.execute(
          "INSERT INTO users (user_id, username, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, username, email, hash, at_str],
        );
        match inserted {
          Ok(_) => Ok(Ok(())),
          Err(e) => match taken_identity(&e) {
            Some(taken) => Ok(Err(taken)),
            None => Err(e.into()),
          },
        }
      })
      .await??;

    tracing::info!(user_id = %user.id, username = %user.username, "user created");
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_credentials_by_email(
    &self,
    email: String,
  ) -> Result<Option<UserCredentials>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = ?1"),
              rusqlite::params![email],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_credentials).transpose()
  }

  async fn find_user_by_username(&self, username: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1"),
              rusqlite::params![username],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Claims ────────────────────────────────────────────────────────────────

  async fn create_claim(&self, input: NewClaim) -> Result<Claim> {
    let id_str   = encode_uuid(Uuid::new_v4());
    let user_str = encode_uuid(input.user_id);
    let at_str   = encode_dt(now());

    let raw: RawClaim = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO claims (
             claim_id, title, description, user_id, category,
             ai_moderation_score, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![
            id_str,
            input.title,
            input.description,
            user_str,
            input.category,
            input.ai_moderation_score,
            at_str,
          ],
        )?;
        let raw = fetch_claim(&tx, &id_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    let claim = raw.into_claim()?;
    tracing::info!(claim_id = %claim.id, user_id = %claim.user_id, "claim created");
    Ok(claim)
  }

  async fn get_claim(&self, id: Uuid) -> Result<Option<Claim>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(fetch_claim(conn, &id_str)?))
      .await?;

    raw.map(RawClaim::into_claim).transpose()
  }

  async fn list_claims(&self, query: ClaimQuery) -> Result<Vec<Claim>> {
    let order = match query.sort {
      ClaimSort::Credibility => "c.credibility_score DESC, c.created_at DESC, c.rowid DESC",
      ClaimSort::MostDiscussed => "c.updated_at DESC, c.rowid DESC",
      ClaimSort::Newest => "c.created_at DESC, c.rowid DESC",
    };

    let raws: Vec<RawClaim> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "{CLAIM_SELECT}
           WHERE (?1 IS NULL OR c.category = ?1)
             AND (?2 IS NULL OR c.status = ?2)
           ORDER BY {order}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![query.category, query.status],
            RawClaim::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawClaim::into_claim).collect()
  }

  async fn update_claim(&self, id: Uuid, patch: ClaimPatch) -> Result<Claim> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let raw = self
      .conn
      .call(move |conn| -> Checked<RawClaim> {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE claims SET
             title       = COALESCE(?2, title),
             description = COALESCE(?3, description),
             category    = COALESCE(?4, category),
             updated_at  = ?5
           WHERE claim_id = ?1",
          rusqlite::params![
            id_str,
            patch.title,
            patch.description,
            patch.category,
            at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(Err(CoreError::ClaimNotFound(id)));
        }
        let raw = fetch_claim(&tx, &id_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await??;

    raw.into_claim()
  }

  async fn delete_claim(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM claims WHERE claim_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if deleted > 0 {
      tracing::info!(claim_id = %id, "claim deleted");
    }
    Ok(deleted > 0)
  }

  // ── Evidence ──────────────────────────────────────────────────────────────

  async fn add_evidence(&self, input: NewEvidence) -> Result<Evidence> {
    let id_str    = encode_uuid(Uuid::new_v4());
    let claim_str = encode_uuid(input.claim_id);
    let user_str  = encode_uuid(input.user_id);
    let kind_str  = input.kind.as_str();
    let at_str    = encode_dt(now());
    let claim_id  = input.claim_id;

    let raw = self
      .conn
      .call(move |conn| -> Checked<RawEvidence> {
        let tx = conn.transaction()?;
        if !claim_exists(&tx, &claim_str)? {
          return Ok(Err(CoreError::ClaimNotFound(claim_id)));
        }
        tx.execute(
          "INSERT INTO evidence (
             evidence_id, claim_id, user_id, content, kind, source_url, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            claim_str,
            user_str,
            input.content,
            kind_str,
            input.source_url,
            at_str,
          ],
        )?;
        let raw = tx.query_row(
          &format!("{EVIDENCE_SELECT} WHERE e.evidence_id = ?1"),
          rusqlite::params![id_str],
          RawEvidence::from_row,
        )?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await??;

    raw.into_evidence()
  }

  async fn get_evidence(&self, id: Uuid) -> Result<Option<Evidence>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEvidence> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{EVIDENCE_SELECT} WHERE e.evidence_id = ?1"),
              rusqlite::params![id_str],
              RawEvidence::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvidence::into_evidence).transpose()
  }

  async fn list_evidence(&self, claim_id: Uuid) -> Result<Vec<Evidence>> {
    let claim_str = encode_uuid(claim_id);

    let raws: Vec<RawEvidence> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{EVIDENCE_SELECT} WHERE e.claim_id = ?1 ORDER BY e.created_at, e.rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![claim_str], RawEvidence::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvidence::into_evidence).collect()
  }

  async fn delete_evidence(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM evidence WHERE evidence_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn cast_vote(
    &self,
    claim_id:  Uuid,
    user_id:   Uuid,
    vote_type: VoteType,
  ) -> Result<Vote> {
    let vote_str  = encode_uuid(Uuid::new_v4());
    let claim_str = encode_uuid(claim_id);
    let user_str  = encode_uuid(user_id);
    let type_str  = vote_type.as_str();
    let at_str    = encode_dt(now());

    let (raw, credibility) = self
      .conn
      .call(move |conn| -> Checked<(RawVote, Option<Credibility>)> {
        let tx = conn.transaction()?;
        if !claim_exists(&tx, &claim_str)? {
          return Ok(Err(CoreError::ClaimNotFound(claim_id)));
        }
        // An existing (claim, user) row keeps its id and created_at.
        tx.execute(
          "INSERT INTO votes (vote_id, claim_id, user_id, vote_type, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT (claim_id, user_id) DO UPDATE SET vote_type = excluded.vote_type",
          rusqlite::params![vote_str, claim_str, user_str, type_str, at_str],
        )?;
        let credibility = recompute(&tx, &claim_str, &at_str)?;
        let raw = tx.query_row(
          &format!("{VOTE_SELECT} WHERE claim_id = ?1 AND user_id = ?2"),
          rusqlite::params![claim_str, user_str],
          RawVote::from_row,
        )?;
        tx.commit()?;
        Ok(Ok((raw, credibility)))
      })
      .await??;

    if let Some(c) = credibility {
      tracing::debug!(
        claim_id = %claim_id, score = c.score, status = %c.status,
        "credibility recomputed after vote"
      );
    }
    raw.into_vote()
  }

  async fn remove_vote(&self, claim_id: Uuid, user_id: Uuid) -> Result<Option<Vote>> {
    let claim_str = encode_uuid(claim_id);
    let user_str  = encode_uuid(user_id);
    let at_str    = encode_dt(now());

    let raw: Option<RawVote> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(raw) = tx
          .query_row(
            &format!("{VOTE_SELECT} WHERE claim_id = ?1 AND user_id = ?2"),
            rusqlite::params![claim_str, user_str],
            RawVote::from_row,
          )
          .optional()?
        else {
          return Ok(None);
        };
        tx.execute(
          "DELETE FROM votes WHERE vote_id = ?1",
          rusqlite::params![raw.vote_id],
        )?;
        recompute(&tx, &claim_str, &at_str)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawVote::into_vote).transpose()
  }

  async fn vote_tally(&self, claim_id: Uuid) -> Result<VoteTally> {
    let claim_str = encode_uuid(claim_id);

    let (up, down) = self
      .conn
      .call(move |conn| Ok(count_votes(conn, &claim_str)?))
      .await?;

    Ok(VoteTally::new(up, down))
  }

  async fn recompute_credibility(&self, claim_id: Uuid) -> Result<Option<Credibility>> {
    let claim_str = encode_uuid(claim_id);
    let at_str    = encode_dt(now());

    Ok(
      self
        .conn
        .call(move |conn| {
          let tx = conn.transaction()?;
          let credibility = recompute(&tx, &claim_str, &at_str)?;
          tx.commit()?;
          Ok(credibility)
        })
        .await?,
    )
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let id_str     = encode_uuid(Uuid::new_v4());
    let claim_str  = encode_uuid(input.claim_id);
    let user_str   = encode_uuid(input.user_id);
    let parent_str = input.parent_comment_id.map(encode_uuid);
    let at_str     = encode_dt(now());
    let claim_id   = input.claim_id;
    let parent_id  = input.parent_comment_id;

    let raw = self
      .conn
      .call(move |conn| -> Checked<RawComment> {
        let tx = conn.transaction()?;
        if !claim_exists(&tx, &claim_str)? {
          return Ok(Err(CoreError::ClaimNotFound(claim_id)));
        }
        if let (Some(parent), Some(parent_str)) = (parent_id, parent_str.as_deref()) {
          let parent_claim: Option<String> = tx
            .query_row(
              "SELECT claim_id FROM comments WHERE comment_id = ?1",
              rusqlite::params![parent_str],
              |r| r.get(0),
            )
            .optional()?;
          match parent_claim {
            None => return Ok(Err(CoreError::CommentNotFound(parent))),
            Some(c) if c != claim_str => {
              return Ok(Err(CoreError::ParentCommentMismatch { parent }));
            }
            Some(_) => {}
          }
        }
        tx.execute(
          "INSERT INTO comments (
             comment_id, claim_id, user_id, content, parent_comment_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            claim_str,
            user_str,
            input.content,
            parent_str,
            at_str,
          ],
        )?;
        let raw = tx.query_row(
          &format!("{COMMENT_SELECT} WHERE m.comment_id = ?1"),
          rusqlite::params![id_str],
          RawComment::from_row,
        )?;
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await??;

    raw.into_comment()
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{COMMENT_SELECT} WHERE m.comment_id = ?1"),
              rusqlite::params![id_str],
              RawComment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn list_comments(&self, claim_id: Uuid) -> Result<Vec<Comment>> {
    let claim_str = encode_uuid(claim_id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "{COMMENT_SELECT} WHERE m.claim_id = ?1 ORDER BY m.created_at, m.rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![claim_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn delete_comment(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    // Deletes the comment and every transitive reply in one statement.
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "WITH RECURSIVE thread(comment_id) AS (
             SELECT ?1
             UNION ALL
             SELECT c.comment_id FROM comments c
             JOIN thread t ON c.parent_comment_id = t.comment_id
           )
           DELETE FROM comments WHERE comment_id IN (SELECT comment_id FROM thread)",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }
}

// ─── SQL helpers ─────────────────────────────────────────────────────────────

fn fetch_claim(
  conn: &rusqlite::Connection,
  claim_id: &str,
) -> rusqlite::Result<Option<RawClaim>> {
  conn
    .query_row(
      &format!("{CLAIM_SELECT} WHERE c.claim_id = ?1"),
      rusqlite::params![claim_id],
      RawClaim::from_row,
    )
    .optional()
}

fn claim_exists(conn: &rusqlite::Connection, claim_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM claims WHERE claim_id = ?1",
        rusqlite::params![claim_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn count_votes(conn: &rusqlite::Connection, claim_id: &str) -> rusqlite::Result<(u32, u32)> {
  conn.query_row(
    "SELECT
       COALESCE(SUM(vote_type = 'upvote'), 0),
       COALESCE(SUM(vote_type = 'downvote'), 0)
     FROM votes WHERE claim_id = ?1",
    rusqlite::params![claim_id],
    |r| Ok((r.get(0)?, r.get(1)?)),
  )
}

/// Recompute a claim's score and status from its current votes and persist
/// them. `updated_at` moves only when a derived value actually changes.
/// Returns `None` if the claim does not exist.
fn recompute(
  conn: &rusqlite::Connection,
  claim_id: &str,
  now: &str,
) -> rusqlite::Result<Option<Credibility>> {
  if !claim_exists(conn, claim_id)? {
    return Ok(None);
  }
  let (up, down) = count_votes(conn, claim_id)?;
  let credibility = Credibility::from_counts(up, down);
  conn.execute(
    "UPDATE claims
        SET credibility_score = ?2, status = ?3, updated_at = ?4
      WHERE claim_id = ?1
        AND (credibility_score != ?2 OR status != ?3)",
    rusqlite::params![claim_id, credibility.score, credibility.status.as_str(), now],
  )?;
  Ok(Some(credibility))
}

/// Map a UNIQUE violation on `users` to the matching domain error.
fn taken_identity(err: &rusqlite::Error) -> Option<CoreError> {
  let rusqlite::Error::SqliteFailure(e, Some(msg)) = err else {
    return None;
  };
  if e.code != rusqlite::ErrorCode::ConstraintViolation {
    return None;
  }
  if msg.contains("users.email") {
    Some(CoreError::EmailTaken)
  } else if msg.contains("users.username") {
    Some(CoreError::UsernameTaken)
  } else {
    None
  }
}
