//! The `CredenceStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `credence-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  claim::{Claim, ClaimPatch, NewClaim},
  comment::{Comment, NewComment},
  credibility::Credibility,
  evidence::{Evidence, NewEvidence},
  query::ClaimQuery,
  user::{NewUser, User, UserCredentials},
  vote::{Vote, VoteTally, VoteType},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// A backend error that may carry a domain-level failure.
///
/// The API layer uses [`StoreError::domain`] to turn e.g. a missing claim
/// into a 404 instead of a 500.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn domain(&self) -> Option<&crate::Error>;
}

impl StoreError for crate::Error {
  fn domain(&self) -> Option<&crate::Error> { Some(self) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Credence store backend.
///
/// Every mutating method is atomic. Vote mutations recompute the claim's
/// credibility in the same transaction as the vote write.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CredenceStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Fails with [`crate::Error::EmailTaken`] or
  /// [`crate::Error::UsernameTaken`] when a unique field collides.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user and their password hash by email.
  fn find_credentials_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send + '_;

  fn find_user_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Claims ────────────────────────────────────────────────────────────

  /// Create a claim with score 0 and status `pending`.
  fn create_claim(
    &self,
    input: NewClaim,
  ) -> impl Future<Output = Result<Claim, Self::Error>> + Send + '_;

  fn get_claim(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Claim>, Self::Error>> + Send + '_;

  /// List claims matching `query`, ordered by `query.sort`.
  fn list_claims(
    &self,
    query: ClaimQuery,
  ) -> impl Future<Output = Result<Vec<Claim>, Self::Error>> + Send + '_;

  /// Apply `patch` and bump `updated_at`. Fails with
  /// [`crate::Error::ClaimNotFound`] if the claim does not exist.
  fn update_claim(
    &self,
    id: Uuid,
    patch: ClaimPatch,
  ) -> impl Future<Output = Result<Claim, Self::Error>> + Send + '_;

  /// Delete a claim together with its evidence, votes and comments.
  /// Returns `false` if no such claim existed.
  fn delete_claim(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Evidence ──────────────────────────────────────────────────────────

  /// Attach evidence to a claim. Fails with [`crate::Error::ClaimNotFound`]
  /// if the claim does not exist.
  fn add_evidence(
    &self,
    input: NewEvidence,
  ) -> impl Future<Output = Result<Evidence, Self::Error>> + Send + '_;

  fn get_evidence(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Evidence>, Self::Error>> + Send + '_;

  /// All evidence for a claim, oldest first. Empty for an unknown claim.
  fn list_evidence(
    &self,
    claim_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Evidence>, Self::Error>> + Send + '_;

  fn delete_evidence(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Insert or flip the caller's vote on a claim, then recompute the claim's
  /// credibility. Fails with [`crate::Error::ClaimNotFound`] if the claim
  /// does not exist.
  fn cast_vote(
    &self,
    claim_id: Uuid,
    user_id: Uuid,
    vote_type: VoteType,
  ) -> impl Future<Output = Result<Vote, Self::Error>> + Send + '_;

  /// Remove the caller's vote, then recompute the claim's credibility.
  /// Returns the removed vote, or `None` if there was nothing to remove.
  fn remove_vote(
    &self,
    claim_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Vote>, Self::Error>> + Send + '_;

  fn vote_tally(
    &self,
    claim_id: Uuid,
  ) -> impl Future<Output = Result<VoteTally, Self::Error>> + Send + '_;

  /// Recompute and persist a claim's score and status from its votes.
  /// Returns `None` (and does nothing) if the claim does not exist.
  fn recompute_credibility(
    &self,
    claim_id: Uuid,
  ) -> impl Future<Output = Result<Option<Credibility>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Add a comment or reply. The claim must exist, and a parent, if given,
  /// must exist on the same claim.
  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// Every comment on a claim as flat rows, oldest first.
  fn list_comments(
    &self,
    claim_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Delete a comment and, transitively, all of its replies.
  fn delete_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
