//! SQL schema for the Credence SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,     -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- credibility_score and status are derived from votes; only the
-- scorer writes them.
CREATE TABLE IF NOT EXISTS claims (
    claim_id            TEXT PRIMARY KEY,
    title               TEXT NOT NULL,
    description         TEXT NOT NULL,
    user_id             TEXT NOT NULL REFERENCES users(user_id),
    credibility_score   INTEGER NOT NULL DEFAULT 0,
    status              TEXT NOT NULL DEFAULT 'pending'
                        CHECK (status IN ('pending', 'verified', 'debunked')),
    category            TEXT NOT NULL DEFAULT 'general',
    ai_moderation_score REAL,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS evidence (
    evidence_id TEXT PRIMARY KEY,
    claim_id    TEXT NOT NULL REFERENCES claims(claim_id) ON DELETE CASCADE,
    user_id     TEXT NOT NULL REFERENCES users(user_id),
    content     TEXT NOT NULL,
    kind        TEXT NOT NULL CHECK (kind IN ('supporting', 'refuting')),
    source_url  TEXT,
    created_at  TEXT NOT NULL
);

-- One vote per (claim, user); re-voting updates vote_type in place.
CREATE TABLE IF NOT EXISTS votes (
    vote_id    TEXT PRIMARY KEY,
    claim_id   TEXT NOT NULL REFERENCES claims(claim_id) ON DELETE CASCADE,
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    vote_type  TEXT NOT NULL CHECK (vote_type IN ('upvote', 'downvote')),
    created_at TEXT NOT NULL,
    UNIQUE (claim_id, user_id)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id        TEXT PRIMARY KEY,
    claim_id          TEXT NOT NULL REFERENCES claims(claim_id) ON DELETE CASCADE,
    user_id           TEXT NOT NULL REFERENCES users(user_id),
    content           TEXT NOT NULL,
    parent_comment_id TEXT REFERENCES comments(comment_id) ON DELETE CASCADE,
    created_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS claims_category_idx  ON claims(category);
CREATE INDEX IF NOT EXISTS claims_status_idx    ON claims(status);
CREATE INDEX IF NOT EXISTS evidence_claim_idx   ON evidence(claim_id);
CREATE INDEX IF NOT EXISTS votes_claim_idx      ON votes(claim_id);
CREATE INDEX IF NOT EXISTS comments_claim_idx   ON comments(claim_id);
CREATE INDEX IF NOT EXISTS comments_parent_idx  ON comments(parent_comment_id);

PRAGMA user_version = 1;
";
