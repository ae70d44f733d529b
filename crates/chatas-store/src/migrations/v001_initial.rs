//! v001 -- Initial schema creation.
//!
//! Creates the three core tables: `users`, `conversations` and `messages`.

use rusqlite::Connection;

const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    email         TEXT NOT NULL UNIQUE,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,              -- Argon2id PHC string
    profile_image TEXT NOT NULL,
    created_at    TEXT NOT NULL               -- RFC-3339
);

-- ----------------------------------------------------------------
-- Conversations
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS conversations (
    id               TEXT PRIMARY KEY NOT NULL,  -- UUID v4
    participant_a    TEXT NOT NULL,              -- as requested
    participant_b    TEXT NOT NULL,
    participant_low  TEXT NOT NULL,              -- sorted pair, for uniqueness
    participant_high TEXT NOT NULL,
    created_at       TEXT NOT NULL,

    CHECK (participant_low < participant_high)
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_conversations_pair
    ON conversations(participant_low, participant_high);
CREATE INDEX IF NOT EXISTS idx_conversations_high
    ON conversations(participant_high);

-- ----------------------------------------------------------------
-- Messages
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    seq             INTEGER PRIMARY KEY AUTOINCREMENT,  -- send order
    id              TEXT NOT NULL UNIQUE,               -- UUID v4
    conversation_id TEXT NOT NULL,
    sender_id       TEXT NOT NULL,
    content         TEXT NOT NULL,
    sent_at         TEXT NOT NULL,
    is_read         INTEGER NOT NULL DEFAULT 0,         -- boolean 0/1
    liked           INTEGER NOT NULL DEFAULT 0,         -- boolean 0/1

    FOREIGN KEY (conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation
    ON messages(conversation_id, seq);
CREATE INDEX IF NOT EXISTS idx_messages_unread
    ON messages(conversation_id, is_read, sender_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
