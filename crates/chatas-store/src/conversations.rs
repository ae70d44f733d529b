//! Conversation store: two-party records and check-or-create.

use chatas_shared::Conversation;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::row::{timestamp_at, uuid_at};

pub(crate) const CONVERSATION_COLUMNS: &str = "c.id, c.participant_a, c.participant_b, c.created_at";

/// The unordered pair as (low, high), the key of the uniqueness index.
fn pair_key(a: Uuid, b: Uuid) -> (String, String) {
    let (a, b) = (a.to_string(), b.to_string());
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Database {
    /// Return the conversation between `user_a` and `user_b`, creating it if
    /// it does not exist yet. The boolean is `true` when a row was created.
    ///
    /// Order does not matter: `(a, b)` and `(b, a)` resolve to the same row.
    /// Concurrent calls for the same pair converge on one row through the
    /// unique index on the sorted pair; the loser re-reads the winner's row.
    pub fn check_or_create_conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<(Conversation, bool)> {
        if user_a == user_b {
            return Err(StoreError::SelfConversation);
        }
        for user in [user_a, user_b] {
            if !self.user_exists(user)? {
                return Err(StoreError::NotFound);
            }
        }

        let (low, high) = pair_key(user_a, user_b);

        if let Some(existing) = self.find_conversation_by_pair(&low, &high)? {
            return Ok((existing, false));
        }

        let id = Uuid::new_v4();
        let inserted = self.conn().execute(
            "INSERT INTO conversations
                 (id, participant_a, participant_b, participant_low, participant_high, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(participant_low, participant_high) DO NOTHING",
            params![
                id.to_string(),
                user_a.to_string(),
                user_b.to_string(),
                low,
                high,
                Utc::now().to_rfc3339(),
            ],
        )?;

        let conversation = self
            .find_conversation_by_pair(&low, &high)?
            .ok_or(StoreError::NotFound)?;

        if inserted > 0 {
            tracing::info!(
                conversation_id = %conversation.id,
                user_a = %user_a,
                user_b = %user_b,
                "conversation created"
            );
        }
        Ok((conversation, inserted > 0))
    }

    /// Fetch a single conversation by id.
    pub fn get_conversation(&self, id: Uuid) -> Result<Conversation> {
        self.conn()
            .query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations c WHERE c.id = ?1"),
                params![id.to_string()],
                row_to_conversation,
            )
            .map_err(not_found)
    }

    /// Conversations that `user_id` takes part in, newest first.
    pub fn list_conversations_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {CONVERSATION_COLUMNS}
             FROM conversations c
             WHERE c.participant_low = ?1 OR c.participant_high = ?1
             ORDER BY c.created_at DESC, c.rowid DESC"
        ))?;
        let rows = stmt.query_map(params![user_id.to_string()], row_to_conversation)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    /// Delete a conversation and, through the foreign key, its messages.
    pub fn delete_conversation(&self, id: Uuid) -> Result<()> {
        let affected = self.conn().execute(
            "DELETE FROM conversations WHERE id = ?1",
            params![id.to_string()],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        tracing::info!(conversation_id = %id, "conversation deleted");
        Ok(())
    }

    fn find_conversation_by_pair(&self, low: &str, high: &str) -> Result<Option<Conversation>> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT {CONVERSATION_COLUMNS} FROM conversations c
                     WHERE c.participant_low = ?1 AND c.participant_high = ?2"
                ),
                params![low, high],
                row_to_conversation,
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }
}

pub(crate) fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: uuid_at(row, 0)?,
        participants: [uuid_at(row, 1)?, uuid_at(row, 2)?],
        created_at: timestamp_at(row, 3)?,
    })
}
