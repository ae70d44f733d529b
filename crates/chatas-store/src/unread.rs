//! Unread aggregation.
//!
//! Joins conversations with their messages in one query and reduces each
//! conversation to a single viewer-relative flag, so message bodies never
//! leave the database for a conversation listing.

use chatas_shared::ConversationSummary;
use rusqlite::params;
use uuid::Uuid;

use crate::conversations::{row_to_conversation, CONVERSATION_COLUMNS};
use crate::database::Database;
use crate::error::{Result, StoreError};

impl Database {
    /// Every conversation of `user_id`, newest first, each flagged with
    /// whether it holds at least one unread message from the other side.
    ///
    /// A user with no conversations gets an empty list.
    pub fn list_conversations_with_unread(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConversationSummary>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {CONVERSATION_COLUMNS},
                    EXISTS (
                        SELECT 1 FROM messages m
                        WHERE m.conversation_id = c.id
                          AND m.is_read = 0
                          AND m.sender_id != ?1
                    ) AS has_unread
             FROM conversations c
             WHERE c.participant_low = ?1 OR c.participant_high = ?1
             ORDER BY c.created_at DESC, c.rowid DESC"
        ))?;

        let rows = stmt.query_map(params![user_id.to_string()], |row| {
            Ok(ConversationSummary {
                conversation: row_to_conversation(row)?,
                has_unread_messages: row.get(4)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}
