//! Message store: append, ordered listing, read receipts and likes.

use chatas_shared::Message;
use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::row::{timestamp_at, uuid_at};

const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, content, sent_at, is_read, liked";

impl Database {
    /// Append a message to a conversation. New messages start unread and
    /// not liked; `sent_at` is assigned here, in arrival order.
    pub fn append_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<Message> {
        let conversation = self.get_conversation(conversation_id).map_err(|e| match e {
            StoreError::NotFound => StoreError::InvalidConversation(conversation_id),
            other => other,
        })?;
        if !conversation.includes(sender_id) {
            return Err(StoreError::NotParticipant(sender_id));
        }

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            content: content.to_string(),
            sent_at: Utc::now(),
            is_read: false,
            liked: false,
        };

        self.conn().execute(
            "INSERT INTO messages (id, conversation_id, sender_id, content, sent_at, is_read, liked)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, 0)",
            params![
                message.id.to_string(),
                conversation_id.to_string(),
                sender_id.to_string(),
                message.content,
                message.sent_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            sender_id = %sender_id,
            "message appended"
        );
        Ok(message)
    }

    /// All messages of a conversation in send order. No pagination.
    pub fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {MESSAGE_COLUMNS}
             FROM messages
             WHERE conversation_id = ?1
             ORDER BY seq ASC"
        ))?;
        let rows = stmt.query_map(params![conversation_id.to_string()], row_to_message)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    pub fn get_message(&self, id: Uuid) -> Result<Message> {
        self.conn()
            .query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id.to_string()],
                row_to_message,
            )
            .map_err(not_found)
    }

    /// Mark every message in the conversation not sent by `viewer_id` as
    /// read. Idempotent; returns how many rows flipped from unread.
    pub fn mark_all_read_except(&self, conversation_id: Uuid, viewer_id: Uuid) -> Result<usize> {
        let affected = self.conn().execute(
            "UPDATE messages SET is_read = 1
             WHERE conversation_id = ?1 AND sender_id != ?2 AND is_read = 0",
            params![conversation_id.to_string(), viewer_id.to_string()],
        )?;

        if affected > 0 {
            tracing::debug!(
                conversation_id = %conversation_id,
                viewer_id = %viewer_id,
                count = affected,
                "messages marked as read"
            );
        }
        Ok(affected)
    }

    /// Flip the `liked` flag of a message on behalf of `caller_id` and return
    /// the new value. Only the participant who did not send the message may
    /// like it.
    pub fn toggle_liked(&self, message_id: Uuid, caller_id: Uuid) -> Result<bool> {
        let message = self.get_message(message_id)?;
        if message.sender_id == caller_id {
            return Err(StoreError::SelfLike);
        }
        let conversation = self.get_conversation(message.conversation_id)?;
        if !conversation.includes(caller_id) {
            return Err(StoreError::NotParticipant(caller_id));
        }

        // the flipped value comes from the write itself so concurrent
        // toggles each see their own result
        let liked: bool = self
            .conn()
            .query_row(
                "UPDATE messages SET liked = NOT liked WHERE id = ?1 RETURNING liked",
                params![message_id.to_string()],
                |row| row.get(0),
            )
            .map_err(not_found)?;
        tracing::debug!(message_id = %message_id, liked, "message like toggled");
        Ok(liked)
    }
}

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: uuid_at(row, 0)?,
        conversation_id: uuid_at(row, 1)?,
        sender_id: uuid_at(row, 2)?,
        content: row.get(3)?,
        sent_at: timestamp_at(row, 4)?,
        is_read: row.get(5)?,
        liked: row.get(6)?,
    })
}
