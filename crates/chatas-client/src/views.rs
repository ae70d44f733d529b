//! Plain-data view models for the conversation list and an open chat.
//!
//! Responses that arrive after a view has moved on to another
//! conversation are dropped by the `apply_*` methods.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use chatas_shared::{ConversationSummary, Message};

use crate::directory::Directory;

/// Shown for a participant missing from the directory.
pub const UNKNOWN_USER: &str = "Unknown user";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRow {
    pub conversation_id: Uuid,
    pub other_user_id: Option<Uuid>,
    pub other_username: String,
    pub has_unread_messages: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationList {
    viewer: Uuid,
    rows: Vec<ConversationRow>,
}

impl ConversationList {
    pub fn new(viewer: Uuid, summaries: Vec<ConversationSummary>, directory: &Directory) -> Self {
        let rows = summaries
            .into_iter()
            .map(|summary| {
                let other = summary.conversation.other_participant(viewer);
                let other_username = other
                    .and_then(|id| directory.username(id))
                    .unwrap_or(UNKNOWN_USER)
                    .to_string();
                ConversationRow {
                    conversation_id: summary.conversation.id,
                    other_user_id: other,
                    other_username,
                    has_unread_messages: summary.has_unread_messages,
                    created_at: summary.conversation.created_at,
                }
            })
            .collect();
        Self { viewer, rows }
    }

    pub fn viewer(&self) -> Uuid {
        self.viewer
    }

    pub fn rows(&self) -> &[ConversationRow] {
        &self.rows
    }

    pub fn get(&self, conversation_id: Uuid) -> Option<&ConversationRow> {
        self.rows.iter().find(|r| r.conversation_id == conversation_id)
    }

    pub fn unread_count(&self) -> usize {
        self.rows.iter().filter(|r| r.has_unread_messages).count()
    }

    /// Drop a row after a successful delete. Returns whether it was there.
    pub fn remove(&mut self, conversation_id: Uuid) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.conversation_id != conversation_id);
        self.rows.len() != before
    }
}

#[derive(Debug, Clone)]
pub struct ChatView {
    conversation_id: Uuid,
    viewer: Uuid,
    messages: Vec<Message>,
}

impl ChatView {
    pub fn new(conversation_id: Uuid, viewer: Uuid, messages: Vec<Message>) -> Self {
        Self {
            conversation_id,
            viewer,
            messages,
        }
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_own(&self, message: &Message) -> bool {
        message.sender_id == self.viewer
    }

    /// Display name of the sender, or [`UNKNOWN_USER`].
    pub fn sender<'a>(&self, message: &Message, directory: &'a Directory) -> &'a str {
        directory.username(message.sender_id).unwrap_or(UNKNOWN_USER)
    }

    /// Append a message returned by a send. Ignored when it belongs to
    /// another conversation or is already shown.
    pub fn apply_sent(&mut self, message: Message) -> bool {
        if message.conversation_id != self.conversation_id
            || self.messages.iter().any(|m| m.id == message.id)
        {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Set the like flag after the server confirmed a toggle. Ignored for
    /// messages not in this view.
    pub fn apply_like(&mut self, message_id: Uuid, liked: bool) -> bool {
        match self.messages.iter_mut().find(|m| m.id == message_id) {
            Some(message) => {
                message.liked = liked;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::DirectoryAction;
    use chatas_shared::{Conversation, User};

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{name}@pastas.lt"),
            username: name.to_string(),
            profile_image: "default-profile.png".into(),
        }
    }

    fn message(conversation_id: Uuid, sender_id: Uuid) -> Message {
        Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            content: "labas".into(),
            sent_at: Utc::now(),
            is_read: false,
            liked: false,
        }
    }

    #[test]
    fn test_conversation_rows_resolve_names() {
        let a = user("aldona");
        let b = user("bronius");
        let mut directory = Directory::new();
        directory.apply(DirectoryAction::Load(vec![a.clone(), b.clone()]));

        let ghost = Uuid::new_v4();
        let summaries = vec![
            ConversationSummary {
                conversation: Conversation {
                    id: Uuid::new_v4(),
                    participants: [b.id, a.id],
                    created_at: Utc::now(),
                },
                has_unread_messages: true,
            },
            ConversationSummary {
                conversation: Conversation {
                    id: Uuid::new_v4(),
                    participants: [a.id, ghost],
                    created_at: Utc::now(),
                },
                has_unread_messages: false,
            },
        ];

        let mut list = ConversationList::new(a.id, summaries, &directory);
        assert_eq!(list.rows()[0].other_username, "bronius");
        assert_eq!(list.rows()[1].other_username, UNKNOWN_USER);
        assert_eq!(list.rows()[1].other_user_id, Some(ghost));
        assert_eq!(list.unread_count(), 1);

        let first = list.rows()[0].conversation_id;
        assert!(list.remove(first));
        assert!(!list.remove(first));
        assert_eq!(list.rows().len(), 1);
    }

    #[test]
    fn test_chat_view_ignores_other_conversation() {
        let me = Uuid::new_v4();
        let conversation = Uuid::new_v4();
        let mut view = ChatView::new(conversation, me, Vec::new());

        let mine = message(conversation, me);
        assert!(view.apply_sent(mine.clone()));
        assert!(!view.apply_sent(mine.clone()));
        assert!(!view.apply_sent(message(Uuid::new_v4(), me)));
        assert_eq!(view.messages().len(), 1);
        assert!(view.is_own(&mine));
    }

    #[test]
    fn test_chat_view_like_flip() {
        let me = Uuid::new_v4();
        let other = user("bronius");
        let conversation = Uuid::new_v4();
        let theirs = message(conversation, other.id);
        let mut view = ChatView::new(conversation, me, vec![theirs.clone()]);

        assert!(view.apply_like(theirs.id, true));
        assert!(view.messages()[0].liked);
        assert!(!view.apply_like(Uuid::new_v4(), true));

        let mut directory = Directory::new();
        assert_eq!(view.sender(&theirs, &directory), UNKNOWN_USER);
        directory.apply(DirectoryAction::Add(other));
        assert_eq!(view.sender(&theirs, &directory), "bronius");
    }
}
