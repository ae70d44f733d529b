//! The logged-in session and everything that hangs off it.
//!
//! ```text
//! LoggedOut ──login──▶ LoggingIn ──ok──▶ LoggedIn ──logout──▶ LoggedOut
//!                          └──────err──▶ LoggedOut
//! ```
//!
//! A [`Session`] is constructed once and handed to whatever needs it.
//! Restoring a saved session never fails: unreadable data simply leaves the
//! session logged out.

use tracing::{debug, info, warn};
use uuid::Uuid;

use chatas_shared::validation::validate_message_content;
use chatas_shared::{Message, User};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::directory::{Directory, DirectoryAction};
use crate::error::{ClientError, Result};
use crate::forms::{ProfileForm, RegisterForm};
use crate::storage::{FileSessionStore, SessionStore};
use crate::views::{ChatView, ConversationList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggingIn,
    LoggedIn(User),
}

pub struct Session<S: SessionStore> {
    api: ApiClient,
    store: S,
    state: SessionState,
    directory: Directory,
}

impl Session<FileSessionStore> {
    /// Build a session from config and restore whatever was saved.
    pub fn start(config: &ClientConfig) -> Self {
        let api = ApiClient::new(config.base_url.clone());
        let store = FileSessionStore::new(config.session_path.clone());
        let mut session = Session::new(api, store);
        session.restore();
        session
    }
}

impl<S: SessionStore> Session<S> {
    pub fn new(api: ApiClient, store: S) -> Self {
        Self {
            api,
            store,
            state: SessionState::LoggedOut,
            directory: Directory::new(),
        }
    }

    /// Load the saved user, if any.
    pub fn restore(&mut self) -> &SessionState {
        self.state = match self.store.load() {
            Ok(Some(user)) => {
                debug!(user_id = %user.id, "session restored");
                SessionState::LoggedIn(user)
            }
            Ok(None) => SessionState::LoggedOut,
            Err(e) => {
                warn!(error = %e, "discarding unreadable saved session");
                SessionState::LoggedOut
            }
        };
        &self.state
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&User> {
        match self.state {
            SessionState::LoggedIn(ref user) => Some(user),
            _ => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn user_id(&self) -> Result<Uuid> {
        self.current_user()
            .map(|u| u.id)
            .ok_or(ClientError::NotLoggedIn)
    }

    fn persist(&mut self, user: &User) {
        if let Err(e) = self.store.save(user) {
            warn!(error = %e, "failed to save session");
        }
    }

    // -- identity -----------------------------------------------------------

    pub async fn load_directory(&mut self) -> Result<()> {
        let users = self.api.list_users().await?;
        debug!(count = users.len(), "directory loaded");
        self.directory.apply(DirectoryAction::Load(users));
        Ok(())
    }

    /// Register and log in as the new user. On failure the previous state
    /// is kept.
    pub async fn register(&mut self, form: &RegisterForm) -> Result<User> {
        let new_user = form.to_new_user()?;

        let previous = std::mem::replace(&mut self.state, SessionState::LoggingIn);
        let user = match self.api.register(&new_user).await {
            Ok(user) => user,
            Err(e) => {
                self.state = previous;
                return Err(e);
            }
        };

        info!(user_id = %user.id, "registered");
        self.directory.apply(DirectoryAction::Add(user.clone()));
        self.persist(&user);
        self.state = SessionState::LoggedIn(user.clone());
        Ok(user)
    }

    /// Log in as `username`. Any previous session ends here: on failure the
    /// session is logged out and the saved snapshot is cleared with it.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<User> {
        self.state = SessionState::LoggingIn;
        match self.api.login(username, password).await {
            Ok(user) => {
                info!(user_id = %user.id, "logged in");
                self.persist(&user);
                self.state = SessionState::LoggedIn(user.clone());
                Ok(user)
            }
            Err(e) => {
                if let Err(clear_err) = self.store.clear() {
                    warn!(error = %clear_err, "failed to clear saved session");
                }
                self.state = SessionState::LoggedOut;
                Err(e)
            }
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear saved session");
        }
        if let SessionState::LoggedIn(ref user) = self.state {
            info!(user_id = %user.id, "logged out");
        }
        self.state = SessionState::LoggedOut;
    }

    /// Save profile edits and patch the directory and the session snapshot
    /// with the result.
    pub async fn update_profile(&mut self, form: &ProfileForm) -> Result<User> {
        let user_id = self.user_id()?;
        let update = form.to_update()?;

        let user = self.api.update_user(user_id, &update).await?;
        self.directory.apply(DirectoryAction::Update(user.clone()));
        self.persist(&user);
        self.state = SessionState::LoggedIn(user.clone());
        Ok(user)
    }

    // -- conversations ------------------------------------------------------

    /// Find or open the conversation between the logged-in user and
    /// `recipient`.
    pub async fn start_conversation(&self, recipient: Uuid) -> Result<Uuid> {
        let user_id = self.user_id()?;
        let (conversation_id, created) = self.api.check_or_create(user_id, recipient).await?;
        if created {
            info!(conversation_id = %conversation_id, "conversation started");
        }
        Ok(conversation_id)
    }

    pub async fn conversations(&self) -> Result<ConversationList> {
        let user_id = self.user_id()?;
        let summaries = self.api.conversations_for(user_id).await?;
        Ok(ConversationList::new(user_id, summaries, &self.directory))
    }

    pub async fn delete_conversation(&self, conversation_id: Uuid) -> Result<()> {
        self.user_id()?;
        self.api.delete_conversation(conversation_id).await?;
        info!(conversation_id = %conversation_id, "conversation deleted");
        Ok(())
    }

    // -- chat ---------------------------------------------------------------

    /// Fetch the history of a conversation, then mark the other side's
    /// messages as read.
    pub async fn open_chat(&self, conversation_id: Uuid) -> Result<ChatView> {
        let user_id = self.user_id()?;
        let messages = self.api.messages(conversation_id).await?;
        self.api.mark_as_read(conversation_id, user_id).await?;
        Ok(ChatView::new(conversation_id, user_id, messages))
    }

    /// Send a message. The caller folds the result into its view with
    /// [`ChatView::apply_sent`].
    pub async fn send_message(&self, conversation_id: Uuid, content: &str) -> Result<Message> {
        let user_id = self.user_id()?;
        validate_message_content(content)?;
        self.api.send_message(conversation_id, user_id, content).await
    }

    /// Flip the like on someone else's message and return the new value.
    pub async fn toggle_like(&self, message: &Message) -> Result<bool> {
        let user_id = self.user_id()?;
        if message.sender_id == user_id {
            return Err(ClientError::OwnMessage);
        }
        let response = self.api.toggle_like(message.id, user_id).await?;
        Ok(response.liked)
    }
}
