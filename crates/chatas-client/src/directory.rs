//! Client-side cache of all known users.
//!
//! The list is loaded once and then patched from registration and profile
//! edit results instead of being refetched. It can drift from the server
//! when another client edits a user.

use uuid::Uuid;

use chatas_shared::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryAction {
    /// Replace the whole list with a fresh listing.
    Load(Vec<User>),
    /// A user registered.
    Add(User),
    /// A user's profile changed.
    Update(User),
}

/// Fold one action over the current list and return the next one.
///
/// `Add` of an id that is already present replaces that entry in place;
/// `Update` of an unknown id leaves the list as it was.
pub fn reduce(users: &[User], action: DirectoryAction) -> Vec<User> {
    match action {
        DirectoryAction::Load(users) => users,
        DirectoryAction::Add(user) => {
            let mut next = users.to_vec();
            match next.iter_mut().find(|u| u.id == user.id) {
                Some(existing) => *existing = user,
                None => next.push(user),
            }
            next
        }
        DirectoryAction::Update(user) => users
            .iter()
            .map(|u| if u.id == user.id { user.clone() } else { u.clone() })
            .collect(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Directory {
    users: Vec<User>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: DirectoryAction) {
        self.users = reduce(&self.users, action);
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn username(&self, id: Uuid) -> Option<&str> {
        self.get(id).map(|u| u.username.as_str())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
