//! Form state for registration and profile editing.
//!
//! Both run the shared validation rules before anything is sent.

use chatas_shared::validation::{
    validate_new_user, validate_password_repeat, validate_user_update,
};
use chatas_shared::{NewUser, User, UserUpdate};

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_repeat: String,
    pub profile_image: String,
}

impl RegisterForm {
    /// Validate and turn into a registration body.
    pub fn to_new_user(&self) -> Result<NewUser> {
        let user = NewUser {
            email: self.email.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            profile_image: Some(self.profile_image.trim().to_string()).filter(|i| !i.is_empty()),
        };
        validate_new_user(&user)?;
        validate_password_repeat(&self.password, &self.password_repeat)?;
        Ok(user)
    }
}

/// Profile edit form. The password starts blank; leaving it blank keeps
/// the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password_repeat: String,
    pub profile_image: String,
}

impl ProfileForm {
    pub fn for_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            username: user.username.clone(),
            password: String::new(),
            password_repeat: String::new(),
            profile_image: user.profile_image.clone(),
        }
    }

    pub fn to_update(&self) -> Result<UserUpdate> {
        let update = UserUpdate {
            username: Some(self.username.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            password: Some(self.password.clone()).filter(|p| !p.is_empty()),
            profile_image: Some(self.profile_image.trim().to_string()),
        };
        validate_user_update(&update)?;
        if update.password.is_some() {
            validate_password_repeat(&self.password, &self.password_repeat)?;
        }
        Ok(update)
    }
}
