//! Form validation rules for registration, profile edits and messages.
//!
//! The server applies these before touching the store; the client runs the
//! same checks before submitting so that most mistakes never leave the form.

use std::str::FromStr;

use email_address::EmailAddress;
use url::{ParseError, Url};

use crate::constants::{
    MAX_MESSAGE_LEN, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN, PASSWORD_SPECIALS, USERNAME_MAX_LEN,
    USERNAME_MIN_LEN,
};
use crate::error::ValidationError;
use crate::types::{NewUser, UserUpdate};

pub type Result<T> = std::result::Result<T, ValidationError>;

const REQUIRED: &str = "This field is required.";

pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if len == 0 {
        return Err(ValidationError::new("username", REQUIRED));
    }
    if len < USERNAME_MIN_LEN {
        return Err(ValidationError::new(
            "username",
            format!("Username must be at least {USERNAME_MIN_LEN} characters long."),
        ));
    }
    if len > USERNAME_MAX_LEN {
        return Err(ValidationError::new(
            "username",
            format!("Username must be at most {USERNAME_MAX_LEN} characters long."),
        ));
    }
    Ok(())
}

/// RFC 5322 address syntax, with the extra rule that the domain has at
/// least one dot and no empty labels.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(ValidationError::new("email", REQUIRED));
    }
    let invalid = || ValidationError::new("email", "Must be a valid email address.");

    let address = EmailAddress::from_str(email).map_err(|_| invalid())?;
    let domain = address.domain();
    if !domain.contains('.') || domain.split('.').any(str::is_empty) {
        return Err(invalid());
    }
    Ok(())
}

/// Password policy: 8 to 25 characters drawn from letters, digits and
/// `@$!%*?&`, with at least one of each class.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(ValidationError::new("password", REQUIRED));
    }

    let len = password.chars().count();
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len)
        || !allowed
        || !has_lower
        || !has_upper
        || !has_digit
        || !has_special
    {
        return Err(ValidationError::new(
            "password",
            format!(
                "Password must contain a lowercase letter, an uppercase letter, a digit and \
                 one of {PASSWORD_SPECIALS}, and be {PASSWORD_MIN_LEN} to {PASSWORD_MAX_LEN} characters long."
            ),
        ));
    }
    Ok(())
}

pub fn validate_password_repeat(password: &str, repeat: &str) -> Result<()> {
    if password != repeat {
        return Err(ValidationError::new(
            "passwordRepeat",
            "Passwords must match.",
        ));
    }
    Ok(())
}

/// An empty value is accepted (the server substitutes the default image).
/// Otherwise it must be an absolute http(s) URL or a bare image file name.
pub fn validate_profile_image(image: &str) -> Result<()> {
    if image.is_empty() {
        return Ok(());
    }
    let invalid = || ValidationError::new("profileImage", "Must be a valid URL.");

    if image.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    match Url::parse(image) {
        Ok(url) => {
            let web = matches!(url.scheme(), "http" | "https");
            if web && url.host_str().is_some_and(|h| !h.is_empty()) {
                Ok(())
            } else {
                Err(invalid())
            }
        }
        Err(ParseError::RelativeUrlWithoutBase) => {
            let is_file_name = !image.contains('/')
                && image
                    .rsplit_once('.')
                    .is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty());
            if is_file_name {
                Ok(())
            } else {
                Err(invalid())
            }
        }
        Err(_) => Err(invalid()),
    }
}

pub fn validate_message_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(ValidationError::new("content", "Message cannot be empty."));
    }
    if content.chars().count() > MAX_MESSAGE_LEN {
        return Err(ValidationError::new(
            "content",
            format!("Message must be at most {MAX_MESSAGE_LEN} characters long."),
        ));
    }
    Ok(())
}

/// Registration form. Field order matches the form: email first.
pub fn validate_new_user(user: &NewUser) -> Result<()> {
    validate_email(&user.email)?;
    validate_username(&user.username)?;
    validate_password(&user.password)?;
    if let Some(ref image) = user.profile_image {
        validate_profile_image(image)?;
    }
    Ok(())
}

/// Profile edit. Only supplied fields are checked; an empty password means
/// "keep the current one".
pub fn validate_user_update(update: &UserUpdate) -> Result<()> {
    if let Some(ref username) = update.username {
        validate_username(username)?;
    }
    if let Some(ref email) = update.email {
        validate_email(email)?;
    }
    if let Some(password) = update.new_password() {
        validate_password(password)?;
    }
    if let Some(ref image) = update.profile_image {
        validate_profile_image(image)?;
    }
    Ok(())
}
