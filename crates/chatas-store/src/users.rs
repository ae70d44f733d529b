//! Identity store: registration, login and profile edits for [`User`] records.

use chatas_shared::{NewUser, UniqueField, User, UserUpdate};
use chrono::Utc;
use rusqlite::{params, ErrorCode, OptionalExtension};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{not_found, Result, StoreError};
use crate::password;
use crate::row::uuid_at;

const USER_COLUMNS: &str = "id, email, username, profile_image";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Register a new user.
    ///
    /// Email is checked before username, so a candidate colliding on both
    /// reports the email. The password is stored only as an Argon2 hash.
    pub fn register_user(&self, candidate: &NewUser, default_image: &str) -> Result<User> {
        if self.user_id_by_email(&candidate.email)?.is_some() {
            return Err(StoreError::Duplicate(UniqueField::Email));
        }
        if self.user_id_by_username(&candidate.username)?.is_some() {
            return Err(StoreError::Duplicate(UniqueField::Username));
        }

        let password_hash = password::hash_password(&candidate.password)?;
        let profile_image = candidate
            .profile_image
            .as_deref()
            .filter(|img| !img.is_empty())
            .unwrap_or(default_image)
            .to_string();

        let user = User {
            id: Uuid::new_v4(),
            email: candidate.email.clone(),
            username: candidate.username.clone(),
            profile_image,
        };

        self.conn()
            .execute(
                "INSERT INTO users (id, email, username, password_hash, profile_image, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    user.id.to_string(),
                    user.email,
                    user.username,
                    password_hash,
                    user.profile_image,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(unique_violation)?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Verify credentials. An unknown username and a wrong password produce
    /// the same error.
    pub fn login(&self, username: &str, password: &str) -> Result<User> {
        let row: Option<(User, String)> = self
            .conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?1"),
                params![username],
                |row| Ok((row_to_user(row)?, row.get(4)?)),
            )
            .optional()?;

        match row {
            Some((user, hash)) if password::verify_password(password, &hash) => Ok(user),
            _ => Err(StoreError::InvalidCredentials),
        }
    }

    /// Fetch a single user by id.
    pub fn get_user(&self, id: Uuid) -> Result<User> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.to_string()],
                row_to_user,
            )
            .map_err(not_found)
    }

    /// List every user in registration order.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt.query_map([], row_to_user)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }

    pub fn user_exists(&self, id: Uuid) -> Result<bool> {
        let found: Option<i64> = self
            .conn()
            .query_row(
                "SELECT 1 FROM users WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Apply a partial profile update. The password is re-hashed only when a
    /// non-empty new one is supplied; otherwise the stored hash is kept.
    pub fn update_user(&self, id: Uuid, update: &UserUpdate) -> Result<User> {
        let current = self.get_user(id)?;

        if let Some(ref email) = update.email {
            if matches!(self.user_id_by_email(email)?, Some(owner) if owner != id) {
                return Err(StoreError::Duplicate(UniqueField::Email));
            }
        }
        if let Some(ref username) = update.username {
            if matches!(self.user_id_by_username(username)?, Some(owner) if owner != id) {
                return Err(StoreError::Duplicate(UniqueField::Username));
            }
        }

        let updated = User {
            id,
            email: update.email.clone().unwrap_or(current.email),
            username: update.username.clone().unwrap_or(current.username),
            profile_image: update
                .profile_image
                .clone()
                .filter(|img| !img.is_empty())
                .unwrap_or(current.profile_image),
        };

        // hashed up front so profile fields and password land in one statement
        let new_hash = update
            .new_password()
            .map(password::hash_password)
            .transpose()?;

        self.conn()
            .execute(
                "UPDATE users
                 SET email = ?1, username = ?2, profile_image = ?3,
                     password_hash = COALESCE(?4, password_hash)
                 WHERE id = ?5",
                params![
                    updated.email,
                    updated.username,
                    updated.profile_image,
                    new_hash,
                    id.to_string()
                ],
            )
            .map_err(unique_violation)?;

        tracing::info!(
            user_id = %id,
            password_changed = new_hash.is_some(),
            "profile updated"
        );
        Ok(updated)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a user by id together with every conversation they take part
    /// in (messages go with the conversations). Returns `true` if a user row
    /// was deleted.
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        let tx = self.conn().unchecked_transaction()?;
        let conversations = tx.execute(
            "DELETE FROM conversations WHERE participant_low = ?1 OR participant_high = ?1",
            params![id.to_string()],
        )?;
        let affected = tx.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;
        tx.commit()?;

        if affected > 0 {
            tracing::info!(user_id = %id, conversations, "user deleted");
        }
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn user_id_by_email(&self, email: &str) -> Result<Option<Uuid>> {
        self.conn()
            .query_row(
                "SELECT id FROM users WHERE email = ?1",
                params![email],
                |row| uuid_at(row, 0),
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }

    fn user_id_by_username(&self, username: &str) -> Result<Option<Uuid>> {
        self.conn()
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![username],
                |row| uuid_at(row, 0),
            )
            .optional()
            .map_err(StoreError::Sqlite)
    }
}

/// Translate a UNIQUE violation that slipped past the existence checks
/// (two registrations racing) into the same duplicate error.
fn unique_violation(e: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref err, Some(ref msg)) = e {
        if err.code == ErrorCode::ConstraintViolation {
            if msg.contains("users.email") {
                return StoreError::Duplicate(UniqueField::Email);
            }
            if msg.contains("users.username") {
                return StoreError::Duplicate(UniqueField::Username);
            }
        }
    }
    StoreError::Sqlite(e)
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        profile_image: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tests::test_db;

    fn candidate(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password: "Slaptas1!".to_string(),
            profile_image: None,
        }
    }

    #[test]
    fn test_register_applies_default_image() {
        let (db, _dir) = test_db();
        let user = db
            .register_user(&candidate("ona@pastas.lt", "onute"), "default-profile.png")
            .unwrap();
        assert_eq!(user.profile_image, "default-profile.png");
        assert_eq!(db.get_user(user.id).unwrap(), user);
    }

    #[test]
    fn test_password_is_hashed() {
        let (db, _dir) = test_db();
        let user = db
            .register_user(&candidate("ona@pastas.lt", "onute"), "d.png")
            .unwrap();
        let stored: String = db
            .conn()
            .query_row(
                "SELECT password_hash FROM users WHERE id = ?1",
                params![user.id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert!(stored.starts_with("$argon2"));
        assert!(!stored.contains("Slaptas1!"));
    }

    #[test]
    fn test_duplicate_email() {
        let (db, _dir) = test_db();
        db.register_user(&candidate("ona@pastas.lt", "onute"), "d.png")
            .unwrap();
        let err = db
            .register_user(&candidate("ona@pastas.lt", "kitas_vardas"), "d.png")
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueField::Email)));
    }

    #[test]
    fn test_duplicate_username() {
        let (db, _dir) = test_db();
        db.register_user(&candidate("ona@pastas.lt", "onute"), "d.png")
            .unwrap();
        let err = db
            .register_user(&candidate("kita@pastas.lt", "onute"), "d.png")
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueField::Username)));
    }

    #[test]
    fn test_duplicate_both_reports_email() {
        let (db, _dir) = test_db();
        db.register_user(&candidate("ona@pastas.lt", "onute"), "d.png")
            .unwrap();
        let err = db
            .register_user(&candidate("ona@pastas.lt", "onute"), "d.png")
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueField::Email)));
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let (db, _dir) = test_db();
        db.register_user(&candidate("ona@pastas.lt", "onute"), "d.png")
            .unwrap();

        let wrong_password = db.login("onute", "Neteisingas1!").unwrap_err();
        let unknown_user = db.login("niekas", "Slaptas1!").unwrap_err();
        assert!(matches!(wrong_password, StoreError::InvalidCredentials));
        assert!(matches!(unknown_user, StoreError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());

        let user = db.login("onute", "Slaptas1!").unwrap();
        assert_eq!(user.username, "onute");
    }

    #[test]
    fn test_update_keeps_hash_without_new_password() {
        let (db, _dir) = test_db();
        let user = db
            .register_user(&candidate("ona@pastas.lt", "onute"), "d.png")
            .unwrap();

        let updated = db
            .update_user(
                user.id,
                &UserUpdate {
                    username: Some("ona_naujoji".into()),
                    password: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.username, "ona_naujoji");
        assert_eq!(updated.email, "ona@pastas.lt");
        assert!(db.login("ona_naujoji", "Slaptas1!").is_ok());
    }

    #[test]
    fn test_update_rehashes_new_password() {
        let (db, _dir) = test_db();
        let user = db
            .register_user(&candidate("ona@pastas.lt", "onute"), "d.png")
            .unwrap();
        db.update_user(
            user.id,
            &UserUpdate {
                password: Some("Naujas22?".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(db.login("onute", "Slaptas1!").is_err());
        assert!(db.login("onute", "Naujas22?").is_ok());
    }

    #[test]
    fn test_failed_update_changes_nothing() {
        let (db, _dir) = test_db();
        let user = db
            .register_user(&candidate("ona@pastas.lt", "onute"), "d.png")
            .unwrap();
        db.conn()
            .execute_batch(
                "CREATE TRIGGER no_hash_writes BEFORE UPDATE OF password_hash ON users
                 BEGIN SELECT RAISE(ABORT, 'hash writes disabled'); END;",
            )
            .unwrap();

        let err = db
            .update_user(
                user.id,
                &UserUpdate {
                    username: Some("ona_naujoji".into()),
                    password: Some("Naujas22?".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
        assert_eq!(db.get_user(user.id).unwrap().username, "onute");
    }

    #[test]
    fn test_update_rejects_taken_email() {
        let (db, _dir) = test_db();
        db.register_user(&candidate("ona@pastas.lt", "onute"), "d.png")
            .unwrap();
        let jonas = db
            .register_user(&candidate("jonas@pastas.lt", "jonukas"), "d.png")
            .unwrap();
        let err = db
            .update_user(
                jonas.id,
                &UserUpdate {
                    email: Some("ona@pastas.lt".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(UniqueField::Email)));

        // re-submitting your own email is not a collision
        assert!(db
            .update_user(
                jonas.id,
                &UserUpdate {
                    email: Some("jonas@pastas.lt".into()),
                    ..Default::default()
                },
            )
            .is_ok());
    }

    #[test]
    fn test_update_missing_user() {
        let (db, _dir) = test_db();
        let err = db
            .update_user(Uuid::new_v4(), &UserUpdate::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn test_list_in_registration_order() {
        let (db, _dir) = test_db();
        let a = db
            .register_user(&candidate("a@pastas.lt", "aaaaa"), "d.png")
            .unwrap();
        let b = db
            .register_user(&candidate("b@pastas.lt", "bbbbb"), "d.png")
            .unwrap();
        let ids: Vec<Uuid> = db.list_users().unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_delete_user() {
        let (db, _dir) = test_db();
        let user = db
            .register_user(&candidate("a@pastas.lt", "aaaaa"), "d.png")
            .unwrap();
        assert!(db.delete_user(user.id).unwrap());
        assert!(!db.delete_user(user.id).unwrap());
        assert!(matches!(db.get_user(user.id), Err(StoreError::NotFound)));
    }

    #[test]
    fn test_delete_user_removes_their_conversations() {
        let (db, _dir) = test_db();
        let a = db
            .register_user(&candidate("a@pastas.lt", "aaaaa"), "d.png")
            .unwrap();
        let b = db
            .register_user(&candidate("b@pastas.lt", "bbbbb"), "d.png")
            .unwrap();
        let (conv, _) = db.check_or_create_conversation(a.id, b.id).unwrap();
        let msg = db.append_message(conv.id, b.id, "labas").unwrap();

        assert!(db.delete_user(a.id).unwrap());
        assert!(db.list_conversations_for_user(b.id).unwrap().is_empty());
        assert!(matches!(db.get_message(msg.id), Err(StoreError::NotFound)));
        assert!(matches!(
            db.append_message(conv.id, b.id, "ar dar čia?"),
            Err(StoreError::InvalidConversation(_))
        ));
    }
}
