//! Credential store: registration, authentication, lookup.

use super::{Database, now_ms};
use crate::auth;
use crate::error::{Error, Result};
use crate::types::{User, UserPublic};
use rusqlite::{Row, params};
use tracing::debug;

fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}

/// True when the failure is a UNIQUE constraint violation.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Database {
    /// Register a new user.
    ///
    /// Fails with [`Error::DuplicateEmail`] when the email is already taken.
    /// The identifier is freshly generated and immutable from here on.
    pub fn create_user(&self, email: &str, password: &str) -> Result<UserPublic> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::invalid_value("email", "must be a valid address"));
        }
        if password.is_empty() {
            return Err(Error::invalid_value("password", "must not be empty"));
        }

        let id = auth::generate_user_id();
        let password_hash = auth::hash_password(password);
        let now = now_ms();

        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, email, password_hash, now],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => return Err(Error::DuplicateEmail),
                Err(e) => return Err(e.into()),
            }

            debug!(user_id = %id, "registered user");

            Ok(UserPublic {
                id: id.clone(),
                email: email.to_string(),
                created_at: now,
            })
        })
    }

    /// Authenticate by email and password.
    ///
    /// Unknown email and wrong password return the same
    /// [`Error::InvalidCredentials`] value, so callers cannot probe which
    /// emails are registered.
    pub fn authenticate_user(&self, email: &str, password: &str) -> Result<UserPublic> {
        // Same normalization as create_user, so padded input round-trips
        let email = email.trim();
        let user = self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM users WHERE email = ?1")?;
            match stmt.query_row(params![email], parse_user_row) {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })?;

        let Some(user) = user else {
            return Err(Error::InvalidCredentials);
        };

        if !auth::verify_password(password, &user.password_hash) {
            return Err(Error::InvalidCredentials);
        }

        Ok(user.into())
    }

    /// Look up a user's public view by id. The hash never leaves the store.
    pub fn get_user(&self, user_id: &str) -> Result<Option<UserPublic>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, email, created_at FROM users WHERE id = ?1")?;
            let result = stmt.query_row(params![user_id], |row| {
                Ok(UserPublic {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    created_at: row.get(2)?,
                })
            });
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }
}
