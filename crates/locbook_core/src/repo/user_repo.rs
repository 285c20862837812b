//! Caller identity resolution.
//!
//! # Responsibility
//! - Map an authenticated caller token to the internal `User` reference.
//! - Provide a SQLite-backed user directory for hosting layers.
//!
//! # Invariants
//! - A blank token never resolves to a user.
//! - Resolution is read-only; users are created only via `register_user`.

use crate::model::user::User;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{Connection, OptionalExtension};

/// Public user id extracted from already-verified caller credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerToken(String);

impl CallerToken {
    pub fn new(public_user_id: impl Into<String>) -> Self {
        Self(public_user_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Maps caller tokens to users. `Ok(None)` means unauthenticated.
pub trait IdentityResolver {
    fn resolve(&self, caller: &CallerToken) -> RepoResult<Option<User>>;
}

impl<T: IdentityResolver + ?Sized> IdentityResolver for &T {
    fn resolve(&self, caller: &CallerToken) -> RepoResult<Option<User>> {
        (**self).resolve(caller)
    }
}

/// User directory stored in the `users` table.
#[derive(Debug, Clone, Copy)]
pub struct SqliteUserDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserDirectory<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Returns the user with `public_id`, creating it on first use.
    pub fn register_user(&self, public_id: &str) -> RepoResult<User> {
        let public_id = public_id.trim();
        if public_id.is_empty() {
            return Err(RepoError::BlankUserId);
        }

        self.conn.execute(
            "INSERT OR IGNORE INTO users (public_id) VALUES (?1);",
            [public_id],
        )?;
        self.find_by_public_id(public_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("user `{public_id}` missing after registration"))
        })
    }

    fn find_by_public_id(&self, public_id: &str) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, public_id FROM users WHERE public_id = ?1;",
                [public_id],
                |row| {
                    Ok(User {
                        id: row.get("id")?,
                        public_id: row.get("public_id")?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }
}

impl IdentityResolver for SqliteUserDirectory<'_> {
    fn resolve(&self, caller: &CallerToken) -> RepoResult<Option<User>> {
        let token = caller.as_str().trim();
        if token.is_empty() {
            return Ok(None);
        }
        self.find_by_public_id(token)
    }
}
