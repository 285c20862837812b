//! Persistence layer for users and locations.
//!
//! # Responsibility
//! - Compose parameterized statements from typed inputs (`query`).
//! - Verify record ownership before mutations (`ownership`).
//! - Run reads directly and writes inside a transaction (`executor`).
//! - Resolve caller identity and mint public ids (`user_repo`, `public_id`).
//!
//! # Invariants
//! - Caller-supplied values are bound as parameters, never formatted into SQL.
//! - Repository construction rejects connections without the migrated schema.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod executor;
pub mod ownership;
pub mod public_id;
pub mod query;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level failure surfaced to the service layer.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// A persisted row could not be decoded.
    InvalidData(String),
    /// The public id generator could not produce an identifier.
    IdGeneration(String),
    /// User registration was attempted with a blank public id.
    BlankUserId,
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::IdGeneration(message) => write!(f, "public id generation failed: {message}"),
            Self::BlankUserId => write!(f, "user public id must not be blank"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("users", &["id", "public_id"]),
    (
        "locations",
        &[
            "id",
            "public_id",
            "name",
            "address",
            "owner_id",
            "created_at",
            "updated_at",
        ],
    ),
];

/// Checks that `conn` carries the fully migrated users/locations schema.
pub fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    // Table names come from REQUIRED_COLUMNS only.
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
