//! Statement execution against a shared connection.
//!
//! # Invariants
//! - `run_write` executes exactly one statement inside its own transaction
//!   and commits only when that statement succeeded.
//! - Reads run outside any explicit transaction.

use crate::repo::query::Statement;
use crate::repo::RepoResult;
use log::warn;
use rusqlite::{params_from_iter, Connection, Row, Transaction, TransactionBehavior};

/// Runs composed statements; writes are wrapped in begin/commit.
#[derive(Debug, Clone, Copy)]
pub struct TransactionalExecutor<'conn> {
    conn: &'conn Connection,
}

impl<'conn> TransactionalExecutor<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Executes one mutating statement atomically and returns affected rows.
    ///
    /// On failure the transaction is dropped without commit, which rolls it
    /// back, and the underlying error is returned unchanged.
    pub fn run_write(&self, statement: &Statement) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let changed = match tx.execute(statement.sql(), params_from_iter(statement.params())) {
            Ok(changed) => changed,
            Err(err) => {
                warn!(
                    "event=tx_rollback module=repo status=error error={}",
                    err
                );
                return Err(err.into());
            }
        };

        tx.commit()?;
        Ok(changed)
    }

    /// Executes one read statement and maps every returned row.
    pub fn run_read<T, F>(&self, statement: &Statement, mut map_row: F) -> RepoResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> RepoResult<T>,
    {
        let mut stmt = self.conn.prepare(statement.sql())?;
        let mut rows = stmt.query(params_from_iter(statement.params()))?;
        let mut mapped = Vec::new();
        while let Some(row) = rows.next()? {
            mapped.push(map_row(row)?);
        }
        Ok(mapped)
    }
}
