//! Ownership verification ahead of location mutations.
//!
//! # Invariants
//! - A location is verified only when `public_id` and `owner_id` match in
//!   the same row; a missing row and a foreign row are indistinguishable.
//! - `VerifiedLocation` values are only minted here.

use crate::model::location::{LocationRowId, PublicId};
use crate::model::user::User;
use crate::repo::executor::TransactionalExecutor;
use crate::repo::query::ownership_check;
use crate::repo::RepoResult;
use log::debug;

/// Location confirmed to belong to the requesting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedLocation {
    internal_id: LocationRowId,
    public_id: PublicId,
}

impl VerifiedLocation {
    pub(crate) fn new(internal_id: LocationRowId, public_id: PublicId) -> Self {
        Self {
            internal_id,
            public_id,
        }
    }

    pub fn internal_id(&self) -> LocationRowId {
        self.internal_id
    }

    pub fn public_id(&self) -> &str {
        &self.public_id
    }
}

/// Confirms that a location exists and is owned by a given user.
#[derive(Debug, Clone, Copy)]
pub struct OwnershipGuard<'conn> {
    executor: TransactionalExecutor<'conn>,
}

impl<'conn> OwnershipGuard<'conn> {
    pub fn new(executor: TransactionalExecutor<'conn>) -> Self {
        Self { executor }
    }

    /// Returns the verified target, or `None` when `user` does not own
    /// `public_id` (including when it does not exist).
    pub fn verify(&self, user: &User, public_id: &str) -> RepoResult<Option<VerifiedLocation>> {
        let statement = ownership_check(user.id, public_id);
        let mut matches = self.executor.run_read(&statement, |row| {
            Ok(VerifiedLocation::new(row.get("id")?, row.get("public_id")?))
        })?;

        let verified = matches.pop();
        debug!(
            "event=ownership_verify module=repo status={} public_id={}",
            if verified.is_some() { "ok" } else { "rejected" },
            public_id
        );
        Ok(verified)
    }
}
