//! Location use-case service.
//!
//! # Responsibility
//! - Run list/create/update/delete for one caller per call.
//! - Enforce the gate order: identity, validation, ownership, then the write.
//!
//! # Invariants
//! - No store access happens before the caller resolves to a user.
//! - Update/delete compose their mutation only from a `VerifiedLocation`.
//! - A transaction is opened only after every gate passed.
//! - Nothing is retained between calls.

use crate::model::location::{
    Location, LocationFilter, LocationPatch, LocationValidationError, NewLocation, PublicId,
};
use crate::model::user::User;
use crate::repo::executor::TransactionalExecutor;
use crate::repo::ownership::{OwnershipGuard, VerifiedLocation};
use crate::repo::public_id::PublicIdGenerator;
use crate::repo::query;
use crate::repo::user_repo::{CallerToken, IdentityResolver};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::{error, info, warn};
use rusqlite::Connection;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Typed failure of a location use-case.
#[derive(Debug)]
pub enum LocationServiceError {
    /// Caller did not resolve to a user.
    Unauthenticated,
    /// Caller payload is missing, blank or oversized.
    Validation(LocationValidationError),
    /// Target missing or owned by another user; the two are not distinguished.
    NotAuthorized,
    /// Id generation, composition or execution failed.
    Store(RepoError),
}

impl LocationServiceError {
    /// Reference status code for HTTP-style hosts.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated | Self::NotAuthorized => 401,
            Self::Validation(_) => 400,
            Self::Store(_) => 500,
        }
    }

    /// Stable code used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Validation(_) => "validation",
            Self::NotAuthorized => "not_authorized",
            Self::Store(_) => "store_failure",
        }
    }
}

impl Display for LocationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "user id not found in authorization token"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotAuthorized => write!(f, "not authorized to modify the specified location"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LocationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LocationValidationError> for LocationServiceError {
    fn from(value: LocationValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for LocationServiceError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

pub type ServiceResult<T> = Result<T, LocationServiceError>;

/// Query input for listing locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListLocationsRequest {
    /// Substring the location name must contain.
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of a create request; both fields required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
    pub address: String,
}

/// Body of a partial update; omitted or blank fields stay unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateLocationRequest {
    #[serde(rename = "id")]
    pub public_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Body of a delete request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteLocationRequest {
    #[serde(rename = "id")]
    pub public_id: String,
}

/// Owner-scoped location service over one shared connection.
///
/// Construct once and hand to the hosting layer; every call is independent.
pub struct LocationService<'conn, R: IdentityResolver, G: PublicIdGenerator> {
    executor: TransactionalExecutor<'conn>,
    guard: OwnershipGuard<'conn>,
    resolver: R,
    id_generator: G,
}

impl<'conn, R: IdentityResolver, G: PublicIdGenerator> LocationService<'conn, R, G> {
    /// Creates the service after checking that `conn` carries the schema.
    pub fn try_new(conn: &'conn Connection, resolver: R, id_generator: G) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        let executor = TransactionalExecutor::new(conn);
        Ok(Self {
            executor,
            guard: OwnershipGuard::new(executor),
            resolver,
            id_generator,
        })
    }

    /// Lists the caller's locations in store order.
    pub fn list(
        &self,
        caller: &CallerToken,
        request: &ListLocationsRequest,
    ) -> ServiceResult<Vec<Location>> {
        let started_at = Instant::now();
        let result = self.list_inner(caller, request);
        match &result {
            Ok(items) => info!(
                "event=location_list module=service status=ok count={} duration_ms={}",
                items.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("location_list", None, started_at, err),
        }
        result
    }

    /// Creates a location owned by the caller and returns its public id.
    pub fn create(
        &self,
        caller: &CallerToken,
        request: &CreateLocationRequest,
    ) -> ServiceResult<PublicId> {
        let started_at = Instant::now();
        let result = self.create_inner(caller, request);
        match &result {
            Ok(public_id) => info!(
                "event=location_create module=service status=ok public_id={} duration_ms={}",
                public_id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => log_failure("location_create", None, started_at, err),
        }
        result
    }

    /// Overwrites the supplied fields of one owned location.
    ///
    /// With no fields supplied the call still succeeds and only refreshes
    /// `updated_at`.
    pub fn update(&self, caller: &CallerToken, request: &UpdateLocationRequest) -> ServiceResult<()> {
        let started_at = Instant::now();
        let result = self.update_inner(caller, request);
        log_write_outcome("location_update", &request.public_id, started_at, &result);
        result
    }

    /// Deletes one owned location.
    pub fn delete(&self, caller: &CallerToken, request: &DeleteLocationRequest) -> ServiceResult<()> {
        let started_at = Instant::now();
        let result = self.delete_inner(caller, request);
        log_write_outcome("location_delete", &request.public_id, started_at, &result);
        result
    }

    fn list_inner(
        &self,
        caller: &CallerToken,
        request: &ListLocationsRequest,
    ) -> ServiceResult<Vec<Location>> {
        let user = self.authenticate(caller)?;
        let filter = LocationFilter::by_name(request.name.as_deref())?;

        let statement = query::list_locations(user.id, &filter);
        let locations = self.executor.run_read(&statement, |row| {
            Ok(Location {
                public_id: row.get("public_id")?,
                name: row.get("name")?,
                address: row.get("address")?,
                created_at: row.get("created_at")?,
                updated_at: row.get("updated_at")?,
            })
        })?;
        Ok(locations)
    }

    fn create_inner(
        &self,
        caller: &CallerToken,
        request: &CreateLocationRequest,
    ) -> ServiceResult<PublicId> {
        let user = self.authenticate(caller)?;
        let location = NewLocation::new(&request.name, &request.address)?;

        let public_id = self.id_generator.generate()?;
        let statement = query::insert_location(&public_id, user.id, &location);
        self.executor.run_write(&statement)?;
        Ok(public_id)
    }

    fn update_inner(&self, caller: &CallerToken, request: &UpdateLocationRequest) -> ServiceResult<()> {
        let user = self.authenticate(caller)?;
        let public_id = require_public_id(&request.public_id)?;
        let patch = LocationPatch::new(request.name.as_deref(), request.address.as_deref())?;

        let target = self.authorize(&user, public_id)?;
        let statement = query::update_location(&target, &patch, now_epoch_ms());
        self.write_verified(&statement)
    }

    fn delete_inner(&self, caller: &CallerToken, request: &DeleteLocationRequest) -> ServiceResult<()> {
        let user = self.authenticate(caller)?;
        let public_id = require_public_id(&request.public_id)?;

        let target = self.authorize(&user, public_id)?;
        let statement = query::delete_location(&target);
        self.write_verified(&statement)
    }

    fn authenticate(&self, caller: &CallerToken) -> ServiceResult<User> {
        self.resolver
            .resolve(caller)?
            .ok_or(LocationServiceError::Unauthenticated)
    }

    fn authorize(&self, user: &User, public_id: &str) -> ServiceResult<VerifiedLocation> {
        self.guard
            .verify(user, public_id)?
            .ok_or(LocationServiceError::NotAuthorized)
    }

    fn write_verified(&self, statement: &query::Statement) -> ServiceResult<()> {
        // Zero rows means the row vanished after verification.
        match self.executor.run_write(statement)? {
            0 => Err(LocationServiceError::NotAuthorized),
            _ => Ok(()),
        }
    }
}

fn require_public_id(public_id: &str) -> Result<&str, LocationValidationError> {
    let trimmed = public_id.trim();
    if trimmed.is_empty() {
        return Err(LocationValidationError::EmptyField("id"));
    }
    Ok(trimmed)
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

fn log_write_outcome(
    event: &'static str,
    public_id: &str,
    started_at: Instant,
    result: &ServiceResult<()>,
) {
    match result {
        Ok(()) => info!(
            "event={event} module=service status=ok public_id={} duration_ms={}",
            public_id.trim(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => log_failure(event, Some(public_id.trim()), started_at, err),
    }
}

fn log_failure(
    event: &'static str,
    public_id: Option<&str>,
    started_at: Instant,
    err: &LocationServiceError,
) {
    let public_id = public_id.unwrap_or("-");
    let duration_ms = started_at.elapsed().as_millis();
    match err {
        LocationServiceError::Store(cause) => error!(
            "event={event} module=service status=error error_code={} public_id={public_id} duration_ms={duration_ms} error={cause}",
            err.kind()
        ),
        _ => warn!(
            "event={event} module=service status=rejected error_code={} public_id={public_id} duration_ms={duration_ms}",
            err.kind()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{require_public_id, LocationServiceError};
    use crate::model::location::LocationValidationError;
    use crate::repo::RepoError;

    #[test]
    fn status_codes_follow_failure_category() {
        assert_eq!(LocationServiceError::Unauthenticated.status_code(), 401);
        assert_eq!(LocationServiceError::NotAuthorized.status_code(), 401);
        assert_eq!(
            LocationServiceError::Validation(LocationValidationError::EmptyField("name"))
                .status_code(),
            400
        );
        assert_eq!(
            LocationServiceError::Store(RepoError::IdGeneration("boom".to_string()))
                .status_code(),
            500
        );
    }

    #[test]
    fn blank_public_id_is_a_validation_error() {
        assert_eq!(
            require_public_id("  "),
            Err(LocationValidationError::EmptyField("id"))
        );
        assert_eq!(require_public_id(" abc "), Ok("abc"));
    }
}
