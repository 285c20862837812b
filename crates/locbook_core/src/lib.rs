//! Core domain logic for locbook.
//! This crate owns the access-controlled mutation pipeline for per-user
//! location records.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::location::{
    Location, LocationFilter, LocationPatch, LocationValidationError, NewLocation, PublicId,
    MAX_FIELD_CHARS,
};
pub use model::user::{User, UserId};
pub use repo::executor::TransactionalExecutor;
pub use repo::ownership::{OwnershipGuard, VerifiedLocation};
pub use repo::public_id::{PublicIdGenerator, RandomPublicIdGenerator};
pub use repo::query::Statement;
pub use repo::user_repo::{CallerToken, IdentityResolver, SqliteUserDirectory};
pub use repo::{RepoError, RepoResult};
pub use service::location_service::{
    CreateLocationRequest, DeleteLocationRequest, ListLocationsRequest, LocationService,
    LocationServiceError, ServiceResult, UpdateLocationRequest,
};
