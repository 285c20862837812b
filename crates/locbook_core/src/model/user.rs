//! Caller identity as seen by the core.

/// Internal row id of a user; never exposed to callers.
pub type UserId = i64;

/// Resolved caller identity.
///
/// Owned by the identity resolver's storage. The core only holds copies for
/// the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub public_id: String,
}
