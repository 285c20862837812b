//! Location domain model and input validation.
//!
//! # Responsibility
//! - Define the caller-facing `Location` record.
//! - Normalize and validate create/update/list inputs before any store access.
//!
//! # Invariants
//! - `NewLocation` always holds non-blank `name` and `address`.
//! - `LocationPatch` only holds fields that were supplied and non-blank.
//! - Create/update text is trimmed; filter text is kept verbatim. All
//!   values are at most `MAX_FIELD_CHARS` characters.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound for name, address and name filter inputs.
pub const MAX_FIELD_CHARS: usize = 512;

/// Externally visible location identifier.
pub type PublicId = String;

/// Internal row id of a location; never exposed to callers.
pub type LocationRowId = i64;

/// Location record as returned to its owner.
///
/// Serialized with the public id as `id` and camelCase timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "id")]
    pub public_id: PublicId,
    pub name: String,
    pub address: String,
    /// Unix epoch milliseconds, set once by the store.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed by every successful update.
    pub updated_at: i64,
}

/// Caller payload rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationValidationError {
    /// Required field missing or blank after trim.
    EmptyField(&'static str),
    /// Field longer than `MAX_FIELD_CHARS`.
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
    },
}

impl Display for LocationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "field `{field}` is required"),
            Self::FieldTooLong { field, max_chars } => {
                write!(f, "field `{field}` exceeds {max_chars} characters")
            }
        }
    }
}

impl Error for LocationValidationError {}

/// Validated input for the insert path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    name: String,
    address: String,
}

impl NewLocation {
    pub fn new(
        name: impl AsRef<str>,
        address: impl AsRef<str>,
    ) -> Result<Self, LocationValidationError> {
        Ok(Self {
            name: normalize_required("name", name.as_ref())?,
            address: normalize_required("address", address.as_ref())?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Validated input for the partial update path.
///
/// Omitted and blank fields are both treated as "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationPatch {
    name: Option<String>,
    address: Option<String>,
}

impl LocationPatch {
    pub fn new(
        name: Option<&str>,
        address: Option<&str>,
    ) -> Result<Self, LocationValidationError> {
        Ok(Self {
            name: normalize_optional("name", name)?,
            address: normalize_optional("address", address)?,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

/// Validated list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilter {
    name_contains: Option<String>,
}

impl LocationFilter {
    /// Builds a filter matching names that contain `name` as a substring.
    ///
    /// Only an absent or empty `name` yields an unfiltered listing; the
    /// text is matched as given, surrounding whitespace included.
    pub fn by_name(name: Option<&str>) -> Result<Self, LocationValidationError> {
        let Some(name) = name.filter(|value| !value.is_empty()) else {
            return Ok(Self::default());
        };
        ensure_max_chars("name", name)?;
        Ok(Self {
            name_contains: Some(name.to_string()),
        })
    }

    pub fn name_contains(&self) -> Option<&str> {
        self.name_contains.as_deref()
    }
}

fn normalize_required(
    field: &'static str,
    value: &str,
) -> Result<String, LocationValidationError> {
    normalize_optional(field, Some(value))?.ok_or(LocationValidationError::EmptyField(field))
}

fn normalize_optional(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, LocationValidationError> {
    let Some(trimmed) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    ensure_max_chars(field, trimmed)?;
    Ok(Some(trimmed.to_string()))
}

fn ensure_max_chars(field: &'static str, value: &str) -> Result<(), LocationValidationError> {
    if value.chars().count() > MAX_FIELD_CHARS {
        return Err(LocationValidationError::FieldTooLong {
            field,
            max_chars: MAX_FIELD_CHARS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{LocationFilter, LocationPatch, LocationValidationError, NewLocation};

    #[test]
    fn new_location_trims_and_requires_both_fields() {
        let location = NewLocation::new("  Home ", "1 Oak St").unwrap();
        assert_eq!(location.name(), "Home");

        let err = NewLocation::new("Home", "   ").unwrap_err();
        assert_eq!(err, LocationValidationError::EmptyField("address"));
    }

    #[test]
    fn patch_treats_blank_values_as_absent() {
        let patch = LocationPatch::new(Some(""), Some(" 2 Oak St ")).unwrap();
        assert_eq!(patch.name(), None);
        assert_eq!(patch.address(), Some("2 Oak St"));
        assert_eq!(
            LocationPatch::new(None, Some("\t")).unwrap(),
            LocationPatch::default()
        );
    }

    #[test]
    fn filter_keeps_whitespace_and_only_drops_empty_text() {
        let filter = LocationFilter::by_name(Some(" Oak")).unwrap();
        assert_eq!(filter.name_contains(), Some(" Oak"));
        let spaces = LocationFilter::by_name(Some("   ")).unwrap();
        assert_eq!(spaces.name_contains(), Some("   "));
        assert_eq!(
            LocationFilter::by_name(Some("")).unwrap(),
            LocationFilter::default()
        );
    }

    #[test]
    fn oversized_filter_is_rejected() {
        let long = "x".repeat(super::MAX_FIELD_CHARS + 1);
        let err = LocationFilter::by_name(Some(long.as_str())).unwrap_err();
        assert!(matches!(
            err,
            LocationValidationError::FieldTooLong { field: "name", .. }
        ));
    }
}
