//! Statement composition for the `locations` table.
//!
//! # Responsibility
//! - Build the list/insert/partial-update/delete/ownership statements from
//!   typed inputs.
//!
//! # Invariants
//! - Builders are pure: no connection access, no clock access.
//! - Statement text only contains fixed column names and `?` placeholders;
//!   every caller-influenced value travels in `params`, including the
//!   `LIKE` pattern.
//! - Update/delete builders only accept a `VerifiedLocation`.

use crate::model::location::{LocationFilter, LocationPatch, NewLocation};
use crate::model::user::UserId;
use crate::repo::ownership::VerifiedLocation;
use rusqlite::types::Value;

const LOCATION_SELECT_SQL: &str = "SELECT
    public_id,
    name,
    address,
    created_at,
    updated_at
FROM locations";

const LIKE_ESCAPE: char = '\\';

/// Parameterized SQL statement: text plus positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}

/// Selects all locations owned by `owner`, optionally narrowed by a name
/// substring.
pub fn list_locations(owner: UserId, filter: &LocationFilter) -> Statement {
    let mut sql = format!("{LOCATION_SELECT_SQL} WHERE owner_id = ?");
    let mut params = vec![Value::Integer(owner)];

    if let Some(name) = filter.name_contains() {
        sql.push_str(" AND name LIKE ? ESCAPE '\\'");
        params.push(Value::Text(format!("%{}%", escape_like(name))));
    }

    sql.push_str(" ORDER BY id ASC;");
    Statement { sql, params }
}

/// Inserts one location; `created_at`/`updated_at` default in the store.
pub fn insert_location(public_id: &str, owner: UserId, location: &NewLocation) -> Statement {
    Statement {
        sql: "INSERT INTO locations (public_id, name, address, owner_id) VALUES (?, ?, ?, ?);"
            .to_string(),
        params: vec![
            Value::Text(public_id.to_string()),
            Value::Text(location.name().to_string()),
            Value::Text(location.address().to_string()),
            Value::Integer(owner),
        ],
    }
}

/// Updates only the fields present in `patch` and refreshes `updated_at`.
///
/// `updated_at` never moves backwards, even if `now_ms` lags the stored value.
pub fn update_location(target: &VerifiedLocation, patch: &LocationPatch, now_ms: i64) -> Statement {
    UpdateClauses::new()
        .set_if_present("name", patch.name())
        .set_if_present("address", patch.address())
        .finish(target, now_ms)
}

/// Deletes the verified location by public id.
pub fn delete_location(target: &VerifiedLocation) -> Statement {
    Statement {
        sql: "DELETE FROM locations WHERE public_id = ?;".to_string(),
        params: vec![Value::Text(target.public_id().to_string())],
    }
}

/// Looks up the internal id of `public_id` restricted to `owner`.
pub fn ownership_check(owner: UserId, public_id: &str) -> Statement {
    Statement {
        sql: "SELECT id, public_id FROM locations WHERE public_id = ? AND owner_id = ?;"
            .to_string(),
        params: vec![Value::Text(public_id.to_string()), Value::Integer(owner)],
    }
}

/// Set-clause accumulator for partial updates.
///
/// Each `set_if_present` call contributes at most one `column = ?` clause.
#[derive(Debug, Clone, Default)]
pub struct UpdateClauses {
    columns: Vec<&'static str>,
    params: Vec<Value>,
}

impl UpdateClauses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_if_present(mut self, column: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.columns.push(column);
            self.params.push(Value::Text(value.to_string()));
        }
        self
    }

    /// Number of caller-supplied set clauses (the timestamp is not counted).
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn finish(self, target: &VerifiedLocation, now_ms: i64) -> Statement {
        let mut assignments: Vec<String> = self
            .columns
            .iter()
            .map(|column| format!("{column} = ?"))
            .collect();
        assignments.push("updated_at = MAX(updated_at, ?)".to_string());

        let mut params = self.params;
        params.push(Value::Integer(now_ms));
        params.push(Value::Text(target.public_id().to_string()));

        Statement {
            sql: format!(
                "UPDATE locations SET {} WHERE public_id = ?;",
                assignments.join(", ")
            ),
            params,
        }
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{
        delete_location, escape_like, insert_location, list_locations, update_location,
        UpdateClauses,
    };
    use crate::model::location::{LocationFilter, LocationPatch, NewLocation};
    use crate::repo::ownership::VerifiedLocation;
    use rusqlite::types::Value;

    fn target() -> VerifiedLocation {
        VerifiedLocation::new(7, "loc-7".to_string())
    }

    #[test]
    fn list_without_filter_binds_only_owner() {
        let statement = list_locations(42, &LocationFilter::default());
        assert!(statement.sql().contains("WHERE owner_id = ?"));
        assert!(!statement.sql().contains("LIKE"));
        assert_eq!(statement.params(), &[Value::Integer(42)]);
    }

    #[test]
    fn list_filter_is_bound_as_escaped_pattern() {
        let filter = LocationFilter::by_name(Some("50%_off")).unwrap();
        let statement = list_locations(1, &filter);
        assert!(statement.sql().contains("owner_id = ? AND name LIKE ?"));
        assert!(!statement.sql().contains("50"));
        assert_eq!(
            statement.params()[1],
            Value::Text("%50\\%\\_off%".to_string())
        );
    }

    #[test]
    fn insert_binds_four_columns() {
        let location = NewLocation::new("Home", "1 Oak St").unwrap();
        let statement = insert_location("abc", 3, &location);
        assert_eq!(statement.sql().matches('?').count(), 4);
        assert_eq!(
            statement.params(),
            &[
                Value::Text("abc".to_string()),
                Value::Text("Home".to_string()),
                Value::Text("1 Oak St".to_string()),
                Value::Integer(3),
            ]
        );
    }

    #[test]
    fn update_sets_only_present_fields_plus_timestamp() {
        let patch = LocationPatch::new(None, Some("2 Oak St")).unwrap();
        let statement = update_location(&target(), &patch, 1_000);
        assert_eq!(
            statement.sql(),
            "UPDATE locations SET address = ?, updated_at = MAX(updated_at, ?) WHERE public_id = ?;"
        );
        assert_eq!(
            statement.params(),
            &[
                Value::Text("2 Oak St".to_string()),
                Value::Integer(1_000),
                Value::Text("loc-7".to_string()),
            ]
        );
    }

    #[test]
    fn update_without_fields_only_touches_timestamp() {
        let statement = update_location(&target(), &LocationPatch::default(), 5);
        assert_eq!(
            statement.sql(),
            "UPDATE locations SET updated_at = MAX(updated_at, ?) WHERE public_id = ?;"
        );
        assert_eq!(statement.params().len(), 2);
    }

    #[test]
    fn update_clauses_skip_absent_values() {
        let clauses = UpdateClauses::new()
            .set_if_present("name", None)
            .set_if_present("address", Some("x"));
        assert_eq!(clauses.len(), 1);
        assert!(UpdateClauses::new().set_if_present("name", None).is_empty());
    }

    #[test]
    fn delete_targets_verified_public_id() {
        let statement = delete_location(&target());
        assert_eq!(statement.sql(), "DELETE FROM locations WHERE public_id = ?;");
        assert_eq!(statement.params(), &[Value::Text("loc-7".to_string())]);
    }

    #[test]
    fn escape_like_leaves_plain_text_alone() {
        assert_eq!(escape_like("oak"), "oak");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
