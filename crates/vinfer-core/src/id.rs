//! Prefixed unique identifiers.

use uuid::Uuid;

/// Generate a new unique id with an entity-kind prefix, e.g. `job-<uuid>`.
#[must_use]
pub fn entity_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}
