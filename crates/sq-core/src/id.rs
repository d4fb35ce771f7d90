//! ULID generation and validation for locally-minted entity ids
//!
//! Identities, projects, and phases all carry opaque locally-generated ids.
//! ULIDs keep them sortable by creation time, which the project history
//! relies on for stable ordering.

use crate::error::CoreError;

/// Generate a new ULID entity ID.
pub fn new_entity_id() -> String {
    ulid::Ulid::new().to_string()
}

/// Validate that a string is a well-formed ULID.
pub fn validate_entity_id(id: &str) -> Result<(), CoreError> {
    if id.len() != 26 {
        return Err(CoreError::InvalidEntityId(id.to_string()));
    }

    ulid::Ulid::from_string(id).map_err(|_| CoreError::InvalidEntityId(id.to_string()))?;

    Ok(())
}
