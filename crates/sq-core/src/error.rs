#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("Invalid entity ID '{0}': expected ULID format (26 chars Crockford Base32)")]
    InvalidEntityId(String),

    #[error("Remote store request failed: status {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("Remote store returned no id for inserted record")]
    RemoteIdMissing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_entity_id() {
        let err = CoreError::InvalidEntityId("bad-id".into());
        assert_eq!(
            err.to_string(),
            "Invalid entity ID 'bad-id': expected ULID format (26 chars Crockford Base32)"
        );
    }

    #[test]
    fn test_display_remote_status() {
        let err = CoreError::RemoteStatus {
            status: 503,
            body: "unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "Remote store request failed: status 503: unavailable"
        );
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }
}
