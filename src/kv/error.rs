//! Error types for the storage client.

use super::entry::Format;
use crate::framework::UpstreamError;
use thiserror::Error;

/// Errors returned by [`KvClient`](super::KvClient) and the key codec.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KvError {
    /// The list options do not describe exactly one query mode.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A key or value contains something that cannot be persisted.
    #[error("The type {type_name} in key {key} is not serializable: {reason}")]
    TypeNotSerializable {
        type_name: String,
        key: String,
        reason: String,
    },

    /// Stored bytes could not be read back in the requested format.
    #[error("Could not deserialize value in key {key}: {reason}{}", retry_hint(.retry_with))]
    DeserializeFailed {
        key: String,
        reason: String,
        /// The format the record was written with, when it differs from the one requested.
        retry_with: Option<Format>,
    },

    /// The storage engine failed.
    #[error("Storage engine failure: {0}")]
    Upstream(#[from] UpstreamError),
}

fn retry_hint(retry_with: &Option<Format>) -> String {
    match retry_with {
        Some(format) => format!(". Read it with format \"{format}\""),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_message_names_retry_format() {
        let err = KvError::DeserializeFailed {
            key: "\"blob\"".into(),
            reason: "stored as arrayBuffer".into(),
            retry_with: Some(Format::ArrayBuffer),
        };
        assert_eq!(
            err.to_string(),
            "Could not deserialize value in key \"blob\": stored as arrayBuffer. Read it with format \"arrayBuffer\""
        );
    }
}
