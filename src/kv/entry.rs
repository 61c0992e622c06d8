//! Stored values and their on-disk record format.
//!
//! A record is one format tag byte followed by the payload: `bincode` of the
//! [`Value`] for [`Format::Value`], the raw bytes for [`Format::ArrayBuffer`].

use super::error::KvError;
use super::key::{Key, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

const VALUE_TAG: u8 = 0x01;
const ARRAY_BUFFER_TAG: u8 = 0x02;

/// How a value is written and read back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Format {
    /// Any serializable [`Value`].
    #[default]
    Value,
    /// Opaque bytes, stored verbatim.
    ArrayBuffer,
}

impl Format {
    fn tag(self) -> u8 {
        match self {
            Format::Value => VALUE_TAG,
            Format::ArrayBuffer => ARRAY_BUFFER_TAG,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            VALUE_TAG => Some(Format::Value),
            ARRAY_BUFFER_TAG => Some(Format::ArrayBuffer),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Value => "value",
            Format::ArrayBuffer => "arrayBuffer",
        })
    }
}

/// A value read from storage, shaped by the format it was read with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Value(Value),
    ArrayBuffer(Vec<u8>),
}

impl Entry {
    pub fn format(&self) -> Format {
        match self {
            Entry::Value(_) => Format::Value,
            Entry::ArrayBuffer(_) => Format::ArrayBuffer,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Entry::Value(value) => Some(value),
            Entry::ArrayBuffer(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Entry::ArrayBuffer(bytes) => Some(bytes),
            Entry::Value(_) => None,
        }
    }

    /// The entry as a [`Value`]; array buffers become [`Value::Bytes`].
    pub fn into_value(self) -> Value {
        match self {
            Entry::Value(value) => value,
            Entry::ArrayBuffer(bytes) => Value::Bytes(bytes),
        }
    }
}

/// Encodes `value` as a record in `format`.
pub fn serialize(key: &Key, value: &Value, format: Format) -> Result<Vec<u8>, KvError> {
    let not_serializable = |type_name: &str, reason: String| KvError::TypeNotSerializable {
        type_name: type_name.to_string(),
        key: key.to_string(),
        reason,
    };

    let mut record = vec![format.tag()];
    match format {
        Format::Value => {
            if let Some(handle) = value.find_handle() {
                return Err(not_serializable(
                    &handle.kind,
                    "platform handles cannot be persisted; store the data as bytes instead".into(),
                ));
            }
            let payload = bincode::serialize(value)
                .map_err(|e| not_serializable(value.type_name(), e.to_string()))?;
            record.extend_from_slice(&payload);
        }
        Format::ArrayBuffer => match value {
            Value::Bytes(bytes) => record.extend_from_slice(bytes),
            other => {
                return Err(not_serializable(
                    other.type_name(),
                    "value must be bytes when the format is \"arrayBuffer\"".into(),
                ))
            }
        },
    }
    Ok(record)
}

/// Decodes a record, requiring it to have been written in `requested` format.
pub fn deserialize(key: &Key, record: &[u8], requested: Format) -> Result<Entry, KvError> {
    let failed = |reason: String, retry_with: Option<Format>| KvError::DeserializeFailed {
        key: key.to_string(),
        reason,
        retry_with,
    };

    let (&tag, payload) = record
        .split_first()
        .ok_or_else(|| failed("empty record".into(), None))?;
    let stored =
        Format::from_tag(tag).ok_or_else(|| failed(format!("unknown format tag {tag:#04x}"), None))?;

    if stored != requested {
        return Err(failed(
            format!("stored as \"{stored}\", read as \"{requested}\""),
            Some(stored),
        ));
    }

    match stored {
        Format::Value => bincode::deserialize(payload)
            .map(Entry::Value)
            .map_err(|e| failed(e.to_string(), None)),
        Format::ArrayBuffer => Ok(Entry::ArrayBuffer(payload.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::key::Handle;

    #[test]
    fn test_value_record_round_trips_nested_values() {
        let key = Key::single("profile");
        let value = Value::object([
            ("name", Value::from("ada")),
            ("score", Value::BigInt(1 << 100)),
            ("tags", Value::Array(vec![Value::Null, Value::Bool(true)])),
        ]);
        let record = serialize(&key, &value, Format::Value).unwrap();
        assert_eq!(record[0], VALUE_TAG);
        assert_eq!(
            deserialize(&key, &record, Format::Value).unwrap(),
            Entry::Value(value)
        );
    }

    #[test]
    fn test_array_buffer_requires_bytes() {
        let key = Key::single("blob");
        let err = serialize(&key, &Value::from("text"), Format::ArrayBuffer).unwrap_err();
        assert!(matches!(err, KvError::TypeNotSerializable { ref type_name, .. } if type_name == "string"));

        let record = serialize(&key, &Value::bytes(vec![1, 0, 2]), Format::ArrayBuffer).unwrap();
        assert_eq!(record, vec![ARRAY_BUFFER_TAG, 1, 0, 2]);
    }

    #[test]
    fn test_handle_value_is_not_serializable() {
        let key = Key::single("k");
        let value = Value::Array(vec![Handle::new("CryptoKey", 9).into()]);
        let err = serialize(&key, &value, Format::Value).unwrap_err();
        assert!(err.to_string().contains("CryptoKey"));
    }

    #[test]
    fn test_format_mismatch_names_stored_format() {
        let key = Key::single("blob");
        let record = serialize(&key, &Value::bytes(vec![7]), Format::ArrayBuffer).unwrap();
        let err = deserialize(&key, &record, Format::Value).unwrap_err();
        assert_eq!(
            err,
            KvError::DeserializeFailed {
                key: "\"blob\"".into(),
                reason: "stored as \"arrayBuffer\", read as \"value\"".into(),
                retry_with: Some(Format::ArrayBuffer),
            }
        );
    }
}
