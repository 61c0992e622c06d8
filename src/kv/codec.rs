//! # Key Codec
//!
//! Order-preserving byte encoding of [`Key`]s: for any keys `a` and `b`,
//! `encode(a).cmp(&encode(b)) == a.cmp(b)`. The storage engine only ever sees
//! [`WireKey`]s, and prefix and range listing are plain byte comparisons.
//!
//! ## Layout
//!
//! A key is the concatenation of its component encodings. Each component starts
//! with a kind tag:
//!
//! | Tag | Kind | Payload |
//! |-----|------|---------|
//! | `0x01` | undefined | - |
//! | `0x02` | null | - |
//! | `0x03` | false | - |
//! | `0x04` | true | - |
//! | `0x05` | number | 8 bytes, sign-adjusted IEEE bits |
//! | `0x06` | bigint | 16 bytes, sign-flipped two's complement |
//! | `0x07` | string | escaped UTF-8, `0x00` terminated |
//! | `0x08` | bytes | escaped bytes, `0x00` terminated |
//! | `0x09` | array | elements, then `0x00` |
//! | `0x0A` | object | `0x01` + escaped key + value per entry, then `0x00` |
//!
//! Escaping writes `0x00` as `0x00 0xFF`. No tag is `0x00` or `0xFF`, so every
//! component encoding is self-delimiting and a key's encoding is a byte prefix
//! of the encoding of every key extending it.

use super::error::KvError;
use super::key::{Key, Value};
use std::collections::BTreeMap;
use std::fmt;

const TAG_UNDEFINED: u8 = 0x01;
const TAG_NULL: u8 = 0x02;
const TAG_FALSE: u8 = 0x03;
const TAG_TRUE: u8 = 0x04;
const TAG_NUMBER: u8 = 0x05;
const TAG_BIGINT: u8 = 0x06;
const TAG_STRING: u8 = 0x07;
const TAG_BYTES: u8 = 0x08;
const TAG_ARRAY: u8 = 0x09;
const TAG_OBJECT: u8 = 0x0A;

const END: u8 = 0x00;
const ESCAPE: u8 = 0xFF;
const ENTRY: u8 = 0x01;

const SIGN_BIT: u64 = 1 << 63;
const BIGINT_SIGN_BIT: u128 = 1 << 127;

/// An encoded key, as stored by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireKey(Vec<u8>);

impl WireKey {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn starts_with(&self, prefix: &WireKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for WireKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Encodes a key.
///
/// Fails with [`KvError::TypeNotSerializable`] if any component holds a
/// [`Handle`](super::Handle).
pub fn encode(key: &Key) -> Result<WireKey, KvError> {
    let mut out = Vec::new();
    for component in key.components() {
        encode_value(component, &mut out).map_err(|type_name| KvError::TypeNotSerializable {
            type_name,
            key: key.to_string(),
            reason: "platform handles cannot be used in keys".into(),
        })?;
    }
    Ok(WireKey(out))
}

/// Decodes bytes produced by [`encode`].
pub fn decode(wire: &WireKey) -> Result<Key, KvError> {
    let mut reader = Reader {
        bytes: wire.as_bytes(),
        pos: 0,
    };
    let mut components = Vec::new();
    while !reader.done() {
        let value = reader.value().map_err(|reason| KvError::DeserializeFailed {
            key: wire.to_string(),
            reason,
            retry_with: None,
        })?;
        components.push(value);
    }
    Ok(Key::new(components))
}

/// Returns the handle's kind on failure.
fn encode_value(value: &Value, out: &mut Vec<u8>) -> Result<(), String> {
    match value {
        Value::Undefined => out.push(TAG_UNDEFINED),
        Value::Null => out.push(TAG_NULL),
        Value::Bool(false) => out.push(TAG_FALSE),
        Value::Bool(true) => out.push(TAG_TRUE),
        Value::Number(n) => {
            out.push(TAG_NUMBER);
            let bits = n.to_bits();
            let ordered = if bits & SIGN_BIT == 0 {
                bits ^ SIGN_BIT
            } else {
                !bits
            };
            out.extend_from_slice(&ordered.to_be_bytes());
        }
        Value::BigInt(n) => {
            out.push(TAG_BIGINT);
            let ordered = (*n as u128) ^ BIGINT_SIGN_BIT;
            out.extend_from_slice(&ordered.to_be_bytes());
        }
        Value::String(s) => {
            out.push(TAG_STRING);
            escape(s.as_bytes(), out);
        }
        Value::Bytes(b) => {
            out.push(TAG_BYTES);
            escape(b, out);
        }
        Value::Array(items) => {
            out.push(TAG_ARRAY);
            for item in items {
                encode_value(item, out)?;
            }
            out.push(END);
        }
        Value::Object(entries) => {
            out.push(TAG_OBJECT);
            for (k, v) in entries {
                out.push(ENTRY);
                escape(k.as_bytes(), out);
                encode_value(v, out)?;
            }
            out.push(END);
        }
        Value::Handle(handle) => return Err(handle.kind.clone()),
    }
    Ok(())
}

fn escape(bytes: &[u8], out: &mut Vec<u8>) {
    for &b in bytes {
        out.push(b);
        if b == END {
            out.push(ESCAPE);
        }
    }
    out.push(END);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn done(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn byte(&mut self) -> Result<u8, String> {
        let b = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| format!("unexpected end of key at byte {}", self.pos))?;
        self.pos += 1;
        Ok(b)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], String> {
        let end = self.pos + N;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| format!("truncated {N}-byte payload at byte {}", self.pos))?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn unescape(&mut self) -> Result<Vec<u8>, String> {
        let mut out = Vec::new();
        loop {
            let b = self.byte()?;
            if b != END {
                out.push(b);
            } else if self.peek() == Some(ESCAPE) {
                self.pos += 1;
                out.push(END);
            } else {
                return Ok(out);
            }
        }
    }

    fn string(&mut self) -> Result<String, String> {
        String::from_utf8(self.unescape()?).map_err(|e| format!("invalid UTF-8 in string: {e}"))
    }

    fn value(&mut self) -> Result<Value, String> {
        let tag = self.byte()?;
        let value = match tag {
            TAG_UNDEFINED => Value::Undefined,
            TAG_NULL => Value::Null,
            TAG_FALSE => Value::Bool(false),
            TAG_TRUE => Value::Bool(true),
            TAG_NUMBER => {
                let ordered = u64::from_be_bytes(self.array()?);
                let bits = if ordered & SIGN_BIT != 0 {
                    ordered ^ SIGN_BIT
                } else {
                    !ordered
                };
                Value::Number(f64::from_bits(bits))
            }
            TAG_BIGINT => {
                let ordered = u128::from_be_bytes(self.array()?);
                Value::BigInt((ordered ^ BIGINT_SIGN_BIT) as i128)
            }
            TAG_STRING => Value::String(self.string()?),
            TAG_BYTES => Value::Bytes(self.unescape()?),
            TAG_ARRAY => {
                let mut items = Vec::new();
                while self.peek() != Some(END) {
                    items.push(self.value()?);
                }
                self.pos += 1;
                Value::Array(items)
            }
            TAG_OBJECT => {
                let mut entries = BTreeMap::new();
                loop {
                    match self.byte()? {
                        END => break,
                        ENTRY => {
                            let k = self.string()?;
                            let v = self.value()?;
                            entries.insert(k, v);
                        }
                        other => return Err(format!("bad object marker {other:#04x}")),
                    }
                }
                Value::Object(entries)
            }
            other => return Err(format!("unknown type tag {other:#04x} at byte {}", self.pos - 1)),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::key::Handle;

    fn key(components: Vec<Value>) -> Key {
        Key::new(components)
    }

    fn sample_keys() -> Vec<Key> {
        vec![
            key(vec![]),
            key(vec![Value::Undefined]),
            key(vec![Value::Null]),
            key(vec![Value::Bool(false)]),
            key(vec![Value::Bool(true)]),
            key(vec![Value::Number(f64::NEG_INFINITY)]),
            key(vec![Value::Number(-2.5)]),
            key(vec![Value::Number(-0.0)]),
            key(vec![Value::Number(0.0)]),
            key(vec![Value::Number(1.0)]),
            key(vec![Value::Number(1e300)]),
            key(vec![Value::BigInt(-5)]),
            key(vec![Value::BigInt(5)]),
            key(vec![Value::from("")]),
            key(vec![Value::from("a")]),
            key(vec![Value::from("a"), Value::Null]),
            key(vec![Value::from("a\0")]),
            key(vec![Value::from("a\u{1}")]),
            key(vec![Value::from("b")]),
            key(vec![Value::bytes(vec![0u8])]),
            key(vec![Value::Array(vec![])]),
            key(vec![Value::Array(vec![Value::from(1)])]),
            key(vec![Value::Array(vec![Value::from(1), Value::from(2)])]),
            key(vec![Value::object([("a", 1)])]),
            key(vec![Value::object([("a", 1), ("b", 0)])]),
            key(vec![Value::object([("ab", 0)])]),
        ]
    }

    #[test]
    fn test_encoding_preserves_order() {
        let keys = sample_keys();
        for a in &keys {
            for b in &keys {
                let (wa, wb) = (encode(a).unwrap(), encode(b).unwrap());
                assert_eq!(wa.cmp(&wb), a.cmp(b), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_decode_inverts_encode() {
        for k in sample_keys() {
            assert_eq!(decode(&encode(&k).unwrap()).unwrap(), k);
        }
    }

    #[test]
    fn test_prefix_key_encodes_to_byte_prefix() {
        let parent = key(vec![Value::from("users"), Value::from(7)]);
        let child = parent.clone().join(Value::object([("field", "name")]));
        assert!(encode(&child).unwrap().starts_with(&encode(&parent).unwrap()));
    }

    #[test]
    fn test_handle_is_rejected() {
        let k = key(vec![Value::from("socket"), Handle::new("TcpStream", 3).into()]);
        match encode(&k) {
            Err(KvError::TypeNotSerializable { type_name, .. }) => assert_eq!(type_name, "TcpStream"),
            other => panic!("expected TypeNotSerializable, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_bytes_fail() {
        for bytes in [vec![0x05, 0x00], vec![0x07, b'a'], vec![0x42], vec![0x0A, 0x07]] {
            let err = decode(&WireKey::from_bytes(bytes)).unwrap_err();
            assert!(matches!(err, KvError::DeserializeFailed { .. }));
        }
    }
}
