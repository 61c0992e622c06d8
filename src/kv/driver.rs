//! The seam between [`KvClient`](super::KvClient) and a storage engine.
//!
//! Engines deal only in [`WireKey`]s and opaque record bytes; encoding, format
//! checks and option validation stay in the client.

use super::codec::WireKey;
use crate::framework::UpstreamError;
use async_trait::async_trait;

/// A stored record as returned by an engine.
pub type RawEntry = (WireKey, Vec<u8>);

/// Which keys a list call covers, in encoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListQuery {
    All,
    /// Keys whose encoding starts with these bytes.
    Prefix(WireKey),
    /// `start <= key <= end`.
    RangeInclusive(WireKey, WireKey),
    /// `start < key <= end`.
    RangeExclusive(WireKey, WireKey),
}

impl ListQuery {
    pub fn matches(&self, key: &WireKey) -> bool {
        match self {
            ListQuery::All => true,
            ListQuery::Prefix(prefix) => key.starts_with(prefix),
            ListQuery::RangeInclusive(start, end) => start <= key && key <= end,
            ListQuery::RangeExclusive(start, end) => start < key && key <= end,
        }
    }
}

/// A storage engine.
///
/// `list` returns matches in ascending key order, or descending when `reverse`
/// is set, truncated to `limit` after ordering. Batch calls are a single round
/// trip but carry no atomicity guarantee.
#[async_trait]
pub trait KvDriver: Send + Sync {
    async fn get(&self, key: WireKey) -> Result<Option<Vec<u8>>, UpstreamError>;

    /// Returns only the keys that exist.
    async fn get_batch(&self, keys: Vec<WireKey>) -> Result<Vec<RawEntry>, UpstreamError>;

    async fn list(
        &self,
        query: ListQuery,
        reverse: bool,
        limit: Option<usize>,
    ) -> Result<Vec<RawEntry>, UpstreamError>;

    async fn put(&self, key: WireKey, record: Vec<u8>) -> Result<(), UpstreamError>;

    async fn put_batch(&self, entries: Vec<RawEntry>) -> Result<(), UpstreamError>;

    async fn delete(&self, key: WireKey) -> Result<(), UpstreamError>;

    async fn delete_batch(&self, keys: Vec<WireKey>) -> Result<(), UpstreamError>;

    async fn delete_all(&self) -> Result<(), UpstreamError>;
}
