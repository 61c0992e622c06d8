//! # In-Memory Storage Engine
//!
//! A [`Backend`] holding encoded records in a `BTreeMap`, so iteration order is
//! encoded-key order and listing is a range scan.

use super::codec::WireKey;
use super::driver::{KvDriver, ListQuery, RawEntry};
use crate::framework::{Backend, Response, ServiceClient, UpstreamError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::warn;

/// Client half of a running [`MemoryKv`].
pub type EngineClient = ServiceClient<MemoryKv>;

/// Requests understood by the [`MemoryKv`] engine.
#[derive(Debug)]
pub enum KvRequest {
    Get {
        key: WireKey,
        respond_to: Response<Option<Vec<u8>>>,
    },
    GetBatch {
        keys: Vec<WireKey>,
        respond_to: Response<Vec<RawEntry>>,
    },
    List {
        query: ListQuery,
        reverse: bool,
        limit: Option<usize>,
        respond_to: Response<Vec<RawEntry>>,
    },
    Put {
        key: WireKey,
        record: Vec<u8>,
        respond_to: Response<()>,
    },
    PutBatch {
        entries: Vec<RawEntry>,
        respond_to: Response<()>,
    },
    Delete {
        key: WireKey,
        respond_to: Response<()>,
    },
    DeleteBatch {
        keys: Vec<WireKey>,
        respond_to: Response<()>,
    },
    DeleteAll {
        respond_to: Response<()>,
    },
}

/// Encoded records for a single actor's storage.
#[derive(Debug, Default)]
pub struct MemoryKv {
    records: BTreeMap<WireKey, Vec<u8>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, query: &ListQuery, reverse: bool, limit: Option<usize>) -> Vec<RawEntry> {
        let bounds = match query {
            ListQuery::All => (Bound::Unbounded, Bound::Unbounded),
            ListQuery::Prefix(prefix) => (Bound::Included(prefix.clone()), Bound::Unbounded),
            ListQuery::RangeInclusive(start, end) | ListQuery::RangeExclusive(start, end) => {
                if start > end {
                    return Vec::new();
                }
                let lower = match query {
                    ListQuery::RangeExclusive(..) => Bound::Excluded(start.clone()),
                    _ => Bound::Included(start.clone()),
                };
                (lower, Bound::Included(end.clone()))
            }
        };

        let mut found: Vec<RawEntry> = self
            .records
            .range(bounds)
            .take_while(|(key, _)| match query {
                ListQuery::Prefix(prefix) => key.starts_with(prefix),
                _ => true,
            })
            .map(|(key, record)| (key.clone(), record.clone()))
            .collect();

        if reverse {
            found.reverse();
        }
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        found
    }
}

impl Backend for MemoryKv {
    type Request = KvRequest;
    const NAME: &'static str = "kv";

    fn handle(&mut self, request: KvRequest) {
        match request {
            KvRequest::Get { key, respond_to } => {
                let _ = respond_to.send(Ok(self.records.get(&key).cloned()));
            }
            KvRequest::GetBatch { keys, respond_to } => {
                let found = keys
                    .into_iter()
                    .filter_map(|key| {
                        let record = self.records.get(&key)?.clone();
                        Some((key, record))
                    })
                    .collect();
                let _ = respond_to.send(Ok(found));
            }
            KvRequest::List {
                query,
                reverse,
                limit,
                respond_to,
            } => {
                let _ = respond_to.send(Ok(self.list(&query, reverse, limit)));
            }
            KvRequest::Put {
                key,
                record,
                respond_to,
            } => {
                self.records.insert(key, record);
                let _ = respond_to.send(Ok(()));
            }
            KvRequest::PutBatch {
                entries,
                respond_to,
            } => {
                self.records.extend(entries);
                let _ = respond_to.send(Ok(()));
            }
            KvRequest::Delete { key, respond_to } => {
                self.records.remove(&key);
                let _ = respond_to.send(Ok(()));
            }
            KvRequest::DeleteBatch { keys, respond_to } => {
                for key in &keys {
                    self.records.remove(key);
                }
                let _ = respond_to.send(Ok(()));
            }
            KvRequest::DeleteAll { respond_to } => {
                warn!(records = self.records.len(), "Deleting all records");
                self.records.clear();
                let _ = respond_to.send(Ok(()));
            }
        }
    }

    fn size(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl KvDriver for ServiceClient<MemoryKv> {
    async fn get(&self, key: WireKey) -> Result<Option<Vec<u8>>, UpstreamError> {
        self.call(|respond_to| KvRequest::Get { key, respond_to }).await
    }

    async fn get_batch(&self, keys: Vec<WireKey>) -> Result<Vec<RawEntry>, UpstreamError> {
        self.call(|respond_to| KvRequest::GetBatch { keys, respond_to })
            .await
    }

    async fn list(
        &self,
        query: ListQuery,
        reverse: bool,
        limit: Option<usize>,
    ) -> Result<Vec<RawEntry>, UpstreamError> {
        self.call(|respond_to| KvRequest::List {
            query,
            reverse,
            limit,
            respond_to,
        })
        .await
    }

    async fn put(&self, key: WireKey, record: Vec<u8>) -> Result<(), UpstreamError> {
        self.call(|respond_to| KvRequest::Put {
            key,
            record,
            respond_to,
        })
        .await
    }

    async fn put_batch(&self, entries: Vec<RawEntry>) -> Result<(), UpstreamError> {
        self.call(|respond_to| KvRequest::PutBatch {
            entries,
            respond_to,
        })
        .await
    }

    async fn delete(&self, key: WireKey) -> Result<(), UpstreamError> {
        self.call(|respond_to| KvRequest::Delete { key, respond_to })
            .await
    }

    async fn delete_batch(&self, keys: Vec<WireKey>) -> Result<(), UpstreamError> {
        self.call(|respond_to| KvRequest::DeleteBatch { keys, respond_to })
            .await
    }

    async fn delete_all(&self) -> Result<(), UpstreamError> {
        self.call(|respond_to| KvRequest::DeleteAll { respond_to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(bytes: &[u8]) -> WireKey {
        WireKey::from_bytes(bytes.to_vec())
    }

    fn engine() -> MemoryKv {
        let mut kv = MemoryKv::new();
        for key in [vec![1u8], vec![1, 2], vec![1, 3], vec![2], vec![3]] {
            kv.records.insert(wire(&key), key);
        }
        kv
    }

    fn keys(entries: Vec<RawEntry>) -> Vec<Vec<u8>> {
        entries.into_iter().map(|(k, _)| k.into_bytes()).collect()
    }

    #[test]
    fn test_prefix_scan() {
        let kv = engine();
        let found = kv.list(&ListQuery::Prefix(wire(&[1])), false, None);
        assert_eq!(keys(found), vec![vec![1], vec![1, 2], vec![1, 3]]);
    }

    #[test]
    fn test_ranges() {
        let kv = engine();
        let inclusive = kv.list(&ListQuery::RangeInclusive(wire(&[1, 2]), wire(&[2])), false, None);
        assert_eq!(keys(inclusive), vec![vec![1, 2], vec![1, 3], vec![2]]);

        let exclusive = kv.list(&ListQuery::RangeExclusive(wire(&[1, 2]), wire(&[2])), false, None);
        assert_eq!(keys(exclusive), vec![vec![1, 3], vec![2]]);

        let inverted = kv.list(&ListQuery::RangeInclusive(wire(&[3]), wire(&[1])), false, None);
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_reverse_then_limit() {
        let kv = engine();
        let found = kv.list(&ListQuery::All, true, Some(2));
        assert_eq!(keys(found), vec![vec![3], vec![2]]);
    }

    #[tokio::test]
    async fn test_driver_over_service() {
        let (actor, client) = crate::framework::ServiceActor::new(8, MemoryKv::new());
        tokio::spawn(actor.run());

        client.put(wire(&[9]), vec![42]).await.unwrap();
        assert_eq!(client.get(wire(&[9])).await.unwrap(), Some(vec![42]));

        let batch = client.get_batch(vec![wire(&[9]), wire(&[8])]).await.unwrap();
        assert_eq!(batch, vec![(wire(&[9]), vec![42])]);

        client.delete_all().await.unwrap();
        assert_eq!(client.get(wire(&[9])).await.unwrap(), None);
    }
}
