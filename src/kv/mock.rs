//! Expectation builders for scripting the storage engine.
//!
//! ```ignore
//! let mut mock = MockClient::<MemoryKv>::new();
//! mock.expect_delete_all().return_err(UpstreamError::Rejected("read-only".into()));
//!
//! let kv = KvClient::new(mock.client());
//! assert!(kv.delete_all().await.is_err());
//! mock.verify();
//! ```

use super::codec::WireKey;
use super::driver::{ListQuery, RawEntry};
use super::memory::{KvRequest, MemoryKv};
use crate::framework::mock::MockClient;
use crate::framework::UpstreamError;

impl MockClient<MemoryKv> {
    /// Expects a `get` call for the encoded `key`.
    pub fn expect_get(&mut self, key: WireKey) -> GetExpectation<'_> {
        GetExpectation { mock: self, key }
    }

    /// Expects a `list` call.
    pub fn expect_list(&mut self) -> ListExpectation<'_> {
        ListExpectation {
            mock: self,
            query: None,
        }
    }

    /// Expects a `delete_all` call.
    pub fn expect_delete_all(&mut self) -> DeleteAllExpectation<'_> {
        DeleteAllExpectation { mock: self }
    }

    /// Answers the next request, whatever it is, with `error`.
    pub fn fail_next(&mut self, error: UpstreamError) {
        self.expect(move |request| {
            match request {
                KvRequest::Get { respond_to, .. } => {
                    let _ = respond_to.send(Err(error));
                }
                KvRequest::GetBatch { respond_to, .. } | KvRequest::List { respond_to, .. } => {
                    let _ = respond_to.send(Err(error));
                }
                KvRequest::Put { respond_to, .. }
                | KvRequest::PutBatch { respond_to, .. }
                | KvRequest::Delete { respond_to, .. }
                | KvRequest::DeleteBatch { respond_to, .. }
                | KvRequest::DeleteAll { respond_to } => {
                    let _ = respond_to.send(Err(error));
                }
            }
            Ok(())
        });
    }
}

fn mismatch(expected: &str, got: &KvRequest) -> Result<(), String> {
    Err(format!("expected {expected}, got {got:?}"))
}

/// Builder for `get` expectations.
pub struct GetExpectation<'a> {
    mock: &'a mut MockClient<MemoryKv>,
    key: WireKey,
}

impl GetExpectation<'_> {
    /// Answers with a raw record, as the engine would store it.
    pub fn return_ok(self, record: Option<Vec<u8>>) {
        self.respond(Ok(record));
    }

    pub fn return_err(self, error: UpstreamError) {
        self.respond(Err(error));
    }

    fn respond(self, response: Result<Option<Vec<u8>>, UpstreamError>) {
        let expected = self.key;
        self.mock.expect(move |request| match request {
            KvRequest::Get { key, respond_to } => {
                let _ = respond_to.send(response);
                if key == expected {
                    Ok(())
                } else {
                    Err(format!("get: expected key {expected}, got {key}"))
                }
            }
            other => mismatch("Get", &other),
        });
    }
}

/// Builder for `list` expectations.
pub struct ListExpectation<'a> {
    mock: &'a mut MockClient<MemoryKv>,
    query: Option<ListQuery>,
}

impl ListExpectation<'_> {
    /// Also require the encoded query to equal `query`.
    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.query = Some(query);
        self
    }

    pub fn return_ok(self, entries: Vec<RawEntry>) {
        let expected = self.query;
        self.mock.expect(move |request| match request {
            KvRequest::List {
                query, respond_to, ..
            } => {
                let _ = respond_to.send(Ok(entries));
                match expected {
                    Some(expected) if expected != query => {
                        Err(format!("list: expected {expected:?}, got {query:?}"))
                    }
                    _ => Ok(()),
                }
            }
            other => mismatch("List", &other),
        });
    }
}

/// Builder for `delete_all` expectations.
pub struct DeleteAllExpectation<'a> {
    mock: &'a mut MockClient<MemoryKv>,
}

impl DeleteAllExpectation<'_> {
    pub fn return_ok(self) {
        self.respond(Ok(()));
    }

    pub fn return_err(self, error: UpstreamError) {
        self.respond(Err(error));
    }

    fn respond(self, response: Result<(), UpstreamError>) {
        self.mock.expect(move |request| match request {
            KvRequest::DeleteAll { respond_to } => {
                let _ = respond_to.send(response);
                Ok(())
            }
            other => mismatch("DeleteAll", &other),
        });
    }
}
