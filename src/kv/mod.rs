//! # Structured-Key Storage
//!
//! Durable per-actor storage addressed by multi-part keys such as
//! `["users", 42, "profile"]`. Components are self-describing [`Value`]s, and
//! keys sort by a total structural order that the wire encoding preserves, so
//! prefix and range listing happen on raw bytes inside the engine.
//!
//! ## Structure
//!
//! - [`key`] - [`Value`], [`Key`] and their order
//! - [`codec`] - Order-preserving [`WireKey`] encoding
//! - [`entry`] - Record [`Format`]s and value (de)serialization
//! - [`list`] - [`ListOptions`] validation
//! - [`map`] - [`KeyMap`] results with structural lookup
//! - [`client`] - [`KvClient`], the typed front end
//! - [`driver`] - [`KvDriver`], the engine seam
//! - [`memory`] - [`MemoryKv`], an in-memory engine run as a service actor
//! - [`mock`] - Expectation builders for [`MockClient`](crate::framework::mock::MockClient)
//!
//! ## Usage
//!
//! ```rust
//! use actor_manager::kv::{self, GetOptions, Key, ListOptions, PutOptions, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (engine, kv) = kv::new(32);
//!     tokio::spawn(engine.run());
//!
//!     kv.put(Key::from(["users", "ada"]), Value::from(36), PutOptions::default()).await?;
//!     kv.put(Key::from(["users", "bob"]), Value::from(41), PutOptions::default()).await?;
//!
//!     let users = kv.list(ListOptions::new().prefix(Key::single("users"))).await?;
//!     assert_eq!(users.len(), 2);
//!
//!     let ada = kv.get(Key::from(["users", "ada"]), GetOptions::default()).await?;
//!     assert_eq!(ada.map(|e| e.into_value()), Some(Value::from(36)));
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod driver;
pub mod entry;
pub mod error;
pub mod key;
pub mod list;
pub mod map;
pub mod memory;
pub mod mock;

pub use client::{GetOptions, KvClient, PutOptions};
pub use codec::{decode, encode, WireKey};
pub use driver::{KvDriver, ListQuery, RawEntry};
pub use entry::{Entry, Format};
pub use error::KvError;
pub use key::{compare, equal, Handle, Key, Value};
pub use list::ListOptions;
pub use map::KeyMap;
pub use memory::{EngineClient, KvRequest, MemoryKv};

use crate::framework::ServiceActor;

/// Storage client backed by the in-memory engine.
pub type MemoryKvClient = KvClient<EngineClient>;

/// Creates a new in-memory storage engine and a client for it.
pub fn new(buffer_size: usize) -> (ServiceActor<MemoryKv>, MemoryKvClient) {
    let (engine, client) = ServiceActor::new(buffer_size, MemoryKv::new());
    (engine, KvClient::new(client))
}
