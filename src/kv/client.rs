use super::codec::{decode, encode, WireKey};
use super::driver::{KvDriver, RawEntry};
use super::entry::{deserialize, serialize, Entry, Format};
use super::error::KvError;
use super::key::{Key, Value};
use super::list::ListOptions;
use super::map::KeyMap;
use tracing::{debug, instrument, warn};

/// Options for reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetOptions {
    pub format: Format,
}

impl GetOptions {
    pub fn array_buffer() -> Self {
        Self {
            format: Format::ArrayBuffer,
        }
    }
}

/// Options for writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub format: Format,
}

impl PutOptions {
    pub fn array_buffer() -> Self {
        Self {
            format: Format::ArrayBuffer,
        }
    }
}

/// Typed access to an actor's durable storage.
///
/// Keys are encoded with the [codec](super::codec) before they reach the engine
/// and decoded on the way back. Values are checked against the requested
/// [`Format`] in both directions.
#[derive(Debug, Clone)]
pub struct KvClient<D> {
    driver: D,
}

impl<D: KvDriver> KvClient<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// Reads one key. Missing keys yield `None`.
    #[instrument(skip_all, fields(key = tracing::field::Empty))]
    pub async fn get(
        &self,
        key: impl Into<Key>,
        options: GetOptions,
    ) -> Result<Option<Entry>, KvError> {
        let key = key.into();
        tracing::Span::current().record("key", tracing::field::display(&key));

        let record = self.driver.get(encode(&key)?).await?;
        record
            .map(|record| deserialize(&key, &record, options.format))
            .transpose()
    }

    /// Reads several keys in one round trip. Missing keys are absent from the result.
    #[instrument(skip_all, fields(count = keys.len()))]
    pub async fn get_batch(
        &self,
        keys: Vec<Key>,
        options: GetOptions,
    ) -> Result<KeyMap<Entry>, KvError> {
        let wire = keys.iter().map(encode).collect::<Result<Vec<_>, _>>()?;
        let found = self.driver.get_batch(wire).await?;
        decode_entries(found, options.format)
    }

    /// Lists entries in key order.
    #[instrument(skip(self))]
    pub async fn list(&self, options: ListOptions) -> Result<KeyMap<Entry>, KvError> {
        let query = options.query()?;
        let found = self
            .driver
            .list(query, options.reverse, options.limit)
            .await?;
        debug!(count = found.len(), "Listed");
        decode_entries(found, options.format)
    }

    /// Writes one value, replacing any existing record.
    #[instrument(skip_all, fields(key = tracing::field::Empty, format = %options.format))]
    pub async fn put(
        &self,
        key: impl Into<Key>,
        value: Value,
        options: PutOptions,
    ) -> Result<(), KvError> {
        let key = key.into();
        tracing::Span::current().record("key", tracing::field::display(&key));

        let wire = encode(&key)?;
        let record = serialize(&key, &value, options.format)?;
        self.driver.put(wire, record).await?;
        Ok(())
    }

    /// Writes several values in one round trip. Nothing is sent if any entry
    /// fails to serialize.
    #[instrument(skip_all, fields(count = entries.len(), format = %options.format))]
    pub async fn put_batch(
        &self,
        entries: Vec<(Key, Value)>,
        options: PutOptions,
    ) -> Result<(), KvError> {
        let records = entries
            .iter()
            .map(|(key, value)| Ok((encode(key)?, serialize(key, value, options.format)?)))
            .collect::<Result<Vec<_>, KvError>>()?;
        self.driver.put_batch(records).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(key = tracing::field::Empty))]
    pub async fn delete(&self, key: impl Into<Key>) -> Result<(), KvError> {
        let key = key.into();
        tracing::Span::current().record("key", tracing::field::display(&key));

        self.driver.delete(encode(&key)?).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(count = keys.len()))]
    pub async fn delete_batch(&self, keys: Vec<Key>) -> Result<(), KvError> {
        let wire = keys.iter().map(encode).collect::<Result<Vec<WireKey>, _>>()?;
        self.driver.delete_batch(wire).await?;
        Ok(())
    }

    /// Deletes every record. This cannot be undone.
    #[instrument(skip_all)]
    pub async fn delete_all(&self) -> Result<(), KvError> {
        warn!("Deleting all storage");
        self.driver.delete_all().await.map_err(|e| {
            warn!(error = %e, "Delete all failed");
            KvError::from(e)
        })
    }
}

fn decode_entries(found: Vec<RawEntry>, format: Format) -> Result<KeyMap<Entry>, KvError> {
    found
        .into_iter()
        .map(|(wire, record)| {
            let key = decode(&wire)?;
            let entry = deserialize(&key, &record, format)?;
            Ok((key, entry))
        })
        .collect()
}
