//! List options and their validation.

use super::codec::encode;
use super::driver::ListQuery;
use super::entry::Format;
use super::error::KvError;
use super::key::Key;

/// Options for [`KvClient::list`](super::KvClient::list).
///
/// At most one selection mode may be set: `prefix`, `start` + `end`
/// (both inclusive) or `start_after` + `end` (exclusive start). With none set,
/// every key is listed.
///
/// ```
/// use actor_manager::kv::{Key, ListOptions};
///
/// let options = ListOptions::new()
///     .start(Key::from(["logs", "2024-01"]))
///     .end(Key::from(["logs", "2024-12"]))
///     .reverse()
///     .limit(10);
/// assert!(options.query().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    pub prefix: Option<Key>,
    pub start: Option<Key>,
    pub start_after: Option<Key>,
    pub end: Option<Key>,
    pub reverse: bool,
    pub limit: Option<usize>,
    pub format: Format,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<Key>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn start(mut self, start: impl Into<Key>) -> Self {
        self.start = Some(start.into());
        self
    }

    pub fn start_after(mut self, start_after: impl Into<Key>) -> Self {
        self.start_after = Some(start_after.into());
        self
    }

    pub fn end(mut self, end: impl Into<Key>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Validates the selection mode and encodes it for the engine.
    pub fn query(&self) -> Result<ListQuery, KvError> {
        let invalid = |message: &str| Err(KvError::InvalidQuery(message.to_string()));

        match (&self.prefix, &self.start, &self.start_after, &self.end) {
            (None, None, None, None) => Ok(ListQuery::All),
            (Some(prefix), None, None, None) => Ok(ListQuery::Prefix(encode(prefix)?)),
            (None, Some(start), None, Some(end)) => {
                Ok(ListQuery::RangeInclusive(encode(start)?, encode(end)?))
            }
            (None, None, Some(start_after), Some(end)) => {
                Ok(ListQuery::RangeExclusive(encode(start_after)?, encode(end)?))
            }
            (Some(_), ..) => invalid("prefix cannot be combined with start, start_after or end"),
            (None, Some(_), Some(_), _) => invalid("start and start_after are mutually exclusive"),
            (None, Some(_), None, None) => invalid("must set end with start"),
            (None, None, Some(_), None) => invalid("must set end with start_after"),
            (None, None, None, Some(_)) => invalid("must set start or start_after with end"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_invalid(options: ListOptions) -> bool {
        matches!(options.query(), Err(KvError::InvalidQuery(_)))
    }

    #[test]
    fn test_modes() {
        assert_eq!(ListOptions::new().query().unwrap(), ListQuery::All);
        assert!(matches!(
            ListOptions::new().prefix("a").query().unwrap(),
            ListQuery::Prefix(_)
        ));
        assert!(matches!(
            ListOptions::new().start("a").end("b").query().unwrap(),
            ListQuery::RangeInclusive(..)
        ));
        assert!(matches!(
            ListOptions::new().start_after("a").end("b").query().unwrap(),
            ListQuery::RangeExclusive(..)
        ));
    }

    #[test]
    fn test_invalid_combinations() {
        assert!(is_invalid(ListOptions::new().start("a")));
        assert!(is_invalid(ListOptions::new().start_after("a")));
        assert!(is_invalid(ListOptions::new().end("b")));
        assert!(is_invalid(ListOptions::new().prefix("a").start("a").end("b")));
        assert!(is_invalid(ListOptions::new().prefix("a").end("b")));
        assert!(is_invalid(ListOptions::new().start("a").start_after("a").end("b")));
    }
}
