use std::collections::BTreeMap;

/// String tags attached to actors and builds.
///
/// A `BTreeMap` keeps iteration (and therefore logs and serialized requests) stable.
pub type Tags = BTreeMap<String, String>;

pub const TAG_NAME: &str = "name";
pub const TAG_ACCESS: &str = "access";
pub const TAG_REGION: &str = "region";
pub const TAG_CURRENT: &str = "current";

pub const ACCESS_PUBLIC: &str = "public";
pub const CURRENT_TRUE: &str = "true";

/// Builds a tag map from `(key, value)` pairs.
///
/// ```
/// use actor_manager::model::tags;
///
/// let t = tags([("name", "echo"), ("region", "us")]);
/// assert_eq!(t["name"], "echo");
/// ```
pub fn tags<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Tags
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// True when `have` carries every key/value pair of `want`.
///
/// Extra tags on `have` are ignored, so an empty `want` matches everything.
pub fn tags_superset(have: &Tags, want: &Tags) -> bool {
    want.iter()
        .all(|(k, v)| have.get(k).is_some_and(|found| found == v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superset_ignores_extra_tags() {
        let actor = tags([("name", "a"), ("region", "us"), ("access", "public")]);
        assert!(tags_superset(&actor, &tags([("name", "a")])));
        assert!(tags_superset(&actor, &Tags::new()));
        assert!(!tags_superset(&actor, &tags([("name", "b")])));
        assert!(!tags_superset(&actor, &tags([("name", "a"), ("tier", "gold")])));
    }
}
