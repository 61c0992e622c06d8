use super::tags::{Tags, ACCESS_PUBLIC, CURRENT_TRUE, TAG_ACCESS, TAG_CURRENT};
use serde::{Deserialize, Serialize};

/// An uploaded artifact actors can run.
///
/// Builds are tagged by the upload pipeline; at most one public build per
/// `name` is expected to carry `current: "true"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: String,
    #[serde(default)]
    pub tags: Tags,
    pub created_at: String,
}

impl Build {
    pub fn is_public(&self) -> bool {
        self.tags.get(TAG_ACCESS).map(String::as_str) == Some(ACCESS_PUBLIC)
    }

    pub fn is_current(&self) -> bool {
        self.tags.get(TAG_CURRENT).map(String::as_str) == Some(CURRENT_TRUE)
    }
}
