//! The actor query protocol.
//!
//! A query is a closed enum: adding a variant is a compile error in every `match`
//! that dispatches on it. The serde shape is externally tagged camelCase, e.g.
//! `{"getByRegion": {"name": "chat", "region": "eu"}}`.

use super::tags::Tags;
use serde::{Deserialize, Serialize};

/// Payload used to create an actor when a lookup misses (or directly).
///
/// `tags` must contain `name`; the build is derived from it at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub tags: Tags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl CreateRequest {
    pub fn new(tags: Tags) -> Self {
        Self { tags, region: None }
    }

    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// An abstract way of addressing an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorQuery {
    #[serde(rename_all = "camelCase")]
    GetForId { actor_id: String },
    GetOrCreateForTags {
        tags: Tags,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        create: Option<CreateRequest>,
    },
    Create(CreateRequest),
    GetLatestByName { name: String },
    GetByRegion { name: String, region: String },
    #[serde(rename_all = "camelCase")]
    GetByBuild { build_id: String },
    GetAllPublicByName { name: String },
    #[serde(rename_all = "camelCase")]
    GetDestroyedActorsByTag { tag_key: String, tag_value: String },
    GetByExactTags { tags: Tags },
    GetMostRecentByRegion { region: String },
}

impl ActorQuery {
    /// Variant name as it appears on the wire, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ActorQuery::GetForId { .. } => "getForId",
            ActorQuery::GetOrCreateForTags { .. } => "getOrCreateForTags",
            ActorQuery::Create(_) => "create",
            ActorQuery::GetLatestByName { .. } => "getLatestByName",
            ActorQuery::GetByRegion { .. } => "getByRegion",
            ActorQuery::GetByBuild { .. } => "getByBuild",
            ActorQuery::GetAllPublicByName { .. } => "getAllPublicByName",
            ActorQuery::GetDestroyedActorsByTag { .. } => "getDestroyedActorsByTag",
            ActorQuery::GetByExactTags { .. } => "getByExactTags",
            ActorQuery::GetMostRecentByRegion { .. } => "getMostRecentByRegion",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tags;

    #[test]
    fn test_query_wire_shape() {
        let query: ActorQuery =
            serde_json::from_str(r#"{"getForId": {"actorId": "actor_3"}}"#).unwrap();
        assert_eq!(
            query,
            ActorQuery::GetForId {
                actor_id: "actor_3".into()
            }
        );

        let query: ActorQuery = serde_json::from_str(
            r#"{"getOrCreateForTags": {
                "tags": {"name": "echo"},
                "create": {"tags": {"name": "echo"}, "region": "eu"}
            }}"#,
        )
        .unwrap();
        assert_eq!(
            query,
            ActorQuery::GetOrCreateForTags {
                tags: tags([("name", "echo")]),
                create: Some(CreateRequest::new(tags([("name", "echo")])).in_region("eu")),
            }
        );
        assert_eq!(query.kind(), "getOrCreateForTags");

        let query = ActorQuery::GetDestroyedActorsByTag {
            tag_key: "room".into(),
            tag_value: "lobby".into(),
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"getDestroyedActorsByTag": {"tagKey": "room", "tagValue": "lobby"}})
        );
    }

    #[test]
    fn test_create_variant_is_newtype() {
        let query: ActorQuery =
            serde_json::from_str(r#"{"create": {"tags": {"name": "counter"}}}"#).unwrap();
        assert_eq!(
            query,
            ActorQuery::Create(CreateRequest::new(tags([("name", "counter")])))
        );
    }
}
