use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use common::prelude::{AccessLevel, Collection, CollectionStore, GateError};

use crate::database::Database;
use crate::http_server::api::v0::parse_uid;

pub mod create;
pub mod delete;
pub mod get;
pub mod share;
pub mod update;

pub type JsonObject = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionResponse {
    pub uid: Uuid,
    pub name: String,
    pub data: JsonObject,
    pub access_level: AccessLevel,
    pub owner_id: Option<i64>,
    pub organization_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Collection> for CollectionResponse {
    fn from(collection: Collection) -> Self {
        Self {
            uid: collection.uid,
            name: collection.name,
            data: collection.data,
            access_level: collection.access_level,
            owner_id: collection.owner_id,
            organization_id: collection.organization_id,
            created_at: collection.created_at,
            updated_at: collection.updated_at,
        }
    }
}

impl std::fmt::Display for CollectionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = serde_json::to_string_pretty(&self.data).map_err(|_| std::fmt::Error)?;
        writeln!(f, "{} {} [{}]", self.uid, self.name, self.access_level)?;
        write!(f, "{}", data)
    }
}

/// Parse a JSON object given on the command line
pub fn parse_json_object(s: &str) -> Result<JsonObject, serde_json::Error> {
    serde_json::from_str(s)
}

/// Resolve a collection uid from the path
pub(crate) async fn load_collection(db: &Database, uid: &str) -> Result<Collection, GateError> {
    let uid = parse_uid(uid, "uid")?;
    db.find_collection_by_uid(uid)
        .await
        .map_err(|e| GateError::internal("collection lookup failed", e))?
        .ok_or_else(|| GateError::NotFound(format!("collection {}", uid)))
}
