use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::model::CollectionUpdate;
use common::prelude::{AccessLevel, CollectionStore, GateError};

use super::{load_collection, parse_json_object, CollectionResponse, JsonObject};
use crate::http_server::api::client::{ApiError as ClientError, ApiRequest};
use crate::http_server::api::v0::parse_uid;
use crate::http_server::api::ApiError;
use crate::http_server::gate::Caller;
use crate::ServiceState;

/// Partial update; absent fields keep their current value
#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct UpdateCollectionRequest {
    /// Uid of the collection
    #[serde(skip)]
    pub uid: String,
    /// New name
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement contents, as a JSON object
    #[arg(long, value_parser = parse_json_object)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonObject>,
    /// New access level
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessLevel>,
    /// Organization to scope to; required when moving to ORGANIZATION
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_uid: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Caller(caller): Caller,
    Path(uid): Path<String>,
    Json(req): Json<UpdateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = load_collection(state.database(), &uid).await?;
    state.access().authorize(&collection, caller.user_id).await?;

    let (access_level, organization_id) = match req.access_level {
        None => (collection.access_level, collection.organization_id),
        Some(AccessLevel::Organization) => {
            let organization_uid = req.organization_uid.as_deref().ok_or_else(|| {
                GateError::InvalidInput(
                    "organization_uid required for organization-level access".into(),
                )
            })?;
            let organization_uid = parse_uid(organization_uid, "organization_uid")?;
            // checked again here, even when the organization is unchanged
            let organization = state
                .access()
                .require_membership(organization_uid, caller.user_id)
                .await?;
            (AccessLevel::Organization, Some(organization.id))
        }
        Some(level) => (level, None),
    };

    let name = match req.name {
        Some(name) if !name.is_empty() => name,
        _ => collection.name,
    };

    let updated = state
        .database()
        .update_collection(
            collection.id,
            CollectionUpdate {
                name,
                data: req.data.unwrap_or(collection.data),
                access_level,
                organization_id,
            },
        )
        .await
        .map_err(|e| GateError::internal("failed to update collection", e))?
        .ok_or_else(|| GateError::NotFound(format!("collection {}", collection.uid)))?;

    tracing::info!(uid = %updated.uid, user_id = caller.user_id, "collection updated");
    Ok(Json(CollectionResponse::from(updated)))
}

impl ApiRequest for UpdateCollectionRequest {
    type Response = CollectionResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let full_url = base_url.join(&format!("/api/v0/collections/{}", self.uid))?;
        Ok(client.patch(full_url).json(&self))
    }
}
