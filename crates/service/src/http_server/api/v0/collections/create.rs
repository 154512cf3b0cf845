use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{AccessLevel, CollectionStore, GateError, NewCollection};

use super::{parse_json_object, CollectionResponse, JsonObject};
use crate::http_server::api::client::{ApiError as ClientError, ApiRequest};
use crate::http_server::api::v0::parse_uid;
use crate::http_server::api::ApiError;
use crate::http_server::gate::Caller;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct CreateCollectionRequest {
    /// Name of the collection
    #[arg(long)]
    pub name: String,
    /// Initial contents, as a JSON object
    #[arg(long, value_parser = parse_json_object)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonObject>,
    /// PRIVATE, ORGANIZATION or SHARED
    #[arg(long, default_value = "PRIVATE")]
    pub access_level: AccessLevel,
    /// Organization to scope the collection to; required for ORGANIZATION
    #[arg(long)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_uid: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Caller(caller): Caller,
    Json(req): Json<CreateCollectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.is_empty() {
        return Err(GateError::InvalidInput("name is required".into()).into());
    }

    let organization_id = match req.access_level {
        AccessLevel::Organization => {
            let organization_uid = req.organization_uid.as_deref().ok_or_else(|| {
                GateError::InvalidInput(
                    "organization_uid required for organization-level access".into(),
                )
            })?;
            let organization_uid = parse_uid(organization_uid, "organization_uid")?;
            let organization = state
                .access()
                .require_membership(organization_uid, caller.user_id)
                .await?;
            Some(organization.id)
        }
        _ => None,
    };

    let collection = state
        .database()
        .create_collection(NewCollection {
            name: req.name,
            data: req.data.unwrap_or_default(),
            access_level: req.access_level,
            owner_id: Some(caller.user_id),
            organization_id,
        })
        .await
        .map_err(|e| GateError::internal("failed to create collection", e))?;

    tracing::info!(
        uid = %collection.uid,
        user_id = caller.user_id,
        access_level = %collection.access_level,
        "collection created"
    );
    Ok((
        http::StatusCode::CREATED,
        Json(CollectionResponse::from(collection)),
    ))
}

impl ApiRequest for CreateCollectionRequest {
    type Response = CollectionResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let full_url = base_url.join("/api/v0/collections")?;
        Ok(client.post(full_url).json(&self))
    }
}
