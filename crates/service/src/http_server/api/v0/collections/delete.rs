use axum::extract::{Path, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{CollectionStore, GateError};

use super::load_collection;
use crate::http_server::api::client::{ApiError as ClientError, ApiRequest};
use crate::http_server::api::ApiError;
use crate::http_server::gate::Caller;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteCollectionRequest {
    /// Uid of the collection
    pub uid: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Caller(caller): Caller,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = load_collection(state.database(), &uid).await?;
    state.access().authorize(&collection, caller.user_id).await?;

    let deleted = state
        .database()
        .delete_collection(collection.id)
        .await
        .map_err(|e| GateError::internal("failed to delete collection", e))?;
    if !deleted {
        return Err(GateError::NotFound(format!("collection {}", collection.uid)).into());
    }

    tracing::info!(uid = %collection.uid, user_id = caller.user_id, "collection deleted");
    Ok(http::StatusCode::NO_CONTENT)
}

impl ApiRequest for DeleteCollectionRequest {
    type Response = ();

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let full_url = base_url.join(&format!("/api/v0/collections/{}", self.uid))?;
        Ok(client.delete(full_url))
    }
}
