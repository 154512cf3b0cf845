use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use super::{load_collection, CollectionResponse};
use crate::http_server::api::client::{ApiError as ClientError, ApiRequest};
use crate::http_server::api::ApiError;
use crate::http_server::gate::Caller;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct GetCollectionRequest {
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

    Ok(Json(CollectionResponse::from(collection)))
}

impl ApiRequest for GetCollectionRequest {
    type Response = CollectionResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let full_url = base_url.join(&format!("/api/v0/collections/{}", self.uid))?;
        Ok(client.get(full_url))
    }
}
