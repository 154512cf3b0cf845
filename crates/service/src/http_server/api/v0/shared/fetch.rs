use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::http_server::api::client::{ApiError as ClientError, ApiRequest};
use crate::http_server::api::v0::collections::CollectionResponse;
use crate::http_server::api::ApiError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct FetchSharedRequest {
    /// Share token handed out by the collection's owner
    #[arg(id = "share_token", value_name = "TOKEN")]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedCollectionResponse {
    pub collection: CollectionResponse,
    /// Number of fetches through this token, including this one
    pub access_count: i64,
}

impl std::fmt::Display for SharedCollectionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.collection)?;
        write!(f, "access count: {}", self.access_count)
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let shared = state.access().fetch_shared(&token).await?;

    tracing::debug!(
        collection = %shared.collection.uid,
        access_count = shared.access_count,
        "shared collection fetched"
    );
    Ok(Json(SharedCollectionResponse {
        collection: shared.collection.into(),
        access_count: shared.access_count,
    }))
}

impl ApiRequest for FetchSharedRequest {
    type Response = SharedCollectionResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let full_url = base_url.join(&format!("/api/v0/shared/{}", self.token))?;
        Ok(client.get(full_url))
    }
}
