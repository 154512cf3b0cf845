use axum::extract::{Json, Path, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::load_collection;
use crate::http_server::api::client::{ApiError as ClientError, ApiRequest};
use crate::http_server::api::ApiError;
use crate::http_server::gate::Caller;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ShareRequest {
    /// Uid of the collection to share
    pub uid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareTokenResponse {
    pub token: String,
    pub collection_uid: Uuid,
    pub access_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl std::fmt::Display for ShareTokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token)
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Caller(caller): Caller,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = load_collection(state.database(), &uid).await?;
    let link = state
        .access()
        .issue_share_link(&collection, caller.user_id)
        .await?;

    Ok((
        http::StatusCode::CREATED,
        Json(ShareTokenResponse {
            token: link.token,
            collection_uid: collection.uid,
            access_count: link.access_count,
            created_at: link.created_at,
        }),
    ))
}

impl ApiRequest for ShareRequest {
    type Response = ShareTokenResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let full_url = base_url.join(&format!("/api/v0/collections/{}/share", self.uid))?;
        Ok(client.post(full_url))
    }
}
