use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{CollectionStore, GateError};

use super::OrganizationResponse;
use crate::http_server::api::client::{ApiError as ClientError, ApiRequest};
use crate::http_server::api::ApiError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct CreateOrganizationRequest {
    /// Display name of the organization
    #[arg(long)]
    pub name: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.is_empty() {
        return Err(GateError::InvalidInput("name is required".into()).into());
    }

    let organization = state
        .database()
        .create_organization(&req.name)
        .await
        .map_err(|e| GateError::internal("failed to create organization", e))?;

    tracing::info!(uid = %organization.uid, "organization created");
    Ok((
        http::StatusCode::CREATED,
        Json(OrganizationResponse::from(organization)),
    ))
}

impl ApiRequest for CreateOrganizationRequest {
    type Response = OrganizationResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let full_url = base_url.join("/api/v0/admin/organizations")?;
        Ok(client.post(full_url).json(&self))
    }
}
