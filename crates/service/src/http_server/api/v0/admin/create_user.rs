use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{CollectionStore, GateError};

use super::UserResponse;
use crate::http_server::api::client::{ApiError as ClientError, ApiRequest};
use crate::http_server::api::ApiError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct CreateUserRequest {
    /// Email address of the new user, unique across the service
    #[arg(long)]
    pub email: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.is_empty() {
        return Err(GateError::InvalidInput("email is required".into()).into());
    }

    let db = state.database();
    let existing = db
        .find_user_by_email(&req.email)
        .await
        .map_err(|e| GateError::internal("user lookup failed", e))?;
    if existing.is_some() {
        return Err(GateError::InvalidInput(format!("user {} already exists", req.email)).into());
    }

    let user = db
        .create_user(&req.email)
        .await
        .map_err(|e| GateError::internal("failed to create user", e))?;

    tracing::info!(uid = %user.uid, "user created");
    Ok((http::StatusCode::CREATED, Json(UserResponse::from(user))))
}

impl ApiRequest for CreateUserRequest {
    type Response = UserResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let full_url = base_url.join("/api/v0/admin/users")?;
        Ok(client.post(full_url).json(&self))
    }
}
