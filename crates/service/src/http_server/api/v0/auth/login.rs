use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::GateError;

use crate::http_server::api::client::{ApiError as ClientError, ApiRequest};
use crate::http_server::api::ApiError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct LoginRequest {
    /// Email address of an existing user
    #[arg(long)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token, valid for 24 hours
    pub token: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .authenticator()
        .login(&req.email)
        .await
        .map_err(GateError::from)?;

    tracing::info!(email = %req.email, "user logged in");
    Ok(Json(LoginResponse { token }))
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let full_url = base_url.join("/api/v0/auth/login")?;
        Ok(client.post(full_url).json(&self))
    }
}
