use axum::extract::{Json, State};
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::prelude::{CollectionStore, GateError};

use super::{OrganizationResponse, UserResponse};
use crate::http_server::api::client::{ApiError as ClientError, ApiRequest};
use crate::http_server::api::v0::parse_uid;
use crate::http_server::api::ApiError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct AddMemberRequest {
    /// Uid of the user joining the organization
    #[arg(long)]
    pub user_uid: String,
    /// Uid of the organization
    #[arg(long)]
    pub organization_uid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipResponse {
    pub user: UserResponse,
    pub organization: OrganizationResponse,
}

impl std::fmt::Display for MembershipResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is a member of {} ({})",
            self.user.email, self.organization.name, self.organization.uid
        )
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Json(req): Json<AddMemberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_uid = parse_uid(&req.user_uid, "user_uid")?;
    let organization_uid = parse_uid(&req.organization_uid, "organization_uid")?;

    let db = state.database();
    let user = db
        .find_user_by_uid(user_uid)
        .await
        .map_err(|e| GateError::internal("user lookup failed", e))?
        .ok_or_else(|| GateError::NotFound(format!("user {}", user_uid)))?;
    let organization = db
        .find_organization_by_uid(organization_uid)
        .await
        .map_err(|e| GateError::internal("organization lookup failed", e))?
        .ok_or_else(|| GateError::NotFound(format!("organization {}", organization_uid)))?;

    db.add_organization_member(user.id, organization.id)
        .await
        .map_err(|e| GateError::internal("failed to add member", e))?;

    tracing::info!(
        user = %user.uid,
        organization = %organization.uid,
        "organization member added"
    );
    Ok(Json(MembershipResponse {
        user: user.into(),
        organization: organization.into(),
    }))
}

impl ApiRequest for AddMemberRequest {
    type Response = MembershipResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let full_url = base_url.join("/api/v0/admin/organizations/members")?;
        Ok(client.post(full_url).json(&self))
    }
}
