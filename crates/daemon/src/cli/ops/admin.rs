//! Provisioning commands. These hit routes the service leaves open,
//!  so point them at a service you control.

use clap::{Args, Subcommand};

use service::http_server::api::client::ApiError;
use service::http_server::api::v0::admin::add_member::AddMemberRequest;
use service::http_server::api::v0::admin::create_organization::CreateOrganizationRequest;
use service::http_server::api::v0::admin::create_user::CreateUserRequest;

use crate::cli::op::{Op, OpContext};

crate::command_enum! {
    (CreateUser, CreateUserRequest),
    (CreateOrg, CreateOrganizationRequest),
    (AddMember, AddMemberRequest),
}

pub type AdminCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Admin {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[async_trait::async_trait]
impl Op for Admin {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl Op for CreateUserRequest {
    type Error = AdminError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let user = ctx.client.call(self.clone()).await?;
        Ok(user.to_string())
    }
}

#[async_trait::async_trait]
impl Op for CreateOrganizationRequest {
    type Error = AdminError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let organization = ctx.client.call(self.clone()).await?;
        Ok(organization.to_string())
    }
}

#[async_trait::async_trait]
impl Op for AddMemberRequest {
    type Error = AdminError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let membership = ctx.client.call(self.clone()).await?;
        Ok(membership.to_string())
    }
}
