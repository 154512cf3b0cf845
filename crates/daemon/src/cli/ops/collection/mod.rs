use clap::{Args, Subcommand};

use service::http_server::api::v0::collections::create::CreateCollectionRequest;
use service::http_server::api::v0::collections::delete::DeleteCollectionRequest;
use service::http_server::api::v0::collections::get::GetCollectionRequest;
use service::http_server::api::v0::collections::share::ShareRequest;
use service::http_server::api::v0::collections::update::UpdateCollectionRequest;

use crate::cli::op::{Op, OpContext};

pub mod delete;
pub mod share;
pub mod upsert;

crate::command_enum! {
    (Create, CreateCollectionRequest),
    (Get, GetCollectionRequest),
    (Update, UpdateCollectionRequest),
    (Delete, DeleteCollectionRequest),
    (Share, ShareRequest),
}

pub type CollectionCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Collection {
    #[command(subcommand)]
    pub command: CollectionCommand,
}

#[async_trait::async_trait]
impl Op for Collection {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
