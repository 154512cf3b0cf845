//! Commands that print the collection as the service returns it.

use service::http_server::api::client::ApiError;
use service::http_server::api::v0::collections::create::CreateCollectionRequest;
use service::http_server::api::v0::collections::get::GetCollectionRequest;
use service::http_server::api::v0::collections::update::UpdateCollectionRequest;

use crate::cli::op::{Op, OpContext};

#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl Op for CreateCollectionRequest {
    type Error = CollectionError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let collection = ctx.client.call(self.clone()).await?;
        Ok(collection.to_string())
    }
}

#[async_trait::async_trait]
impl Op for GetCollectionRequest {
    type Error = CollectionError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let collection = ctx.client.call(self.clone()).await?;
        Ok(collection.to_string())
    }
}

#[async_trait::async_trait]
impl Op for UpdateCollectionRequest {
    type Error = CollectionError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let collection = ctx.client.call(self.clone()).await?;
        Ok(collection.to_string())
    }
}
