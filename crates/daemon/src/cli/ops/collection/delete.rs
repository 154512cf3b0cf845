use service::http_server::api::v0::collections::delete::DeleteCollectionRequest;

use super::upsert::CollectionError;
use crate::cli::op::{Op, OpContext};

#[async_trait::async_trait]
impl Op for DeleteCollectionRequest {
    type Error = CollectionError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client.call(self.clone()).await?;
        Ok(format!("Collection {} deleted", self.uid))
    }
}
