use service::http_server::api::v0::collections::share::{ShareRequest, ShareTokenResponse};

use super::upsert::CollectionError;
use crate::cli::op::{Op, OpContext};

#[async_trait::async_trait]
impl Op for ShareRequest {
    type Error = CollectionError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let response: ShareTokenResponse = ctx.client.call(self.clone()).await?;
        Ok(format!(
            "Collection {} shared. Token: {}\nFetch with: trove shared {}",
            response.collection_uid, response.token, response.token
        ))
    }
}
