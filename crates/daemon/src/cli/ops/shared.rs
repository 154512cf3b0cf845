use service::http_server::api::client::ApiError;
use service::http_server::api::v0::shared::fetch::FetchSharedRequest;

#[derive(Debug, thiserror::Error)]
pub enum SharedError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for FetchSharedRequest {
    type Error = SharedError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        Ok(response.to_string())
    }
}
