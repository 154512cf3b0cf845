use service::http_server::api::client::ApiError;
use service::http_server::api::v0::auth::login::{LoginRequest, LoginResponse};

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for LoginRequest {
    type Error = LoginError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response: LoginResponse = ctx.client.call(self.clone()).await?;
        // bare token so it can be captured into TROVE_TOKEN
        Ok(response.token)
    }
}
