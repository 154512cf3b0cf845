use std::convert::Infallible;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct Health;

/// Probe one status endpoint and describe the outcome in a single line
async fn check_endpoint(client: &reqwest::Client, base: &url::Url, path: &str) -> String {
    let url = format!("{}/_status/{}", base.as_str().trim_end_matches('/'), path);
    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => format!("  {}: OK", path),
        Ok(resp) => format!("  {}: UNHEALTHY ({})", path, resp.status()),
        Err(_) => format!("  {}: NOT REACHABLE", path),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        let lines = [
            format!("Service ({}):", base),
            check_endpoint(client, base, "livez").await,
            check_endpoint(client, base, "readyz").await,
        ];
        Ok(lines.join("\n"))
    }
}
