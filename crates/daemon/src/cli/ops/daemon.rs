use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use common::rate_limit::{DEFAULT_SHARE_LIMIT, DEFAULT_SHARE_WINDOW};
use service::config::DEFAULT_REQUEST_TIMEOUT;
use service::{spawn_service, ServiceConfig, ServiceError};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Address for the API server to listen on
    #[arg(long, default_value = "0.0.0.0:3000")]
    pub listen_addr: SocketAddr,

    /// SQLite database file (an in-memory database is used if not set)
    #[arg(long)]
    pub sqlite_path: Option<PathBuf>,

    /// Secret bearer tokens are signed with
    #[arg(long, env = "TROVE_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Share-link fetches allowed per token inside one window
    #[arg(long, default_value_t = DEFAULT_SHARE_LIMIT)]
    pub share_rate_limit: usize,

    /// Length of the share-link rate window, in seconds
    #[arg(long, default_value_t = DEFAULT_SHARE_WINDOW.as_secs())]
    pub share_rate_window_secs: u64,

    /// Seconds a request may run before it is answered with a timeout
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub request_timeout_secs: u64,

    /// Default log level (RUST_LOG overrides it)
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Daemon {
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            api_listen_addr: Some(self.listen_addr),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            sqlite_path: self.sqlite_path.clone(),
            jwt_secret: self.jwt_secret.clone(),
            share_rate_limit: self.share_rate_limit,
            share_rate_window: Duration::from_secs(self.share_rate_window_secs),
            log_level: self.log_level,
            log_dir: self.log_dir.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("service failed: {0}")]
    Service(#[from] ServiceError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        spawn_service(&self.service_config()).await?;
        Ok("service stopped".to_string())
    }
}
