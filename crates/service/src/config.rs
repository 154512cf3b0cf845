use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use common::rate_limit::{DEFAULT_SHARE_LIMIT, DEFAULT_SHARE_WINDOW};

/// Default time a single request may take before it is answered with a timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// address for the API server to listen on.
    ///  if not set then 0.0.0.0:3000 will be used
    pub api_listen_addr: Option<SocketAddr>,
    /// how long a request may run before the server gives up on it
    pub request_timeout: Duration,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,

    // auth configuration
    /// symmetric secret bearer tokens are signed with
    pub jwt_secret: String,

    // share-token rate limiting
    /// admissions per share token inside one window
    pub share_rate_limit: usize,
    /// trailing window the share limit applies to
    pub share_rate_window: Duration,

    // misc
    pub log_level: tracing::Level,
    /// Directory for log files (logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn api_listen_addr(&self) -> SocketAddr {
        self.api_listen_addr
            .unwrap_or(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_listen_addr: Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000)),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            sqlite_path: None,
            jwt_secret: String::new(),
            share_rate_limit: DEFAULT_SHARE_LIMIT,
            share_rate_window: DEFAULT_SHARE_WINDOW,
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}
