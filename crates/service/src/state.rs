use std::sync::Arc;

use url::Url;

use common::prelude::{AccessController, RequestGate, SlidingWindowLimiter, TokenAuthenticator};
use common::rate_limit::RateLimitConfigError;

use super::config::Config;
use super::database::{Database, DatabaseSetupError};

/// Everything a request handler needs, cheap to clone
#[derive(Clone, Debug)]
pub struct State {
    database: Database,
    gate: RequestGate<Database>,
    access: AccessController<Database>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        if config.jwt_secret.is_empty() {
            return Err(StateSetupError::MissingJwtSecret);
        }

        // 1. Setup database
        let sqlite_database_url = match config.sqlite_path {
            Some(ref path) => {
                // the file itself is created on first connect, its directory is not
                let parent_exists = path
                    .parent()
                    .map(|p| p.as_os_str().is_empty() || p.exists())
                    .unwrap_or(true);
                if !parent_exists {
                    return Err(StateSetupError::DatabasePathDoesNotExist);
                }
                Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)
            }
            // otherwise just set up an in-memory database
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!("Database URL: {}", sqlite_database_url);
        let database = Database::connect(&sqlite_database_url).await?;

        // 2. Setup the share-token limiter
        let limiter = SlidingWindowLimiter::new(config.share_rate_limit, config.share_rate_window)?;
        tracing::info!(
            limit = limiter.limit(),
            window_secs = limiter.window().as_secs(),
            "share-token rate limit configured"
        );

        Ok(Self::new(database, Arc::new(limiter), &config.jwt_secret))
    }

    /// Assemble state around an already connected database
    pub fn new(database: Database, limiter: Arc<SlidingWindowLimiter>, jwt_secret: &str) -> Self {
        let authenticator = TokenAuthenticator::new(database.clone(), jwt_secret);
        let gate = RequestGate::new(limiter, authenticator);
        let access = AccessController::new(database.clone());

        Self {
            database,
            gate,
            access,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn gate(&self) -> &RequestGate<Database> {
        &self.gate
    }

    pub fn authenticator(&self) -> &TokenAuthenticator<Database> {
        self.gate.authenticator()
    }

    pub fn access(&self) -> &AccessController<Database> {
        &self.access
    }
}

impl AsRef<Database> for State {
    fn as_ref(&self) -> &Database {
        &self.database
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database path does not exist")]
    DatabasePathDoesNotExist,
    #[error("Database setup error: {0}")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,
    #[error("a JWT secret is required")]
    MissingJwtSecret,
    #[error("Invalid rate limit: {0}")]
    RateLimit(#[from] RateLimitConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_in_memory() {
        let config = Config {
            jwt_secret: "secret".to_string(),
            ..Default::default()
        };
        let state = State::from_config(&config).await.unwrap();
        state.database().ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_from_config_requires_secret() {
        let result = State::from_config(&Config::default()).await;
        assert!(matches!(result, Err(StateSetupError::MissingJwtSecret)));
    }

    #[tokio::test]
    async fn test_from_config_rejects_zero_limit() {
        let config = Config {
            jwt_secret: "secret".to_string(),
            share_rate_limit: 0,
            ..Default::default()
        };
        let result = State::from_config(&config).await;
        assert!(matches!(
            result,
            Err(StateSetupError::RateLimit(RateLimitConfigError::ZeroLimit))
        ));
    }

    #[tokio::test]
    async fn test_from_config_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            jwt_secret: "secret".to_string(),
            sqlite_path: Some(dir.path().join("trove.sqlite")),
            ..Default::default()
        };
        let state = State::from_config(&config).await.unwrap();
        state.database().ping().await.unwrap();

        let config = Config {
            jwt_secret: "secret".to_string(),
            sqlite_path: Some(dir.path().join("missing").join("trove.sqlite")),
            ..Default::default()
        };
        assert!(matches!(
            State::from_config(&config).await,
            Err(StateSetupError::DatabasePathDoesNotExist)
        ));
    }
}
