//! Service infrastructure for Trove.
//!
//! - Database (SQLite with the `CollectionStore` implementation)
//! - State management (database, request gate, access controller)
//! - HTTP server: gated JSON API, health checks, and a typed client
//! - Process bootstrap: logging, signals, graceful shutdown

pub mod config;
pub mod database;
pub mod http_server;
pub mod process;
pub mod state;

pub use config::Config as ServiceConfig;
pub use database::{Database, DatabaseSetupError};
pub use process::{spawn_service, start_service, ServiceError, ShutdownHandle};
pub use state::{State as ServiceState, StateSetupError};
