pub mod admin;
pub mod collection;
pub mod daemon;
pub mod health;
pub mod login;
pub mod shared;
pub mod version;

pub use admin::Admin;
pub use collection::Collection;
pub use daemon::Daemon;
pub use health::Health;
pub use version::Version;
