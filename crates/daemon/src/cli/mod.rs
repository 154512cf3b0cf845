pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Admin, Collection, Daemon, Health, Version};
