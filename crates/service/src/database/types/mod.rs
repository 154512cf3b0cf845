mod daccess_level;
mod duuid;

pub use daccess_level::DAccessLevel;
pub use duuid::DUuid;
