use std::fmt::Display;

/// Every operation the service exposes, with the capabilities the
///  request gate enforces for it.
///
/// Transports build their routes from [`Operation::ALL`], so an operation
///  cannot be served without a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    GetSharedCollection,
    CreateUser,
    CreateOrganization,
    AddOrganizationMember,
    CreateCollection,
    GetCollection,
    UpdateCollection,
    DeleteCollection,
    CreateShareToken,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::Login,
        Operation::GetSharedCollection,
        Operation::CreateUser,
        Operation::CreateOrganization,
        Operation::AddOrganizationMember,
        Operation::CreateCollection,
        Operation::GetCollection,
        Operation::UpdateCollection,
        Operation::DeleteCollection,
        Operation::CreateShareToken,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Login => "Login",
            Operation::GetSharedCollection => "GetSharedCollection",
            Operation::CreateUser => "CreateUser",
            Operation::CreateOrganization => "CreateOrganization",
            Operation::AddOrganizationMember => "AddOrganizationMember",
            Operation::CreateCollection => "CreateCollection",
            Operation::GetCollection => "GetCollection",
            Operation::UpdateCollection => "UpdateCollection",
            Operation::DeleteCollection => "DeleteCollection",
            Operation::CreateShareToken => "CreateShareToken",
        }
    }

    /// Whether a valid bearer token is required before the handler runs.
    ///
    /// Login and share fetches are public; the admin bootstrap operations
    ///  are expected to sit behind network-level controls instead.
    pub fn requires_auth(&self) -> bool {
        match self {
            Operation::Login
            | Operation::GetSharedCollection
            | Operation::CreateUser
            | Operation::CreateOrganization
            | Operation::AddOrganizationMember => false,
            Operation::CreateCollection
            | Operation::GetCollection
            | Operation::UpdateCollection
            | Operation::DeleteCollection
            | Operation::CreateShareToken => true,
        }
    }

    /// Whether admission is rate limited, keyed by the call's rate key
    pub fn rate_limited(&self) -> bool {
        matches!(self, Operation::GetSharedCollection)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
