//! Bootstrap operations for users and organizations.
//!
//! These are public at the gate; deployments keep them off the open
//! network.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use common::prelude::{Organization, User};

pub mod add_member;
pub mod create_organization;
pub mod create_user;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub uid: Uuid,
    pub email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            uid: user.uid,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationResponse {
    pub uid: Uuid,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Organization> for OrganizationResponse {
    fn from(organization: Organization) -> Self {
        Self {
            uid: organization.uid,
            name: organization.name,
            created_at: organization.created_at,
        }
    }
}

impl std::fmt::Display for UserResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.uid, self.email)
    }
}

impl std::fmt::Display for OrganizationResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.uid, self.name)
    }
}
