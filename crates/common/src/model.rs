use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Internal numeric id of a user, as embedded in bearer tokens
pub type UserId = i64;
/// Internal numeric id of an organization
pub type OrganizationId = i64;
/// Internal numeric id of a collection
pub type CollectionId = i64;

/// Visibility tier of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    /// Only the owner may act on the collection
    Private,
    /// The owner and every member of the collection's organization
    Organization,
    /// The owner, plus read access for anyone holding a share token
    Shared,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Private => "PRIVATE",
            AccessLevel::Organization => "ORGANIZATION",
            AccessLevel::Shared => "SHARED",
        }
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown access level: {0}")]
pub struct AccessLevelParseError(String);

impl FromStr for AccessLevel {
    type Err = AccessLevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PRIVATE" => Ok(AccessLevel::Private),
            "ORGANIZATION" => Ok(AccessLevel::Organization),
            "SHARED" => Ok(AccessLevel::Shared),
            _ => Err(AccessLevelParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub uid: Uuid,
    pub email: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: OrganizationId,
    pub uid: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
}

/// A named JSON document scoped to a user, an organization,
///  or anyone holding one of its share tokens.
///
/// `Organization` implies `organization_id` is set; `Private`
///  implies `owner_id` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub id: CollectionId,
    pub uid: Uuid,
    pub name: String,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub access_level: AccessLevel,
    pub owner_id: Option<UserId>,
    pub organization_id: Option<OrganizationId>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Fields for a collection that does not exist yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewCollection {
    pub name: String,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub access_level: AccessLevel,
    pub owner_id: Option<UserId>,
    pub organization_id: Option<OrganizationId>,
}

/// Full replacement of the mutable fields of a collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionUpdate {
    pub name: String,
    pub data: serde_json::Map<String, serde_json::Value>,
    pub access_level: AccessLevel,
    pub organization_id: Option<OrganizationId>,
}

/// An unguessable token granting read access to one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    pub token: String,
    pub collection_id: CollectionId,
    pub created_by: UserId,
    pub access_count: i64,
    pub created_at: OffsetDateTime,
}

/// Result of a successful share-token fetch
#[derive(Debug, Clone, PartialEq)]
pub struct SharedCollection {
    pub collection: Collection,
    /// Access count of the link, including this fetch
    pub access_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_level_wire_format() {
        assert_eq!(
            serde_json::to_string(&AccessLevel::Organization).unwrap(),
            "\"ORGANIZATION\""
        );
        let level: AccessLevel = serde_json::from_str("\"SHARED\"").unwrap();
        assert_eq!(level, AccessLevel::Shared);
    }

    #[test]
    fn test_access_level_from_str() {
        assert_eq!("private".parse::<AccessLevel>().unwrap(), AccessLevel::Private);
        assert_eq!(
            "ORGANIZATION".parse::<AccessLevel>().unwrap(),
            AccessLevel::Organization
        );
        assert!("public".parse::<AccessLevel>().is_err());
    }
}
