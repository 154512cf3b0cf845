use std::fmt::{Debug, Display};

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{
    Collection, CollectionId, CollectionUpdate, NewCollection, Organization, OrganizationId,
    ShareLink, User, UserId,
};

// NOTE: lookups return `Ok(None)` for missing records; `Err` is reserved
//  for the provider itself failing. The gating layer decides what a
//  missing record means for the caller.

/// Persistence for users, organizations, collections and share links
#[async_trait]
pub trait CollectionStore: Send + Sync + Debug + Clone + 'static {
    type Error: Display + Debug + Send;

    async fn create_user(&self, email: &str) -> Result<User, Self::Error>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Self::Error>;

    async fn find_user_by_uid(&self, uid: Uuid) -> Result<Option<User>, Self::Error>;

    async fn create_organization(&self, name: &str) -> Result<Organization, Self::Error>;

    async fn find_organization_by_uid(
        &self,
        uid: Uuid,
    ) -> Result<Option<Organization>, Self::Error>;

    async fn find_organization_by_id(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, Self::Error>;

    /// Record a membership. Adding an existing member is not an error.
    async fn add_organization_member(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), Self::Error>;

    async fn is_user_member_of_org(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<bool, Self::Error>;

    async fn create_collection(&self, new: NewCollection) -> Result<Collection, Self::Error>;

    async fn find_collection_by_uid(&self, uid: Uuid) -> Result<Option<Collection>, Self::Error>;

    async fn find_collection_by_id(
        &self,
        id: CollectionId,
    ) -> Result<Option<Collection>, Self::Error>;

    /// Replace the mutable fields of a collection, returning `None`
    ///  if it no longer exists
    async fn update_collection(
        &self,
        id: CollectionId,
        update: CollectionUpdate,
    ) -> Result<Option<Collection>, Self::Error>;

    /// Delete a collection and every share link pointing at it.
    ///  Returns whether anything was deleted.
    async fn delete_collection(&self, id: CollectionId) -> Result<bool, Self::Error>;

    async fn create_share_link(
        &self,
        token: &str,
        collection_id: CollectionId,
        created_by: UserId,
    ) -> Result<ShareLink, Self::Error>;

    /// Atomically bump the access count of a share link and return the
    ///  link as it is after the increment.
    ///
    /// Must be a single read-modify-write: concurrent calls for the same
    ///  token each count exactly once. Unknown tokens return `Ok(None)`
    ///  and touch nothing.
    async fn increment_share_access_count(
        &self,
        token: &str,
    ) -> Result<Option<ShareLink>, Self::Error>;
}
