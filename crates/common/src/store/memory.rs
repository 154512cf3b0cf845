use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use time::OffsetDateTime;
use uuid::Uuid;

use super::provider::CollectionStore;
use crate::model::{
    Collection, CollectionId, CollectionUpdate, NewCollection, Organization, OrganizationId,
    ShareLink, User, UserId,
};

/// In-memory store using HashMaps, for tests and ephemeral runs
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    next_id: i64,
    users: HashMap<UserId, User>,
    organizations: HashMap<OrganizationId, Organization>,
    /// (user, organization) pairs
    memberships: HashSet<(UserId, OrganizationId)>,
    collections: HashMap<CollectionId, Collection>,
    /// token -> link
    share_links: HashMap<String, ShareLink>,
}

impl MemoryStoreInner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("memory store error: {0}")]
    Internal(String),
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("foreign key violated: {0}")]
    MissingReference(String),
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryStoreInner::default())),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>, MemoryStoreError> {
        self.inner.read().map_err(|e| {
            MemoryStoreError::Internal(format!("failed to acquire read lock: {}", e))
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>, MemoryStoreError> {
        self.inner.write().map_err(|e| {
            MemoryStoreError::Internal(format!("failed to acquire write lock: {}", e))
        })
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn create_user(&self, email: &str) -> Result<User, Self::Error> {
        let mut inner = self.write()?;
        if inner.users.values().any(|u| u.email == email) {
            return Err(MemoryStoreError::Conflict(format!("users.email = {}", email)));
        }

        let user = User {
            id: inner.next_id(),
            uid: Uuid::new_v4(),
            email: email.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Self::Error> {
        let inner = self.read()?;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_uid(&self, uid: Uuid) -> Result<Option<User>, Self::Error> {
        let inner = self.read()?;
        Ok(inner.users.values().find(|u| u.uid == uid).cloned())
    }

    async fn create_organization(&self, name: &str) -> Result<Organization, Self::Error> {
        let mut inner = self.write()?;
        let organization = Organization {
            id: inner.next_id(),
            uid: Uuid::new_v4(),
            name: name.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        inner
            .organizations
            .insert(organization.id, organization.clone());
        Ok(organization)
    }

    async fn find_organization_by_uid(
        &self,
        uid: Uuid,
    ) -> Result<Option<Organization>, Self::Error> {
        let inner = self.read()?;
        Ok(inner.organizations.values().find(|o| o.uid == uid).cloned())
    }

    async fn find_organization_by_id(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, Self::Error> {
        let inner = self.read()?;
        Ok(inner.organizations.get(&id).cloned())
    }

    async fn add_organization_member(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), Self::Error> {
        let mut inner = self.write()?;
        if !inner.users.contains_key(&user_id) {
            return Err(MemoryStoreError::MissingReference(format!(
                "user {}",
                user_id
            )));
        }
        if !inner.organizations.contains_key(&organization_id) {
            return Err(MemoryStoreError::MissingReference(format!(
                "organization {}",
                organization_id
            )));
        }
        inner.memberships.insert((user_id, organization_id));
        Ok(())
    }

    async fn is_user_member_of_org(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<bool, Self::Error> {
        let inner = self.read()?;
        Ok(inner.memberships.contains(&(user_id, organization_id)))
    }

    async fn create_collection(&self, new: NewCollection) -> Result<Collection, Self::Error> {
        let mut inner = self.write()?;
        let now = OffsetDateTime::now_utc();
        let collection = Collection {
            id: inner.next_id(),
            uid: Uuid::new_v4(),
            name: new.name,
            data: new.data,
            access_level: new.access_level,
            owner_id: new.owner_id,
            organization_id: new.organization_id,
            created_at: now,
            updated_at: now,
        };
        inner.collections.insert(collection.id, collection.clone());
        Ok(collection)
    }

    async fn find_collection_by_uid(&self, uid: Uuid) -> Result<Option<Collection>, Self::Error> {
        let inner = self.read()?;
        Ok(inner.collections.values().find(|c| c.uid == uid).cloned())
    }

    async fn find_collection_by_id(
        &self,
        id: CollectionId,
    ) -> Result<Option<Collection>, Self::Error> {
        let inner = self.read()?;
        Ok(inner.collections.get(&id).cloned())
    }

    async fn update_collection(
        &self,
        id: CollectionId,
        update: CollectionUpdate,
    ) -> Result<Option<Collection>, Self::Error> {
        let mut inner = self.write()?;
        let Some(collection) = inner.collections.get_mut(&id) else {
            return Ok(None);
        };

        collection.name = update.name;
        collection.data = update.data;
        collection.access_level = update.access_level;
        collection.organization_id = update.organization_id;
        collection.updated_at = OffsetDateTime::now_utc();
        Ok(Some(collection.clone()))
    }

    async fn delete_collection(&self, id: CollectionId) -> Result<bool, Self::Error> {
        let mut inner = self.write()?;
        let removed = inner.collections.remove(&id).is_some();
        inner.share_links.retain(|_, link| link.collection_id != id);
        Ok(removed)
    }

    async fn create_share_link(
        &self,
        token: &str,
        collection_id: CollectionId,
        created_by: UserId,
    ) -> Result<ShareLink, Self::Error> {
        let mut inner = self.write()?;
        if !inner.collections.contains_key(&collection_id) {
            return Err(MemoryStoreError::MissingReference(format!(
                "collection {}",
                collection_id
            )));
        }
        if inner.share_links.contains_key(token) {
            return Err(MemoryStoreError::Conflict("share_links.token".to_string()));
        }

        let link = ShareLink {
            token: token.to_string(),
            collection_id,
            created_by,
            access_count: 0,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.share_links.insert(link.token.clone(), link.clone());
        Ok(link)
    }

    async fn increment_share_access_count(
        &self,
        token: &str,
    ) -> Result<Option<ShareLink>, Self::Error> {
        // read-modify-write under one write guard
        let mut inner = self.write()?;
        Ok(inner.share_links.get_mut(token).map(|link| {
            link.access_count += 1;
            link.clone()
        }))
    }
}
