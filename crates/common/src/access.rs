//! Collection access decisions
//!
//! A caller may act on a collection when they own it, or when the
//! collection is organization-scoped and they are currently a member of
//! that organization. Share tokens bypass both checks and grant read
//! access to the one collection they were issued for.

use uuid::Uuid;

use crate::error::GateError;
use crate::model::{AccessLevel, Collection, Organization, ShareLink, SharedCollection, UserId};
use crate::store::CollectionStore;

/// Number of random bytes behind a share token
pub const SHARE_TOKEN_BYTES: usize = 32;

/// Generate a fresh share token: 32 random bytes as 64 lowercase hex characters
pub fn generate_share_token() -> Result<String, GateError> {
    let mut bytes = [0u8; SHARE_TOKEN_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| GateError::internal("failed to generate share token", e))?;
    Ok(hex::encode(bytes))
}

#[derive(Debug, Clone)]
pub struct AccessController<S> {
    store: S,
}

impl<S: CollectionStore> AccessController<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Owner first, then organization membership for organization-scoped
    ///  collections. Anything else is denied.
    pub async fn can_access(
        &self,
        collection: &Collection,
        caller: UserId,
    ) -> Result<bool, GateError> {
        if collection.owner_id == Some(caller) {
            return Ok(true);
        }

        if collection.access_level != AccessLevel::Organization {
            return Ok(false);
        }
        let Some(organization_id) = collection.organization_id else {
            return Ok(false);
        };

        self.store
            .is_user_member_of_org(caller, organization_id)
            .await
            .map_err(|e| GateError::internal("membership lookup failed", e))
    }

    /// Like [`Self::can_access`], but a denial is a `PermissionDenied` error
    pub async fn authorize(
        &self,
        collection: &Collection,
        caller: UserId,
    ) -> Result<(), GateError> {
        if self.can_access(collection, caller).await? {
            return Ok(());
        }

        tracing::warn!(
            collection = %collection.uid,
            user_id = caller,
            "access to collection denied"
        );
        Err(GateError::PermissionDenied("access denied".into()))
    }

    /// Resolve an organization the caller is setting as a collection's scope.
    ///
    /// Membership is checked on every call; it is never carried over from
    ///  an earlier create or update.
    pub async fn require_membership(
        &self,
        organization_uid: Uuid,
        caller: UserId,
    ) -> Result<Organization, GateError> {
        let organization = self
            .store
            .find_organization_by_uid(organization_uid)
            .await
            .map_err(|e| GateError::internal("organization lookup failed", e))?
            .ok_or_else(|| GateError::NotFound(format!("organization {}", organization_uid)))?;

        let member = self
            .store
            .is_user_member_of_org(caller, organization.id)
            .await
            .map_err(|e| GateError::internal("membership lookup failed", e))?;
        if !member {
            return Err(GateError::PermissionDenied(
                "user not in organization".into(),
            ));
        }

        Ok(organization)
    }

    /// Issue a new share token for a collection the caller can access
    pub async fn issue_share_link(
        &self,
        collection: &Collection,
        caller: UserId,
    ) -> Result<ShareLink, GateError> {
        self.authorize(collection, caller).await?;

        let token = generate_share_token()?;
        let link = self
            .store
            .create_share_link(&token, collection.id, caller)
            .await
            .map_err(|e| GateError::internal("failed to create share link", e))?;

        tracing::info!(collection = %collection.uid, user_id = caller, "share link issued");
        Ok(link)
    }

    /// Fetch a collection through a share token, counting the access.
    ///
    /// The increment happens first and is atomic in the store; an unknown
    ///  token fails with `NotFound` before any counter is touched.
    pub async fn fetch_shared(&self, token: &str) -> Result<SharedCollection, GateError> {
        if token.is_empty() {
            return Err(GateError::InvalidInput("token is required".into()));
        }

        let link = self
            .store
            .increment_share_access_count(token)
            .await
            .map_err(|e| GateError::internal("failed to record share access", e))?
            .ok_or_else(|| GateError::NotFound("share token".into()))?;

        // NOTE: no rollback of the increment if the collection vanished in
        //  between; links cascade with their collection so this is a delete race
        let collection = self
            .store
            .find_collection_by_id(link.collection_id)
            .await
            .map_err(|e| GateError::internal("collection lookup failed", e))?
            .ok_or_else(|| GateError::NotFound("collection".into()))?;

        Ok(SharedCollection {
            collection,
            access_count: link.access_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::NewCollection;
    use crate::store::MemoryStore;

    struct Fixture {
        store: MemoryStore,
        access: AccessController<MemoryStore>,
        owner: UserId,
        member: UserId,
        outsider: UserId,
        organization: Organization,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let owner = store.create_user("owner@x.com").await.unwrap().id;
        let member = store.create_user("member@x.com").await.unwrap().id;
        let outsider = store.create_user("outsider@x.com").await.unwrap().id;
        let organization = store.create_organization("acme").await.unwrap();
        store
            .add_organization_member(owner, organization.id)
            .await
            .unwrap();
        store
            .add_organization_member(member, organization.id)
            .await
            .unwrap();

        Fixture {
            access: AccessController::new(store.clone()),
            store,
            owner,
            member,
            outsider,
            organization,
        }
    }

    async fn collection(
        f: &Fixture,
        access_level: AccessLevel,
        organization_id: Option<i64>,
    ) -> Collection {
        f.store
            .create_collection(NewCollection {
                name: "c".to_string(),
                data: serde_json::Map::new(),
                access_level,
                owner_id: Some(f.owner),
                organization_id,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_owner_always_granted() {
        let f = fixture().await;
        for level in [
            AccessLevel::Private,
            AccessLevel::Organization,
            AccessLevel::Shared,
        ] {
            let c = collection(&f, level, Some(f.organization.id)).await;
            assert!(f.access.can_access(&c, f.owner).await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_private_denies_others() {
        let f = fixture().await;
        let c = collection(&f, AccessLevel::Private, None).await;
        assert!(!f.access.can_access(&c, f.member).await.unwrap());
        assert!(!f.access.can_access(&c, f.outsider).await.unwrap());
        assert!(matches!(
            f.access.authorize(&c, f.outsider).await,
            Err(GateError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_organization_grants_members_only() {
        let f = fixture().await;
        let c = collection(&f, AccessLevel::Organization, Some(f.organization.id)).await;
        assert!(f.access.can_access(&c, f.member).await.unwrap());
        assert!(!f.access.can_access(&c, f.outsider).await.unwrap());
    }

    #[tokio::test]
    async fn test_membership_ignored_unless_organization_scoped() {
        let f = fixture().await;
        // a stale organization id on a private collection grants nothing
        let c = collection(&f, AccessLevel::Private, Some(f.organization.id)).await;
        assert!(!f.access.can_access(&c, f.member).await.unwrap());
    }

    #[tokio::test]
    async fn test_require_membership() {
        let f = fixture().await;
        let org = f
            .access
            .require_membership(f.organization.uid, f.member)
            .await
            .unwrap();
        assert_eq!(org.id, f.organization.id);

        assert!(matches!(
            f.access
                .require_membership(f.organization.uid, f.outsider)
                .await,
            Err(GateError::PermissionDenied(_))
        ));
        assert!(matches!(
            f.access.require_membership(Uuid::new_v4(), f.member).await,
            Err(GateError::NotFound(_))
        ));
    }

    #[test]
    fn test_share_token_format() {
        let token = generate_share_token().unwrap();
        assert_eq!(token.len(), 64);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_ne!(token, generate_share_token().unwrap());
    }

    #[tokio::test]
    async fn test_issue_requires_access() {
        let f = fixture().await;
        let c = collection(&f, AccessLevel::Private, None).await;

        assert!(matches!(
            f.access.issue_share_link(&c, f.outsider).await,
            Err(GateError::PermissionDenied(_))
        ));

        let link = f.access.issue_share_link(&c, f.owner).await.unwrap();
        assert_eq!(link.collection_id, c.id);
        assert_eq!(link.access_count, 0);
        assert_eq!(link.created_by, f.owner);
    }

    #[tokio::test]
    async fn test_fetch_shared_counts_each_fetch() {
        let f = fixture().await;
        let c = collection(&f, AccessLevel::Shared, None).await;
        let link = f.access.issue_share_link(&c, f.owner).await.unwrap();

        let first = f.access.fetch_shared(&link.token).await.unwrap();
        assert_eq!(first.access_count, 1);
        assert_eq!(first.collection.uid, c.uid);

        let second = f.access.fetch_shared(&link.token).await.unwrap();
        assert_eq!(second.access_count, 2);
    }

    #[tokio::test]
    async fn test_fetch_unknown_token() {
        let f = fixture().await;
        let c = collection(&f, AccessLevel::Shared, None).await;
        let link = f.access.issue_share_link(&c, f.owner).await.unwrap();

        assert!(matches!(
            f.access.fetch_shared("deadbeef").await,
            Err(GateError::NotFound(_))
        ));
        assert!(matches!(
            f.access.fetch_shared("").await,
            Err(GateError::InvalidInput(_))
        ));

        // the failed fetches did not count against the real link
        let fetched = f.access.fetch_shared(&link.token).await.unwrap();
        assert_eq!(fetched.access_count, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_fetches_count_exactly() {
        let f = fixture().await;
        let c = collection(&f, AccessLevel::Shared, None).await;
        let link = f.access.issue_share_link(&c, f.owner).await.unwrap();
        let access = Arc::new(f.access.clone());

        let handles = (0..50).map(|_| {
            let access = access.clone();
            let token = link.token.clone();
            tokio::spawn(async move { access.fetch_shared(&token).await.unwrap().access_count })
        });
        let mut counts: Vec<i64> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        counts.sort_unstable();

        assert_eq!(counts, (1..=50).collect::<Vec<i64>>());
    }
}
