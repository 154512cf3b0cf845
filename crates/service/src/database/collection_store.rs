use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use common::model::{CollectionId, CollectionUpdate, OrganizationId, UserId};
use common::prelude::{
    AccessLevel, Collection, CollectionStore, NewCollection, Organization, ShareLink, User,
};

use super::types::{DAccessLevel, DUuid};
use super::Database;

type JsonObject = serde_json::Map<String, serde_json::Value>;

const USER_COLUMNS: &str = "id, uid, email, created_at";
const ORGANIZATION_COLUMNS: &str = "id, uid, name, created_at";
const COLLECTION_COLUMNS: &str =
    "id, uid, name, data, access_level, owner_id, organization_id, created_at, updated_at";
const SHARE_LINK_COLUMNS: &str = "token, collection_id, created_by, access_count, created_at";

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        uid: row.try_get::<DUuid, _>("uid")?.into(),
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

fn organization_from_row(row: &SqliteRow) -> Result<Organization, sqlx::Error> {
    Ok(Organization {
        id: row.try_get("id")?,
        uid: row.try_get::<DUuid, _>("uid")?.into(),
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

fn collection_from_row(row: &SqliteRow) -> Result<Collection, sqlx::Error> {
    Ok(Collection {
        id: row.try_get("id")?,
        uid: row.try_get::<DUuid, _>("uid")?.into(),
        name: row.try_get("name")?,
        data: row.try_get::<Json<JsonObject>, _>("data")?.0,
        access_level: row.try_get::<DAccessLevel, _>("access_level")?.into(),
        owner_id: row.try_get("owner_id")?,
        organization_id: row.try_get("organization_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn share_link_from_row(row: &SqliteRow) -> Result<ShareLink, sqlx::Error> {
    Ok(ShareLink {
        token: row.try_get("token")?,
        collection_id: row.try_get("collection_id")?,
        created_by: row.try_get("created_by")?,
        access_count: row.try_get("access_count")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl CollectionStore for Database {
    type Error = sqlx::Error;

    async fn create_user(&self, email: &str) -> Result<User, Self::Error> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (uid, email, created_at) VALUES (?1, ?2, ?3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(DUuid::new())
        .bind(email)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&**self)
        .await?;

        user_from_row(&row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Self::Error> {
        sqlx::query(&format!("SELECT {} FROM users WHERE email = ?1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&**self)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn find_user_by_uid(&self, uid: Uuid) -> Result<Option<User>, Self::Error> {
        sqlx::query(&format!("SELECT {} FROM users WHERE uid = ?1", USER_COLUMNS))
            .bind(DUuid::from(uid))
            .fetch_optional(&**self)
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn create_organization(&self, name: &str) -> Result<Organization, Self::Error> {
        let row = sqlx::query(&format!(
            "INSERT INTO organizations (uid, name, created_at) VALUES (?1, ?2, ?3) RETURNING {}",
            ORGANIZATION_COLUMNS
        ))
        .bind(DUuid::new())
        .bind(name)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&**self)
        .await?;

        organization_from_row(&row)
    }

    async fn find_organization_by_uid(
        &self,
        uid: Uuid,
    ) -> Result<Option<Organization>, Self::Error> {
        sqlx::query(&format!(
            "SELECT {} FROM organizations WHERE uid = ?1",
            ORGANIZATION_COLUMNS
        ))
        .bind(DUuid::from(uid))
        .fetch_optional(&**self)
        .await?
        .as_ref()
        .map(organization_from_row)
        .transpose()
    }

    async fn find_organization_by_id(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, Self::Error> {
        sqlx::query(&format!(
            "SELECT {} FROM organizations WHERE id = ?1",
            ORGANIZATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&**self)
        .await?
        .as_ref()
        .map(organization_from_row)
        .transpose()
    }

    async fn add_organization_member(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            INSERT INTO organization_members (user_id, organization_id, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id, organization_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .bind(OffsetDateTime::now_utc())
        .execute(&**self)
        .await?;

        Ok(())
    }

    async fn is_user_member_of_org(
        &self,
        user_id: UserId,
        organization_id: OrganizationId,
    ) -> Result<bool, Self::Error> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM organization_members
            WHERE user_id = ?1 AND organization_id = ?2
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(&**self)
        .await?;

        Ok(row.is_some())
    }

    async fn create_collection(&self, new: NewCollection) -> Result<Collection, Self::Error> {
        let now = OffsetDateTime::now_utc();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO collections
                (uid, name, data, access_level, owner_id, organization_id, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING {}
            "#,
            COLLECTION_COLUMNS
        ))
        .bind(DUuid::new())
        .bind(&new.name)
        .bind(Json(&new.data))
        .bind(DAccessLevel::from(new.access_level))
        .bind(new.owner_id)
        .bind(new.organization_id)
        .bind(now)
        .fetch_one(&**self)
        .await?;

        collection_from_row(&row)
    }

    async fn find_collection_by_uid(&self, uid: Uuid) -> Result<Option<Collection>, Self::Error> {
        sqlx::query(&format!(
            "SELECT {} FROM collections WHERE uid = ?1",
            COLLECTION_COLUMNS
        ))
        .bind(DUuid::from(uid))
        .fetch_optional(&**self)
        .await?
        .as_ref()
        .map(collection_from_row)
        .transpose()
    }

    async fn find_collection_by_id(
        &self,
        id: CollectionId,
    ) -> Result<Option<Collection>, Self::Error> {
        sqlx::query(&format!(
            "SELECT {} FROM collections WHERE id = ?1",
            COLLECTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&**self)
        .await?
        .as_ref()
        .map(collection_from_row)
        .transpose()
    }

    async fn update_collection(
        &self,
        id: CollectionId,
        update: CollectionUpdate,
    ) -> Result<Option<Collection>, Self::Error> {
        // a collection leaving the organization tier drops its organization
        let organization_id = match update.access_level {
            AccessLevel::Organization => update.organization_id,
            _ => None,
        };

        sqlx::query(&format!(
            r#"
            UPDATE collections
            SET name = ?1, data = ?2, access_level = ?3, organization_id = ?4, updated_at = ?5
            WHERE id = ?6
            RETURNING {}
            "#,
            COLLECTION_COLUMNS
        ))
        .bind(&update.name)
        .bind(Json(&update.data))
        .bind(DAccessLevel::from(update.access_level))
        .bind(organization_id)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .fetch_optional(&**self)
        .await?
        .as_ref()
        .map(collection_from_row)
        .transpose()
    }

    async fn delete_collection(&self, id: CollectionId) -> Result<bool, Self::Error> {
        // share links go with the collection through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM collections WHERE id = ?1")
            .bind(id)
            .execute(&**self)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_share_link(
        &self,
        token: &str,
        collection_id: CollectionId,
        created_by: UserId,
    ) -> Result<ShareLink, Self::Error> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO share_links (token, collection_id, created_by, access_count, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            RETURNING {}
            "#,
            SHARE_LINK_COLUMNS
        ))
        .bind(token)
        .bind(collection_id)
        .bind(created_by)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&**self)
        .await?;

        share_link_from_row(&row)
    }

    async fn increment_share_access_count(
        &self,
        token: &str,
    ) -> Result<Option<ShareLink>, Self::Error> {
        sqlx::query(&format!(
            r#"
            UPDATE share_links
            SET access_count = access_count + 1
            WHERE token = ?1
            RETURNING {}
            "#,
            SHARE_LINK_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&**self)
        .await?
        .as_ref()
        .map(share_link_from_row)
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn db() -> Database {
        Database::in_memory().await.unwrap()
    }

    fn new_collection(
        owner: UserId,
        level: AccessLevel,
        org: Option<OrganizationId>,
    ) -> NewCollection {
        let mut data = JsonObject::new();
        data.insert("answer".to_string(), serde_json::json!(42));
        NewCollection {
            name: "notes".to_string(),
            data,
            access_level: level,
            owner_id: Some(owner),
            organization_id: org,
        }
    }

    #[tokio::test]
    async fn test_users_roundtrip() {
        let db = db().await;
        let user = db.create_user("a@x.com").await.unwrap();

        let by_email = db.find_user_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.uid, user.uid);

        let by_uid = db.find_user_by_uid(user.uid).await.unwrap().unwrap();
        assert_eq!(by_uid.email, "a@x.com");

        assert!(db.find_user_by_email("b@x.com").await.unwrap().is_none());
        assert!(db.create_user("a@x.com").await.is_err());
    }

    #[tokio::test]
    async fn test_membership_is_idempotent() {
        let db = db().await;
        let user = db.create_user("a@x.com").await.unwrap();
        let org = db.create_organization("acme").await.unwrap();

        assert!(!db.is_user_member_of_org(user.id, org.id).await.unwrap());
        db.add_organization_member(user.id, org.id).await.unwrap();
        db.add_organization_member(user.id, org.id).await.unwrap();
        assert!(db.is_user_member_of_org(user.id, org.id).await.unwrap());

        let found = db.find_organization_by_uid(org.uid).await.unwrap().unwrap();
        assert_eq!(found.id, org.id);
        let found = db.find_organization_by_id(org.id).await.unwrap().unwrap();
        assert_eq!(found.name, "acme");
    }

    #[tokio::test]
    async fn test_collection_crud() {
        let db = db().await;
        let user = db.create_user("a@x.com").await.unwrap();
        let org = db.create_organization("acme").await.unwrap();

        let created = db
            .create_collection(new_collection(user.id, AccessLevel::Organization, Some(org.id)))
            .await
            .unwrap();
        assert_eq!(created.access_level, AccessLevel::Organization);
        assert_eq!(created.organization_id, Some(org.id));
        assert_eq!(created.data["answer"], serde_json::json!(42));

        let fetched = db.find_collection_by_uid(created.uid).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let updated = db
            .update_collection(
                created.id,
                CollectionUpdate {
                    name: "renamed".to_string(),
                    data: JsonObject::new(),
                    access_level: AccessLevel::Private,
                    organization_id: Some(org.id),
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.access_level, AccessLevel::Private);
        assert_eq!(updated.organization_id, None);
        assert!(updated.data.is_empty());

        assert!(db.delete_collection(created.id).await.unwrap());
        assert!(!db.delete_collection(created.id).await.unwrap());
        assert!(db.find_collection_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_organization_level_requires_organization() {
        let db = db().await;
        let user = db.create_user("a@x.com").await.unwrap();
        let result = db
            .create_collection(new_collection(user.id, AccessLevel::Organization, None))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_share_link_increment_and_cascade() {
        let db = db().await;
        let user = db.create_user("a@x.com").await.unwrap();
        let collection = db
            .create_collection(new_collection(user.id, AccessLevel::Shared, None))
            .await
            .unwrap();

        let link = db
            .create_share_link("abc123", collection.id, user.id)
            .await
            .unwrap();
        assert_eq!(link.access_count, 0);

        let first = db.increment_share_access_count("abc123").await.unwrap().unwrap();
        let second = db.increment_share_access_count("abc123").await.unwrap().unwrap();
        assert_eq!(first.access_count, 1);
        assert_eq!(second.access_count, 2);
        assert!(db.increment_share_access_count("nope").await.unwrap().is_none());

        db.delete_collection(collection.id).await.unwrap();
        assert!(db.increment_share_access_count("abc123").await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_increments_are_exact() {
        // file-backed so the pool hands out several connections at once
        let dir = tempfile::tempdir().unwrap();
        let url = url::Url::parse(&format!("sqlite://{}", dir.path().join("trove.db").display()))
            .unwrap();
        let db = Database::connect(&url).await.unwrap();

        let user = db.create_user("a@x.com").await.unwrap();
        let collection = db
            .create_collection(new_collection(user.id, AccessLevel::Shared, None))
            .await
            .unwrap();
        db.create_share_link("abc123", collection.id, user.id)
            .await
            .unwrap();

        const FETCHES: i64 = 64;
        let handles = (0..FETCHES).map(|_| {
            let db = db.clone();
            tokio::spawn(async move {
                db.increment_share_access_count("abc123")
                    .await
                    .unwrap()
                    .unwrap()
                    .access_count
            })
        });
        let mut counts: Vec<i64> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        counts.sort_unstable();

        assert_eq!(counts, (1..=FETCHES).collect::<Vec<_>>());
    }
}
