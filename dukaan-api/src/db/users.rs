//! User database operations
//!
//! Local user rows mirror accounts held by the external identity provider;
//! `external_uid` is the provider's stable subject identifier.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Registered store owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub guid: String,
    pub external_uid: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub profile_picture: Option<String>,
    pub created_at: Option<String>,
}

impl User {
    /// Create a new user from verified identity claims. A missing display
    /// name falls back to the mailbox part of the email address.
    pub fn new(
        external_uid: String,
        email: String,
        name: Option<String>,
        email_verified: bool,
        profile_picture: Option<String>,
    ) -> Self {
        let name = name.unwrap_or_else(|| {
            email.split('@').next().unwrap_or(email.as_str()).to_string()
        });
        Self {
            guid: Uuid::new_v4().to_string(),
            external_uid,
            name,
            email,
            email_verified,
            profile_picture,
            created_at: None,
        }
    }
}

/// Save a new user row
pub async fn insert_user(pool: &SqlitePool, user: &User) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (
            guid, external_uid, name, email, email_verified, profile_picture,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(&user.guid)
    .bind(&user.external_uid)
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.email_verified)
    .bind(&user.profile_picture)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load user by the identity provider's subject identifier
pub async fn load_user_by_external_uid(
    pool: &SqlitePool,
    external_uid: &str,
) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT guid, external_uid, name, email, email_verified, profile_picture, created_at
        FROM users
        WHERE external_uid = ?
        "#,
    )
    .bind(external_uid)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(map_user))
}

/// Load user by guid
pub async fn load_user_by_guid(pool: &SqlitePool, guid: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT guid, external_uid, name, email, email_verified, profile_picture, created_at
        FROM users
        WHERE guid = ?
        "#,
    )
    .bind(guid)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(map_user))
}

/// Refresh mutable profile fields from the latest identity claims
pub async fn update_user_profile(
    pool: &SqlitePool,
    guid: &str,
    name: &str,
    email_verified: bool,
    profile_picture: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET name = ?, email_verified = ?, profile_picture = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(name)
    .bind(email_verified)
    .bind(profile_picture)
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

fn map_user(row: sqlx::sqlite::SqliteRow) -> User {
    User {
        guid: row.get("guid"),
        external_uid: row.get("external_uid"),
        name: row.get("name"),
        email: row.get("email"),
        email_verified: row.get("email_verified"),
        profile_picture: row.get("profile_picture"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dukaan_common::db::init_memory_database;

    #[tokio::test]
    async fn test_insert_and_load_by_external_uid() {
        let pool = init_memory_database().await.expect("Should init schema");
        let user = User::new(
            "ext-123".to_string(),
            "ramesh@example.com".to_string(),
            Some("Ramesh".to_string()),
            true,
            None,
        );

        insert_user(&pool, &user).await.expect("Insert should succeed");

        let loaded = load_user_by_external_uid(&pool, "ext-123")
            .await
            .expect("Load should succeed")
            .expect("User should exist");
        assert_eq!(loaded.guid, user.guid);
        assert_eq!(loaded.name, "Ramesh");
        assert!(loaded.email_verified);
        assert!(loaded.created_at.is_some());
    }

    #[tokio::test]
    async fn test_name_falls_back_to_mailbox() {
        let user = User::new(
            "ext-1".to_string(),
            "shopkeeper@example.com".to_string(),
            None,
            false,
            None,
        );
        assert_eq!(user.name, "shopkeeper");
    }

    #[tokio::test]
    async fn test_duplicate_external_uid_rejected() {
        let pool = init_memory_database().await.expect("Should init schema");
        let first = User::new("ext-1".to_string(), "a@example.com".to_string(), None, false, None);
        let second = User::new("ext-1".to_string(), "b@example.com".to_string(), None, false, None);

        insert_user(&pool, &first).await.expect("First insert should succeed");
        assert!(insert_user(&pool, &second).await.is_err());
    }

    #[tokio::test]
    async fn test_profile_update() {
        let pool = init_memory_database().await.expect("Should init schema");
        let user = User::new("ext-1".to_string(), "a@example.com".to_string(), None, false, None);
        insert_user(&pool, &user).await.expect("Insert should succeed");

        update_user_profile(&pool, &user.guid, "Asha", true, Some("https://img.example/a.png"))
            .await
            .expect("Update should succeed");

        let loaded = load_user_by_guid(&pool, &user.guid)
            .await
            .expect("Load should succeed")
            .expect("User should exist");
        assert_eq!(loaded.name, "Asha");
        assert!(loaded.email_verified);
        assert_eq!(
            loaded.profile_picture.as_deref(),
            Some("https://img.example/a.png")
        );
    }
}
