//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up with
//! idempotent CREATE TABLE IF NOT EXISTS statements, so the service starts
//! cleanly against an empty root folder.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the full schema (test support)
pub async fn init_memory_database() -> Result<SqlitePool> {
    // Single connection: each sqlite::memory: connection is its own database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

/// Run all schema creation statements (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_stores_table(pool).await?;
    create_products_table(pool).await?;
    create_master_products_table(pool).await?;
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            external_uid TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            email_verified INTEGER NOT NULL DEFAULT 0,
            profile_picture TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_stores_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stores (
            guid TEXT PRIMARY KEY,
            owner_guid TEXT NOT NULL REFERENCES users(guid),
            name TEXT NOT NULL,
            street TEXT,
            city TEXT,
            state TEXT,
            pincode TEXT,
            country TEXT NOT NULL DEFAULT 'India',
            full_address TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT,
            business_type TEXT NOT NULL DEFAULT 'retail',
            low_stock_threshold INTEGER NOT NULL DEFAULT 10,
            expiry_alert_days INTEGER NOT NULL DEFAULT 7,
            currency TEXT NOT NULL DEFAULT 'INR',
            description TEXT,
            logo TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_stores_owner ON stores(owner_guid, is_active)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_products_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            guid TEXT PRIMARY KEY,
            store_guid TEXT NOT NULL REFERENCES stores(guid),
            name TEXT NOT NULL,
            brand TEXT,
            barcode TEXT,
            category TEXT NOT NULL,
            price REAL NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0,
            unit TEXT NOT NULL DEFAULT 'Pieces',
            exp_date TEXT,
            image TEXT,
            source TEXT,
            confidence REAL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_by TEXT NOT NULL REFERENCES users(guid),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Barcode unique per store, but only when one is present
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_products_store_barcode
        ON products(store_guid, barcode)
        WHERE barcode IS NOT NULL AND barcode != ''
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_store ON products(store_guid, is_active)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_master_products_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS master_products (
            guid TEXT PRIMARY KEY,
            barcode TEXT NOT NULL UNIQUE,
            name TEXT,
            brand TEXT,
            quantity TEXT,
            category TEXT,
            image TEXT,
            source TEXT,
            confidence REAL NOT NULL DEFAULT 0.3,
            resolved_at TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_master_products_barcode ON master_products(barcode)")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_schema() {
        let pool = init_memory_database().await.expect("Should init schema");

        // All four tables exist and are queryable
        for table in ["users", "stores", "products", "master_products"] {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            let count: i64 = sqlx::query_scalar(&sql)
                .fetch_one(&pool)
                .await
                .unwrap_or_else(|_| panic!("Table {} should exist", table));
            assert_eq!(count, 0);
        }
    }

    #[tokio::test]
    async fn test_schema_creation_is_idempotent() {
        let pool = init_memory_database().await.expect("Should init schema");
        create_schema(&pool).await.expect("Second run should be a no-op");
    }

    #[tokio::test]
    async fn test_master_products_barcode_unique() {
        let pool = init_memory_database().await.expect("Should init schema");

        let insert = r#"
            INSERT INTO master_products (guid, barcode, resolved_at)
            VALUES (?, '123456789012', '2026-01-01T00:00:00Z')
        "#;
        sqlx::query(insert)
            .bind(uuid::Uuid::new_v4().to_string())
            .execute(&pool)
            .await
            .expect("First insert should succeed");

        let second = sqlx::query(insert)
            .bind(uuid::Uuid::new_v4().to_string())
            .execute(&pool)
            .await;
        assert!(second.is_err(), "Duplicate barcode should violate UNIQUE");
    }

    #[tokio::test]
    async fn test_product_barcode_unique_per_store_allows_missing() {
        let pool = init_memory_database().await.expect("Should init schema");

        sqlx::query(
            "INSERT INTO users (guid, external_uid, name, email) VALUES ('u1', 'ext1', 'Owner', 'o@example.com')",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO stores (guid, owner_guid, name, full_address, phone) VALUES ('s1', 'u1', 'Shop', 'Addr', '9876543210')",
        )
        .execute(&pool)
        .await
        .unwrap();

        // Two products without barcode in the same store are fine
        for guid in ["p1", "p2"] {
            sqlx::query(
                "INSERT INTO products (guid, store_guid, name, category, price, created_by) VALUES (?, 's1', ?, 'Misc', 10.0, 'u1')",
            )
            .bind(guid)
            .bind(format!("Item {}", guid))
            .execute(&pool)
            .await
            .expect("Products without barcode should not collide");
        }

        // Same barcode twice in one store is rejected
        sqlx::query(
            "INSERT INTO products (guid, store_guid, name, category, price, created_by, barcode) VALUES ('p3', 's1', 'Item 3', 'Misc', 10.0, 'u1', '123456789012')",
        )
        .execute(&pool)
        .await
        .unwrap();
        let dup = sqlx::query(
            "INSERT INTO products (guid, store_guid, name, category, price, created_by, barcode) VALUES ('p4', 's1', 'Item 4', 'Misc', 10.0, 'u1', '123456789012')",
        )
        .execute(&pool)
        .await;
        assert!(dup.is_err(), "Duplicate barcode in one store should be rejected");
    }
}
