//! Cache store seam for resolved products
//!
//! The resolver talks to the persistent cache through this trait so tests can
//! substitute in-memory fakes and exercise the insert race deterministically.

use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db::master_products::{self, MasterProduct};

/// Cache store failures
#[derive(Debug, Error)]
pub enum CacheError {
    /// A record for this barcode already exists (insert race lost)
    #[error("A record already exists for barcode {0}")]
    Duplicate(String),

    /// Any other persistence failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Keyed lookup/insert store, one record per barcode
#[async_trait]
pub trait ProductCache: Send + Sync {
    /// Look up the cached record for a barcode
    async fn find_by_barcode(&self, barcode: &str) -> Result<Option<MasterProduct>, CacheError>;

    /// Insert a new record and return it as stored (with lifecycle
    /// timestamps filled in). Fails with `CacheError::Duplicate` when the
    /// barcode is already cached.
    async fn insert(&self, record: &MasterProduct) -> Result<MasterProduct, CacheError>;
}

/// SQLite-backed cache over the `master_products` table
pub struct SqliteProductCache {
    pool: SqlitePool,
}

impl SqliteProductCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductCache for SqliteProductCache {
    async fn find_by_barcode(&self, barcode: &str) -> Result<Option<MasterProduct>, CacheError> {
        Ok(master_products::load_by_barcode(&self.pool, barcode).await?)
    }

    async fn insert(&self, record: &MasterProduct) -> Result<MasterProduct, CacheError> {
        master_products::insert(&self.pool, record)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    CacheError::Duplicate(record.barcode.clone())
                }
                _ => CacheError::Database(err),
            })?;

        // Re-read so the caller sees the row exactly as stored
        let stored = master_products::load_by_barcode(&self.pool, &record.barcode).await?;
        stored.ok_or_else(|| {
            CacheError::Database(sqlx::Error::RowNotFound)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::normalizer::NormalizedProduct;
    use dukaan_common::db::init_memory_database;

    fn record(barcode: &str) -> MasterProduct {
        MasterProduct::from_normalized(
            barcode,
            NormalizedProduct {
                name: Some("Parle-g".to_string()),
                brand: Some("Parle".to_string()),
                quantity: Some("100 g".to_string()),
                category: None,
                image: None,
                source: Some("openfoodfacts".to_string()),
                confidence: 0.9,
            },
        )
    }

    #[tokio::test]
    async fn test_insert_returns_stored_row() {
        let pool = init_memory_database().await.expect("Should init schema");
        let cache = SqliteProductCache::new(pool);

        let stored = cache
            .insert(&record("123456789012"))
            .await
            .expect("Insert should succeed");
        assert!(stored.created_at.is_some());

        let found = cache
            .find_by_barcode("123456789012")
            .await
            .expect("Find should succeed")
            .expect("Record should exist");
        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn test_duplicate_insert_maps_to_duplicate_error() {
        let pool = init_memory_database().await.expect("Should init schema");
        let cache = SqliteProductCache::new(pool);

        cache
            .insert(&record("123456789012"))
            .await
            .expect("First insert should succeed");

        let err = cache
            .insert(&record("123456789012"))
            .await
            .expect_err("Second insert should fail");
        assert!(matches!(err, CacheError::Duplicate(ref b) if b == "123456789012"));
    }
}
