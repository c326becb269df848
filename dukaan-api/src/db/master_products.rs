//! Master product catalog operations
//!
//! One row per distinct barcode, shared across all stores. Rows are
//! write-once: the resolver only inserts, repeat lookups read the stored
//! record unchanged.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::resolver::normalizer::NormalizedProduct;

/// Canonical resolved product, keyed by barcode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterProduct {
    pub guid: String,
    pub barcode: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub source: Option<String>,
    pub confidence: f64,
    pub resolved_at: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl MasterProduct {
    /// Build a new record from normalized provider data, stamped with the
    /// resolution time. Lifecycle timestamps are filled in by the database.
    pub fn from_normalized(barcode: &str, normalized: NormalizedProduct) -> Self {
        Self {
            guid: Uuid::new_v4().to_string(),
            barcode: barcode.to_string(),
            name: normalized.name,
            brand: normalized.brand,
            quantity: normalized.quantity,
            category: normalized.category,
            image: normalized.image,
            source: normalized.source,
            confidence: normalized.confidence,
            resolved_at: Utc::now().to_rfc3339(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Load master product by barcode
pub async fn load_by_barcode(
    pool: &SqlitePool,
    barcode: &str,
) -> Result<Option<MasterProduct>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT guid, barcode, name, brand, quantity, category, image, source,
               confidence, resolved_at, created_at, updated_at
        FROM master_products
        WHERE barcode = ?
        "#,
    )
    .bind(barcode)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| MasterProduct {
        guid: row.get("guid"),
        barcode: row.get("barcode"),
        name: row.get("name"),
        brand: row.get("brand"),
        quantity: row.get("quantity"),
        category: row.get("category"),
        image: row.get("image"),
        source: row.get("source"),
        confidence: row.get("confidence"),
        resolved_at: row.get("resolved_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }))
}

/// Insert a new master product row
///
/// Fails with a database-level uniqueness violation when the barcode is
/// already cached; callers decide how to resolve that race.
pub async fn insert(pool: &SqlitePool, record: &MasterProduct) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO master_products (
            guid, barcode, name, brand, quantity, category, image, source,
            confidence, resolved_at, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(&record.guid)
    .bind(&record.barcode)
    .bind(&record.name)
    .bind(&record.brand)
    .bind(&record.quantity)
    .bind(&record.category)
    .bind(&record.image)
    .bind(&record.source)
    .bind(record.confidence)
    .bind(&record.resolved_at)
    .execute(pool)
    .await?;

    Ok(())
}
