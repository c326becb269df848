//! Store-scoped product catalog operations
//!
//! Each row belongs to one store. Name uniqueness within a store is
//! case-insensitive and enforced at the service level against active rows;
//! barcode uniqueness is enforced by a partial unique index.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// A product in one store's catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub guid: String,
    pub store_guid: String,
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
    pub unit: String,
    pub exp_date: Option<String>,
    pub image: Option<String>,
    pub source: Option<String>,
    pub confidence: Option<f64>,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Product {
    pub fn new(
        store_guid: String,
        name: String,
        category: String,
        price: f64,
        created_by: String,
    ) -> Self {
        Self {
            guid: Uuid::new_v4().to_string(),
            store_guid,
            name,
            brand: None,
            barcode: None,
            category,
            price,
            quantity: 0,
            unit: "Pieces".to_string(),
            exp_date: None,
            image: None,
            source: None,
            confidence: None,
            is_active: true,
            created_by,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Save a new product row
pub async fn insert_product(pool: &SqlitePool, product: &Product) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO products (
            guid, store_guid, name, brand, barcode, category, price, quantity,
            unit, exp_date, image, source, confidence, is_active, created_by,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(&product.guid)
    .bind(&product.store_guid)
    .bind(&product.name)
    .bind(&product.brand)
    .bind(&product.barcode)
    .bind(&product.category)
    .bind(product.price)
    .bind(product.quantity)
    .bind(&product.unit)
    .bind(&product.exp_date)
    .bind(&product.image)
    .bind(&product.source)
    .bind(product.confidence)
    .bind(product.is_active)
    .bind(&product.created_by)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load product by guid (active or not)
pub async fn load_product(pool: &SqlitePool, guid: &str) -> Result<Option<Product>> {
    let row = sqlx::query(&select_sql("WHERE guid = ?"))
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(map_product))
}

/// All active products of one store
pub async fn load_products_by_store(pool: &SqlitePool, store_guid: &str) -> Result<Vec<Product>> {
    let rows = sqlx::query(&select_sql("WHERE store_guid = ? AND is_active = 1"))
        .bind(store_guid)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(map_product).collect())
}

/// Case-insensitive duplicate-name check against active rows
pub async fn find_active_product_by_name(
    pool: &SqlitePool,
    store_guid: &str,
    name: &str,
) -> Result<Option<Product>> {
    let row = sqlx::query(&select_sql(
        "WHERE store_guid = ? AND name = ? COLLATE NOCASE AND is_active = 1",
    ))
    .bind(store_guid)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(map_product))
}

/// Scan auto-fill lookup: active product with this barcode in this store
pub async fn find_active_product_by_barcode(
    pool: &SqlitePool,
    store_guid: &str,
    barcode: &str,
) -> Result<Option<Product>> {
    let row = sqlx::query(&select_sql(
        "WHERE store_guid = ? AND barcode = ? AND is_active = 1",
    ))
    .bind(store_guid)
    .bind(barcode)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(map_product))
}

/// Write all mutable fields of an existing product
pub async fn update_product(pool: &SqlitePool, product: &Product) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE products
        SET name = ?, brand = ?, barcode = ?, category = ?, price = ?,
            quantity = ?, unit = ?, exp_date = ?, image = ?, source = ?,
            confidence = ?, is_active = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&product.name)
    .bind(&product.brand)
    .bind(&product.barcode)
    .bind(&product.category)
    .bind(product.price)
    .bind(product.quantity)
    .bind(&product.unit)
    .bind(&product.exp_date)
    .bind(&product.image)
    .bind(&product.source)
    .bind(product.confidence)
    .bind(product.is_active)
    .bind(&product.guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Soft delete: clear the active flag, keep the row
pub async fn deactivate_product(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query(
        "UPDATE products SET is_active = 0, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

fn select_sql(where_clause: &str) -> String {
    format!(
        r#"
        SELECT guid, store_guid, name, brand, barcode, category, price, quantity,
               unit, exp_date, image, source, confidence, is_active, created_by,
               created_at, updated_at
        FROM products
        {}
        "#,
        where_clause
    )
}

fn map_product(row: sqlx::sqlite::SqliteRow) -> Product {
    Product {
        guid: row.get("guid"),
        store_guid: row.get("store_guid"),
        name: row.get("name"),
        brand: row.get("brand"),
        barcode: row.get("barcode"),
        category: row.get("category"),
        price: row.get("price"),
        quantity: row.get("quantity"),
        unit: row.get("unit"),
        exp_date: row.get("exp_date"),
        image: row.get("image"),
        source: row.get("source"),
        confidence: row.get("confidence"),
        is_active: row.get("is_active"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
