//! Store database operations
//!
//! Stores are soft-deleted: `is_active` is cleared and the row stays for
//! history, so "load by owner" style queries always filter on it.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// A retail store owned by a registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub guid: String,
    pub owner_guid: String,
    pub name: String,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: String,
    pub full_address: String,
    pub phone: String,
    pub email: Option<String>,
    pub business_type: String,
    pub low_stock_threshold: i64,
    pub expiry_alert_days: i64,
    pub currency: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Store {
    /// New store with the defaults the schema applies
    pub fn new(owner_guid: String, name: String, full_address: String, phone: String) -> Self {
        Self {
            guid: Uuid::new_v4().to_string(),
            owner_guid,
            name,
            street: None,
            city: None,
            state: None,
            pincode: None,
            country: "India".to_string(),
            full_address,
            phone,
            email: None,
            business_type: "retail".to_string(),
            low_stock_threshold: 10,
            expiry_alert_days: 7,
            currency: "INR".to_string(),
            description: None,
            logo: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Save a new store row
pub async fn insert_store(pool: &SqlitePool, store: &Store) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO stores (
            guid, owner_guid, name, street, city, state, pincode, country,
            full_address, phone, email, business_type, low_stock_threshold,
            expiry_alert_days, currency, description, logo, is_active,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(&store.guid)
    .bind(&store.owner_guid)
    .bind(&store.name)
    .bind(&store.street)
    .bind(&store.city)
    .bind(&store.state)
    .bind(&store.pincode)
    .bind(&store.country)
    .bind(&store.full_address)
    .bind(&store.phone)
    .bind(&store.email)
    .bind(&store.business_type)
    .bind(store.low_stock_threshold)
    .bind(store.expiry_alert_days)
    .bind(&store.currency)
    .bind(&store.description)
    .bind(&store.logo)
    .bind(store.is_active)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load store by guid (active or not)
pub async fn load_store(pool: &SqlitePool, guid: &str) -> Result<Option<Store>> {
    let row = sqlx::query(&select_sql("WHERE guid = ?"))
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(map_store))
}

/// Load all active stores of one owner
pub async fn load_stores_by_owner(pool: &SqlitePool, owner_guid: &str) -> Result<Vec<Store>> {
    let rows = sqlx::query(&select_sql("WHERE owner_guid = ? AND is_active = 1"))
        .bind(owner_guid)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(map_store).collect())
}

/// Find an owner's active store by exact name (duplicate-name check)
pub async fn find_active_store_by_name(
    pool: &SqlitePool,
    owner_guid: &str,
    name: &str,
) -> Result<Option<Store>> {
    let row = sqlx::query(&select_sql(
        "WHERE owner_guid = ? AND name = ? AND is_active = 1",
    ))
    .bind(owner_guid)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(map_store))
}

/// Write all mutable fields of an existing store
pub async fn update_store(pool: &SqlitePool, store: &Store) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE stores
        SET name = ?, street = ?, city = ?, state = ?, pincode = ?, country = ?,
            full_address = ?, phone = ?, email = ?, business_type = ?,
            low_stock_threshold = ?, expiry_alert_days = ?, currency = ?,
            description = ?, logo = ?, is_active = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&store.name)
    .bind(&store.street)
    .bind(&store.city)
    .bind(&store.state)
    .bind(&store.pincode)
    .bind(&store.country)
    .bind(&store.full_address)
    .bind(&store.phone)
    .bind(&store.email)
    .bind(&store.business_type)
    .bind(store.low_stock_threshold)
    .bind(store.expiry_alert_days)
    .bind(&store.currency)
    .bind(&store.description)
    .bind(&store.logo)
    .bind(store.is_active)
    .bind(&store.guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Soft delete: clear the active flag, keep the row
pub async fn deactivate_store(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query(
        "UPDATE stores SET is_active = 0, updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

fn select_sql(where_clause: &str) -> String {
    format!(
        r#"
        SELECT guid, owner_guid, name, street, city, state, pincode, country,
               full_address, phone, email, business_type, low_stock_threshold,
               expiry_alert_days, currency, description, logo, is_active,
               created_at, updated_at
        FROM stores
        {}
        "#,
        where_clause
    )
}

fn map_store(row: sqlx::sqlite::SqliteRow) -> Store {
    Store {
        guid: row.get("guid"),
        owner_guid: row.get("owner_guid"),
        name: row.get("name"),
        street: row.get("street"),
        city: row.get("city"),
        state: row.get("state"),
        pincode: row.get("pincode"),
        country: row.get("country"),
        full_address: row.get("full_address"),
        phone: row.get("phone"),
        email: row.get("email"),
        business_type: row.get("business_type"),
        low_stock_threshold: row.get("low_stock_threshold"),
        expiry_alert_days: row.get("expiry_alert_days"),
        currency: row.get("currency"),
        description: row.get("description"),
        logo: row.get("logo"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
