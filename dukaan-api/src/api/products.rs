//! Store-scoped product endpoints
//!
//! Duplicate rules mirror the catalog constraints: a product name is unique
//! within a store (case-insensitive) and so is a barcode, both among active
//! rows only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use super::auth::{require_user, AuthContext};
use crate::db::products::{self, Product};
use crate::db::stores;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProductPayload {
    pub store_id: Option<String>,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub exp_date: Option<String>,
    pub image: Option<String>,
    pub source: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductPayload {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    pub exp_date: Option<String>,
    pub image: Option<String>,
    pub source: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct StoreQuery {
    pub store_id: Option<String>,
}

fn validate_price(price: f64) -> Result<(), ApiError> {
    if price < 0.0 || !price.is_finite() {
        Err(ApiError::BadRequest("Price cannot be negative".to_string()))
    } else {
        Ok(())
    }
}

fn validate_quantity(quantity: i64) -> Result<(), ApiError> {
    if quantity < 0 {
        Err(ApiError::BadRequest("Quantity cannot be negative".to_string()))
    } else {
        Ok(())
    }
}

async fn check_duplicate_name(
    state: &AppState,
    store_guid: &str,
    name: &str,
) -> Result<(), ApiError> {
    if products::find_active_product_by_name(&state.db, store_guid, name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "A product with the name \"{}\" already exists in this store.",
            name
        )));
    }
    Ok(())
}

async fn check_duplicate_barcode(
    state: &AppState,
    store_guid: &str,
    barcode: &str,
) -> Result<(), ApiError> {
    if let Some(existing) =
        products::find_active_product_by_barcode(&state.db, store_guid, barcode).await?
    {
        return Err(ApiError::Conflict(format!(
            "A product with barcode \"{}\" already exists in this store (Product: {}).",
            barcode, existing.name
        )));
    }
    Ok(())
}

/// POST /api/product/add_product
pub async fn add_product(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let user = require_user(&ctx)?;

    let (Some(name), Some(category), Some(price)) =
        (payload.name.as_deref(), payload.category.as_deref(), payload.price)
    else {
        return Err(ApiError::BadRequest(
            "Name, category, and price are required".to_string(),
        ));
    };
    let name = name.trim();
    if name.is_empty() || category.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Name, category, and price are required".to_string(),
        ));
    }
    validate_price(price)?;

    let store_id = payload
        .store_id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Store reference is required".to_string()))?;
    let store = stores::load_store(&state.db, store_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Store not found".to_string()))?;

    check_duplicate_name(&state, &store.guid, name).await?;

    let barcode = payload
        .barcode
        .as_deref()
        .map(str::trim)
        .filter(|barcode| !barcode.is_empty());
    if let Some(barcode) = barcode {
        check_duplicate_barcode(&state, &store.guid, barcode).await?;
    }

    let mut product = Product::new(
        store.guid.clone(),
        name.to_string(),
        category.trim().to_string(),
        price,
        user.guid.clone(),
    );
    product.brand = payload.brand;
    product.barcode = barcode.map(String::from);
    if let Some(quantity) = payload.quantity {
        validate_quantity(quantity)?;
        product.quantity = quantity;
    }
    if let Some(unit) = payload.unit {
        product.unit = unit;
    }
    product.exp_date = payload.exp_date;
    product.image = payload.image;
    product.source = payload.source;
    product.confidence = payload.confidence;

    products::insert_product(&state.db, &product).await?;

    let stored = products::load_product(&state.db, &product.guid)
        .await?
        .ok_or_else(|| ApiError::Internal("Product row missing after insert".to_string()))?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/product/all?store_id=...
pub async fn get_all_products(
    State(state): State<AppState>,
    Query(query): Query<StoreQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let store_id = query.store_id.as_deref().ok_or_else(|| {
        ApiError::BadRequest("Store ID is required to fetch products".to_string())
    })?;

    let products = products::load_products_by_store(&state.db, store_id).await?;
    Ok(Json(products))
}

/// GET /api/product/barcode/:barcode?store_id=...
///
/// Auto-fill lookup when scanning inside one store's catalog.
pub async fn get_product_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
    Query(query): Query<StoreQuery>,
) -> Result<Json<Product>, ApiError> {
    let store_id = query.store_id.as_deref().ok_or_else(|| {
        ApiError::BadRequest("Store ID is required for barcode lookup".to_string())
    })?;

    products::find_active_product_by_barcode(&state.db, store_id, &barcode)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Product not found with this barcode".to_string()))
}

/// GET /api/product/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    products::load_product(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))
}

/// PUT /api/product/:id
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<Json<Product>, ApiError> {
    let mut product = products::load_product(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::BadRequest(
                "Name, category, and price are required".to_string(),
            ));
        }
        if !name.eq_ignore_ascii_case(&product.name) {
            check_duplicate_name(&state, &product.store_guid, &name).await?;
        }
        product.name = name;
    }
    if let Some(brand) = payload.brand {
        product.brand = Some(brand);
    }
    if let Some(barcode) = payload.barcode {
        let barcode = barcode.trim().to_string();
        if barcode.is_empty() {
            product.barcode = None;
        } else {
            if product.barcode.as_deref() != Some(barcode.as_str()) {
                check_duplicate_barcode(&state, &product.store_guid, &barcode).await?;
            }
            product.barcode = Some(barcode);
        }
    }
    if let Some(category) = payload.category {
        product.category = category;
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
        product.price = price;
    }
    if let Some(quantity) = payload.quantity {
        validate_quantity(quantity)?;
        product.quantity = quantity;
    }
    if let Some(unit) = payload.unit {
        product.unit = unit;
    }
    if let Some(exp_date) = payload.exp_date {
        product.exp_date = Some(exp_date);
    }
    if let Some(image) = payload.image {
        product.image = Some(image);
    }
    if let Some(source) = payload.source {
        product.source = Some(source);
    }
    if let Some(confidence) = payload.confidence {
        product.confidence = Some(confidence);
    }

    products::update_product(&state.db, &product).await?;

    let updated = products::load_product(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::Internal("Product row missing after update".to_string()))?;

    Ok(Json(updated))
}

/// DELETE /api/product/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let product = products::load_product(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    products::deactivate_product(&state.db, &product.guid).await?;

    let deleted = products::load_product(&state.db, &product.guid)
        .await?
        .ok_or_else(|| ApiError::Internal("Product row missing after delete".to_string()))?;

    Ok(Json(deleted))
}
