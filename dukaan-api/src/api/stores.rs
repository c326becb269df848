//! Store endpoints
//!
//! All routes are authenticated and owner-scoped where they list. Stores are
//! soft-deleted so a delete returns the deactivated row.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use super::auth::{require_user, AuthContext};
use crate::db::stores::{self, Store};
use crate::error::ApiError;
use crate::AppState;

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;
const BUSINESS_TYPES: &[&str] = &["retail", "wholesale", "both", "service", "other"];
const CURRENCIES: &[&str] = &["INR", "USD", "EUR", "GBP"];

#[derive(Debug, Default, Deserialize)]
pub struct AddressPayload {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
    pub full_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SettingsPayload {
    pub low_stock_threshold: Option<i64>,
    pub expiry_alert_days: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStorePayload {
    pub name: Option<String>,
    #[serde(default)]
    pub address: AddressPayload,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub business_type: Option<String>,
    #[serde(default)]
    pub settings: SettingsPayload,
    pub description: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStorePayload {
    pub name: Option<String>,
    #[serde(default)]
    pub address: AddressPayload,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub business_type: Option<String>,
    #[serde(default)]
    pub settings: SettingsPayload,
    pub description: Option<String>,
    pub logo: Option<String>,
}

fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.bytes().all(|b| b.is_ascii_digit())
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Store name and owner ID are required".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "Store name cannot exceed {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_business_type(business_type: &str) -> Result<(), ApiError> {
    if BUSINESS_TYPES.contains(&business_type) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid business type: {}",
            business_type
        )))
    }
}

fn validate_currency(currency: &str) -> Result<(), ApiError> {
    if CURRENCIES.contains(&currency) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("Invalid currency: {}", currency)))
    }
}

fn validate_threshold(value: i64, label: &str) -> Result<(), ApiError> {
    if value < 0 {
        Err(ApiError::BadRequest(format!("{} cannot be negative", label)))
    } else {
        Ok(())
    }
}

fn validate_description(description: &str) -> Result<(), ApiError> {
    if description.len() > MAX_DESCRIPTION_LEN {
        Err(ApiError::BadRequest(format!(
            "Description cannot exceed {} characters",
            MAX_DESCRIPTION_LEN
        )))
    } else {
        Ok(())
    }
}

/// POST /api/store/create
pub async fn create_store(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<CreateStorePayload>,
) -> Result<(StatusCode, Json<Store>), ApiError> {
    let user = require_user(&ctx)?;

    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest("Store name and owner ID are required".to_string())
        })?;
    validate_name(name)?;

    let full_address = payload
        .address
        .full_address
        .as_deref()
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Full address is required".to_string()))?;

    let phone = payload
        .phone
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Phone number is required".to_string()))?;
    if !is_valid_phone(phone) {
        return Err(ApiError::BadRequest(
            "Please provide a valid 10-digit phone number".to_string(),
        ));
    }

    if stores::find_active_store_by_name(&state.db, &user.guid, name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "A store with this name already exists for this owner".to_string(),
        ));
    }

    let mut store = Store::new(
        user.guid.clone(),
        name.to_string(),
        full_address.to_string(),
        phone.to_string(),
    );
    store.street = payload.address.street;
    store.city = payload.address.city;
    store.state = payload.address.state;
    store.pincode = payload.address.pincode;
    if let Some(country) = payload.address.country {
        store.country = country;
    }
    store.email = payload.email;
    if let Some(business_type) = payload.business_type {
        validate_business_type(&business_type)?;
        store.business_type = business_type;
    }
    if let Some(threshold) = payload.settings.low_stock_threshold {
        validate_threshold(threshold, "Low stock threshold")?;
        store.low_stock_threshold = threshold;
    }
    if let Some(days) = payload.settings.expiry_alert_days {
        validate_threshold(days, "Expiry alert days")?;
        store.expiry_alert_days = days;
    }
    if let Some(currency) = payload.settings.currency {
        validate_currency(&currency)?;
        store.currency = currency;
    }
    if let Some(ref description) = payload.description {
        validate_description(description)?;
    }
    store.description = payload.description;
    store.logo = payload.logo;

    stores::insert_store(&state.db, &store).await?;

    let stored = stores::load_store(&state.db, &store.guid)
        .await?
        .ok_or_else(|| ApiError::Internal("Store row missing after insert".to_string()))?;

    Ok((StatusCode::CREATED, Json(stored)))
}

/// GET /api/store/all
pub async fn list_my_stores(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<Store>>, ApiError> {
    let user = require_user(&ctx)?;
    let stores = stores::load_stores_by_owner(&state.db, &user.guid).await?;
    Ok(Json(stores))
}

/// GET /api/store/:store_id
pub async fn get_store(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<Json<Store>, ApiError> {
    stores::load_store(&state.db, &store_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Store not found".to_string()))
}

/// PUT /api/store/:store_id
pub async fn update_store(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    Json(payload): Json<UpdateStorePayload>,
) -> Result<Json<Store>, ApiError> {
    let mut store = stores::load_store(&state.db, &store_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Store not found".to_string()))?;

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        validate_name(&name)?;
        store.name = name;
    }
    if let Some(street) = payload.address.street {
        store.street = Some(street);
    }
    if let Some(city) = payload.address.city {
        store.city = Some(city);
    }
    if let Some(state_name) = payload.address.state {
        store.state = Some(state_name);
    }
    if let Some(pincode) = payload.address.pincode {
        store.pincode = Some(pincode);
    }
    if let Some(country) = payload.address.country {
        store.country = country;
    }
    if let Some(full_address) = payload.address.full_address {
        let full_address = full_address.trim().to_string();
        if full_address.is_empty() {
            return Err(ApiError::BadRequest("Full address is required".to_string()));
        }
        store.full_address = full_address;
    }
    if let Some(phone) = payload.phone {
        if !is_valid_phone(&phone) {
            return Err(ApiError::BadRequest(
                "Please provide a valid 10-digit phone number".to_string(),
            ));
        }
        store.phone = phone;
    }
    if let Some(email) = payload.email {
        store.email = Some(email);
    }
    if let Some(business_type) = payload.business_type {
        validate_business_type(&business_type)?;
        store.business_type = business_type;
    }
    if let Some(threshold) = payload.settings.low_stock_threshold {
        validate_threshold(threshold, "Low stock threshold")?;
        store.low_stock_threshold = threshold;
    }
    if let Some(days) = payload.settings.expiry_alert_days {
        validate_threshold(days, "Expiry alert days")?;
        store.expiry_alert_days = days;
    }
    if let Some(currency) = payload.settings.currency {
        validate_currency(&currency)?;
        store.currency = currency;
    }
    if let Some(description) = payload.description {
        validate_description(&description)?;
        store.description = Some(description);
    }
    if let Some(logo) = payload.logo {
        store.logo = Some(logo);
    }

    stores::update_store(&state.db, &store).await?;

    let updated = stores::load_store(&state.db, &store_id)
        .await?
        .ok_or_else(|| ApiError::Internal("Store row missing after update".to_string()))?;

    Ok(Json(updated))
}

/// DELETE /api/store/:store_id
pub async fn delete_store(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<Json<Store>, ApiError> {
    let store = stores::load_store(&state.db, &store_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Store not found".to_string()))?;

    stores::deactivate_store(&state.db, &store.guid).await?;

    let deleted = stores::load_store(&state.db, &store.guid)
        .await?
        .ok_or_else(|| ApiError::Internal("Store row missing after delete".to_string()))?;

    Ok(Json(deleted))
}
