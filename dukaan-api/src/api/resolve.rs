//! Barcode resolution endpoint

use axum::{
    extract::{Path, State},
    Json,
};

use crate::db::master_products::MasterProduct;
use crate::error::ApiError;
use crate::resolver::ResolveError;
use crate::AppState;

/// GET /api/products/resolve/:barcode
///
/// Resolve a scanned barcode to canonical product metadata. Public route;
/// the master catalog is global, not store-scoped.
pub async fn resolve_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> Result<Json<MasterProduct>, ApiError> {
    match state.resolver.resolve(&barcode).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(ApiError::NotFound(
            "Product not found in any external source".to_string(),
        )),
        Err(ResolveError::InvalidBarcode) => Err(ApiError::BadRequest(
            "Invalid barcode format. Must be 12 or 13 digits.".to_string(),
        )),
        Err(ResolveError::Cache(err)) => Err(ApiError::Internal(err.to_string())),
    }
}
