//! dukaan-api library - retail management backend
//!
//! Multi-tenant retail backend: store owners register, create stores, manage
//! their product catalogs, and resolve scanned barcodes against a shared
//! master catalog backed by the open product databases.

use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod resolver;

use identity::IdentityVerifier;
use resolver::BarcodeResolver;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Bearer-token verification delegate
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Barcode resolution pipeline
    pub resolver: Arc<BarcodeResolver>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        db: SqlitePool,
        verifier: Arc<dyn IdentityVerifier>,
        resolver: Arc<BarcodeResolver>,
    ) -> Self {
        Self {
            db,
            verifier,
            resolver,
        }
    }
}

/// Build application router
///
/// Protected routes sit behind the authentication middleware; the service
/// root, health check and the global barcode resolver are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require a verified bearer token)
    let protected = Router::new()
        .route("/api/auth/register", post(api::auth::register))
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/auth/profile", get(api::auth::profile))
        .route("/api/user/:id", get(api::users::get_user))
        .route("/api/store/create", post(api::stores::create_store))
        .route("/api/store/all", get(api::stores::list_my_stores))
        .route(
            "/api/store/:store_id",
            get(api::stores::get_store)
                .put(api::stores::update_store)
                .delete(api::stores::delete_store),
        )
        .route("/api/product/all", get(api::products::get_all_products))
        .route(
            "/api/product/barcode/:barcode",
            get(api::products::get_product_by_barcode),
        )
        .route("/api/product/add_product", post(api::products::add_product))
        .route(
            "/api/product/:id",
            get(api::products::get_product)
                .put(api::products::update_product)
                .delete(api::products::delete_product),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/", get(api::health::root))
        .route("/health", get(api::health::health_check))
        .route(
            "/api/products/resolve/:barcode",
            get(api::resolve::resolve_barcode),
        );

    // Combine routers
    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
