//! HTTP API handlers for dukaan-api

pub mod auth;
pub mod health;
pub mod products;
pub mod resolve;
pub mod stores;
pub mod users;

pub use auth::{auth_middleware, AuthContext};
pub use health::{health_check, root};
pub use resolve::resolve_barcode;
