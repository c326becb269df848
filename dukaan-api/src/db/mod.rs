//! Database access layer: one module per entity

pub mod master_products;
pub mod products;
pub mod stores;
pub mod users;
