//! Barcode resolution pipeline
//!
//! Resolves a scanned barcode to canonical product metadata:
//!
//! 1. Validate barcode format (12 or 13 ASCII digits)
//! 2. Check the local master product cache
//! 3. On miss, try external sources in priority order
//! 4. Normalize the first hit
//! 5. Persist the normalized record
//! 6. Return the stored record, or `None` if not found anywhere
//!
//! Cache entries never expire and are never rewritten; repeat lookups for a
//! resolved barcode are served entirely from the cache.

pub mod cache;
pub mod chain;
pub mod normalizer;
pub mod provider;

pub use cache::{CacheError, ProductCache, SqliteProductCache};
pub use chain::ProviderChain;
pub use normalizer::{normalize, NormalizedProduct};
pub use provider::{
    OpenDatabaseClient, ProductProvider, ProviderEndpoint, RawProviderRecord,
    DEFAULT_PROVIDER_TIMEOUT,
};

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::db::master_products::MasterProduct;

/// Resolution failures surfaced to the caller.
///
/// Provider failures are not represented here: an unreachable or erroring
/// provider is equivalent to "no data from that provider" and the chain
/// simply moves on.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid barcode format. Must be 12 or 13 digits.")]
    InvalidBarcode,

    #[error("Cache store error: {0}")]
    Cache(#[from] CacheError),
}

/// True when the barcode is exactly 12 or 13 ASCII digits
pub fn is_valid_barcode(barcode: &str) -> bool {
    (barcode.len() == 12 || barcode.len() == 13) && barcode.bytes().all(|b| b.is_ascii_digit())
}

/// Orchestrates a single barcode resolution against the cache store and the
/// external provider chain
pub struct BarcodeResolver {
    cache: Arc<dyn ProductCache>,
    chain: ProviderChain,
}

impl BarcodeResolver {
    pub fn new(cache: Arc<dyn ProductCache>, chain: ProviderChain) -> Self {
        Self { cache, chain }
    }

    /// Resolve a product by barcode.
    ///
    /// Returns the canonical record (cached or freshly resolved), `Ok(None)`
    /// when no source knows the barcode, or an error for malformed input and
    /// persistence failures.
    pub async fn resolve(&self, barcode: &str) -> Result<Option<MasterProduct>, ResolveError> {
        // 1. Validate before any I/O
        if !is_valid_barcode(barcode) {
            return Err(ResolveError::InvalidBarcode);
        }

        // 2. Cache first
        if let Some(cached) = self.cache.find_by_barcode(barcode).await? {
            info!(
                barcode = %barcode,
                source = cached.source.as_deref().unwrap_or("unknown"),
                "Cache hit"
            );
            return Ok(Some(cached));
        }

        info!(barcode = %barcode, "Cache miss, querying external sources");

        // 3. External sources in priority order
        let Some(raw) = self.chain.fetch_first(barcode).await else {
            info!(barcode = %barcode, "Barcode not found in any external source");
            return Ok(None);
        };

        // 4. Normalize, 5. persist (normalized form only, never the raw response)
        let normalized = normalizer::normalize(&raw);
        let record = MasterProduct::from_normalized(barcode, normalized);

        match self.cache.insert(&record).await {
            Ok(stored) => {
                info!(
                    barcode = %barcode,
                    source = stored.source.as_deref().unwrap_or("unknown"),
                    confidence = stored.confidence,
                    "Saved resolved product"
                );
                Ok(Some(stored))
            }
            Err(CacheError::Duplicate(_)) => {
                // A concurrent resolution for the same barcode won the
                // insert; serve the winner's record instead of erroring
                info!(barcode = %barcode, "Lost insert race, returning existing record");
                match self.cache.find_by_barcode(barcode).await? {
                    Some(winner) => Ok(Some(winner)),
                    None => Err(ResolveError::Cache(CacheError::Duplicate(
                        barcode.to_string(),
                    ))),
                }
            }
            Err(err) => Err(err.into()),
        }
    }
}
