//! External product database clients
//!
//! Each provider is queried over HTTP by barcode. The Open*Facts family
//! (food, beauty, pet food) shares one response envelope: a `status` flag
//! (1 = found) and a nested `product` payload. A provider that times out,
//! returns an HTTP error, or sends an unparseable body is reported as "no
//! data" so the chain can continue; the distinction is kept for logging only.

use async_trait::async_trait;
use reqwest::{header, redirect, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default ceiling for a single provider request
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_millis(5000);

/// Identifying User-Agent (the open databases ask clients to identify themselves)
const USER_AGENT: &str = "Dukaan/0.1.0 (contact@dukaan.example)";

/// Redirect ceiling per request
const MAX_REDIRECTS: usize = 5;

/// One external data source: identifier, display label, API base URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderEndpoint {
    pub id: String,
    pub label: String,
    pub base_url: String,
}

impl ProviderEndpoint {
    /// The Open*Facts family, in chain priority order:
    /// OpenFoodFacts -> OpenBeautyFacts -> OpenPetFoodFacts
    pub fn open_databases() -> Vec<ProviderEndpoint> {
        vec![
            ProviderEndpoint {
                id: "openfoodfacts".to_string(),
                label: "OpenFoodFacts".to_string(),
                base_url: "https://world.openfoodfacts.org/api/v0/product".to_string(),
            },
            ProviderEndpoint {
                id: "openbeautyfacts".to_string(),
                label: "OpenBeautyFacts".to_string(),
                base_url: "https://world.openbeautyfacts.org/api/v0/product".to_string(),
            },
            ProviderEndpoint {
                id: "openpetfoodfacts".to_string(),
                label: "OpenPetFoodFacts".to_string(),
                base_url: "https://world.openpetfoodfacts.org/api/v0/product".to_string(),
            },
        ]
    }
}

/// Raw product record as reshaped from one provider's payload.
/// Ephemeral: consumed by the normalizer, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProviderRecord {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub source: Option<String>,
}

/// A single external data source queried by barcode.
///
/// `fetch` never fails: any transport or provider problem collapses to
/// `None` so one unreachable source cannot abort the chain.
#[async_trait]
pub trait ProductProvider: Send + Sync {
    /// Provider identifier recorded as the `source` of resolved products
    fn id(&self) -> &str;

    /// Fetch the raw record for a barcode, or `None` if this provider has
    /// no data (including timeout and error cases)
    async fn fetch(&self, barcode: &str) -> Option<RawProviderRecord>;
}

/// Failure classes, distinguished for observability only
#[derive(Debug, Error)]
enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Client for one Open*Facts-style database
pub struct OpenDatabaseClient {
    endpoint: ProviderEndpoint,
    http_client: Client,
    timeout: Duration,
}

impl OpenDatabaseClient {
    /// Create a client with the default 5000 ms request ceiling
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self::with_timeout(endpoint, DEFAULT_PROVIDER_TIMEOUT)
    }

    /// Create a client with an explicit request ceiling
    pub fn with_timeout(endpoint: ProviderEndpoint, timeout: Duration) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .default_headers(headers)
                .redirect(redirect::Policy::limited(MAX_REDIRECTS))
                .build()
                .expect("Failed to create HTTP client"),
            endpoint,
            timeout,
        }
    }

    /// Query the provider; Ok(None) means "no record for this barcode"
    async fn query(&self, barcode: &str) -> Result<Option<RawProviderRecord>, ProviderError> {
        let url = format!("{}/{}.json", self.endpoint.base_url, barcode);

        let request = async {
            let response = self.http_client.get(&url).send().await.map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ProviderError::Status(status.as_u16()));
            }

            response
                .json::<OpenDatabaseEnvelope>()
                .await
                .map_err(|e| ProviderError::Parse(e.to_string()))
        };

        // Explicit ceiling around the whole request+parse, independent of
        // the transport-level timeout configuration
        let envelope = match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result?,
            Err(_) => return Err(ProviderError::Timeout),
        };

        if envelope.status != 1 {
            return Ok(None);
        }
        let Some(payload) = envelope.product else {
            return Ok(None);
        };

        Ok(Some(RawProviderRecord {
            name: payload.product_name,
            brand: payload.brands,
            quantity: payload.quantity,
            category: payload.categories,
            image: payload.image_url,
            source: Some(self.endpoint.id.clone()),
        }))
    }
}

#[async_trait]
impl ProductProvider for OpenDatabaseClient {
    fn id(&self) -> &str {
        &self.endpoint.id
    }

    async fn fetch(&self, barcode: &str) -> Option<RawProviderRecord> {
        debug!(provider = %self.endpoint.label, barcode = %barcode, "Querying provider");

        match self.query(barcode).await {
            Ok(Some(record)) => {
                debug!(
                    provider = %self.endpoint.label,
                    barcode = %barcode,
                    name = ?record.name,
                    "Provider hit"
                );
                Some(record)
            }
            Ok(None) => {
                debug!(provider = %self.endpoint.label, barcode = %barcode, "Provider has no record");
                None
            }
            Err(ProviderError::Timeout) => {
                warn!(
                    provider = %self.endpoint.label,
                    barcode = %barcode,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Provider timed out"
                );
                None
            }
            Err(ProviderError::Status(code)) => {
                warn!(
                    provider = %self.endpoint.label,
                    barcode = %barcode,
                    status = code,
                    "Provider returned HTTP error"
                );
                None
            }
            Err(err) => {
                warn!(
                    provider = %self.endpoint.label,
                    barcode = %barcode,
                    error = %err,
                    "Provider request failed"
                );
                None
            }
        }
    }
}

// ============================================================================
// Open*Facts API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenDatabaseEnvelope {
    #[serde(default)]
    status: i64,
    product: Option<OpenDatabaseProduct>,
}

#[derive(Debug, Deserialize)]
struct OpenDatabaseProduct {
    product_name: Option<String>,
    brands: Option<String>,
    quantity: Option<String>,
    categories: Option<String>,
    image_url: Option<String>,
}
