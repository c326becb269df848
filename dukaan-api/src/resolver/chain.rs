//! Provider chain: ordered fallback across external data sources
//!
//! Sources are tried strictly in the configured order, one attempt each, and
//! the first hit wins. Sequential execution keeps the priority order
//! deterministic; there are no retries at this layer.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::provider::{
    OpenDatabaseClient, ProductProvider, ProviderEndpoint, RawProviderRecord,
};

/// Ordered list of external product data sources
pub struct ProviderChain {
    providers: Vec<Arc<dyn ProductProvider>>,
}

impl ProviderChain {
    /// Build a chain from an explicit ordered provider list
    pub fn new(providers: Vec<Arc<dyn ProductProvider>>) -> Self {
        Self { providers }
    }

    /// Build a chain of Open*Facts-style clients from endpoint descriptors,
    /// preserving their order
    pub fn from_endpoints(endpoints: Vec<ProviderEndpoint>, timeout: Duration) -> Self {
        let providers = endpoints
            .into_iter()
            .map(|endpoint| {
                Arc::new(OpenDatabaseClient::with_timeout(endpoint, timeout))
                    as Arc<dyn ProductProvider>
            })
            .collect();
        Self::new(providers)
    }

    /// Default chain over the Open*Facts family
    pub fn open_databases() -> Self {
        Self::from_endpoints(
            ProviderEndpoint::open_databases(),
            super::provider::DEFAULT_PROVIDER_TIMEOUT,
        )
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Try each source in order and return the first hit, or `None` when
    /// every source comes up empty
    pub async fn fetch_first(&self, barcode: &str) -> Option<RawProviderRecord> {
        for provider in &self.providers {
            if let Some(record) = provider.fetch(barcode).await {
                debug!(barcode = %barcode, source = provider.id(), "Provider chain hit");
                return Some(record);
            }
        }

        debug!(barcode = %barcode, tried = self.providers.len(), "Provider chain exhausted");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted provider: returns a fixed record (or nothing) and counts calls
    struct FakeProvider {
        id: &'static str,
        record: Option<RawProviderRecord>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn hit(id: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id,
                record: Some(RawProviderRecord {
                    name: Some(format!("Product from {}", id)),
                    source: Some(id.to_string()),
                    ..Default::default()
                }),
                calls: AtomicUsize::new(0),
            })
        }

        fn miss(id: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id,
                record: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProductProvider for FakeProvider {
        fn id(&self) -> &str {
            self.id
        }

        async fn fetch(&self, _barcode: &str) -> Option<RawProviderRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.record.clone()
        }
    }

    #[tokio::test]
    async fn test_first_hit_short_circuits() {
        let a = FakeProvider::hit("a");
        let b = FakeProvider::hit("b");
        let c = FakeProvider::hit("c");
        let chain = ProviderChain::new(vec![a.clone(), b.clone(), c.clone()]);

        let record = chain.fetch_first("123456789012").await.expect("Should hit");
        assert_eq!(record.source.as_deref(), Some("a"));
        assert_eq!(a.call_count(), 1);
        assert_eq!(b.call_count(), 0);
        assert_eq!(c.call_count(), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_last_source() {
        let a = FakeProvider::miss("a");
        let b = FakeProvider::miss("b");
        let c = FakeProvider::hit("c");
        let chain = ProviderChain::new(vec![a.clone(), b.clone(), c.clone()]);

        let record = chain.fetch_first("123456789012").await.expect("Should hit");
        assert_eq!(record.source.as_deref(), Some("c"));
        assert_eq!(a.call_count(), 1);
        assert_eq!(b.call_count(), 1);
        assert_eq!(c.call_count(), 1);
    }

    #[tokio::test]
    async fn test_every_source_missing_returns_none() {
        let a = FakeProvider::miss("a");
        let b = FakeProvider::miss("b");
        let chain = ProviderChain::new(vec![a.clone(), b.clone()]);

        assert!(chain.fetch_first("123456789012").await.is_none());
        assert_eq!(a.call_count(), 1);
        assert_eq!(b.call_count(), 1);
    }

    #[tokio::test]
    async fn test_each_source_gets_exactly_one_attempt() {
        let a = FakeProvider::miss("a");
        let chain = ProviderChain::new(vec![a.clone()]);

        chain.fetch_first("123456789012").await;
        chain.fetch_first("123456789012").await;
        // One attempt per resolution call, no retries within a call
        assert_eq!(a.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_chain_is_a_miss() {
        let chain = ProviderChain::new(vec![]);
        assert!(chain.is_empty());
        assert!(chain.fetch_first("123456789012").await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_source_does_not_abort_the_chain() {
        // A real client pointed at an unroutable address behaves like a miss
        // and the chain falls through to the next source
        let broken = Arc::new(OpenDatabaseClient::with_timeout(
            ProviderEndpoint {
                id: "broken".to_string(),
                label: "Broken".to_string(),
                base_url: "http://192.0.2.1/api/v0/product".to_string(),
            },
            Duration::from_millis(250),
        ));
        let fallback = FakeProvider::hit("fallback");
        let chain = ProviderChain::new(vec![broken, fallback.clone()]);

        let record = chain.fetch_first("123456789012").await.expect("Should hit");
        assert_eq!(record.source.as_deref(), Some("fallback"));
        assert_eq!(fallback.call_count(), 1);
    }
}
