//! Overlay payload fetching
//!
//! Static overlays pull a whole feature collection from one URL. The engine only
//! sees the [`DataFetcher`] trait so that tests and headless hosts can swap the
//! network for an in-memory table.

use crate::data::geojson::FeatureCollection;
use crate::prelude::HashMap;
use crate::{Error, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Shared HTTP client. Building the client once avoids the cost of TLS and
/// connection pool setup for every overlay request.
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("parcelmap/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {}", e);
            Client::new()
        })
});

/// Anything that can resolve an overlay URL to a feature collection.
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FeatureCollection>;
}

/// Fetches overlay payloads over HTTP.
#[derive(Debug, Default, Clone)]
pub struct HttpFetcher;

impl HttpFetcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DataFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FeatureCollection> {
        log::debug!("GET {}", url);
        let response = HTTP_CLIENT.get(url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Http {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        let collection = FeatureCollection::from_slice(&bytes)?;
        log::info!("fetched {} ({} features)", url, collection.len());
        Ok(collection)
    }
}

/// Serves payloads from memory and counts requests.
///
/// URLs without an entry fail with a `Http { status: 404 }` error.
#[derive(Debug, Default, Clone)]
pub struct MemoryFetcher {
    payloads: Arc<Mutex<HashMap<String, FeatureCollection>>>,
    calls: Arc<AtomicUsize>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(self, url: impl Into<String>, payload: FeatureCollection) -> Self {
        self.insert(url, payload);
        self
    }

    pub fn insert(&self, url: impl Into<String>, payload: FeatureCollection) {
        if let Ok(mut payloads) = self.payloads.lock() {
            payloads.insert(url.into(), payload);
        }
    }

    pub fn remove(&self, url: &str) {
        if let Ok(mut payloads) = self.payloads.lock() {
            payloads.remove(url);
        }
    }

    /// Total number of `fetch` calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<FeatureCollection> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let payload = self
            .payloads
            .lock()
            .ok()
            .and_then(|payloads| payloads.get(url).cloned());
        payload.ok_or_else(|| Error::Http {
            url: url.to_string(),
            status: 404,
        })
    }
}
