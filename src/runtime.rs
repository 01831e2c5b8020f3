//! Single-threaded fetch queue
//!
//! Overlay fetches run as local futures inside a [`FuturesUnordered`]. Nothing
//! is spawned: the owner decides when completions are delivered, either by
//! awaiting [`FetchQueue::next`] or by draining whatever is already finished
//! with [`FetchQueue::drain_ready`] from its event loop.

use crate::data::fetch::DataFetcher;
use crate::data::geojson::FeatureCollection;
use crate::layers::lifecycle::FetchRequest;
use crate::layers::registry::OverlayKind;
use crate::Result;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
#[cfg(feature = "tokio-runtime")]
use std::time::Duration;

/// Outcome of one overlay fetch, tagged with the token it was issued under
#[derive(Debug)]
pub struct FetchCompletion {
    pub kind: OverlayKind,
    pub token: u64,
    pub result: Result<FeatureCollection>,
}

pub struct FetchQueue {
    fetcher: Arc<dyn DataFetcher>,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, FetchCompletion>>,
    #[cfg(feature = "tokio-runtime")]
    timeout: Option<Duration>,
}

impl FetchQueue {
    pub fn new(fetcher: Arc<dyn DataFetcher>) -> Self {
        Self {
            fetcher,
            in_flight: FuturesUnordered::new(),
            #[cfg(feature = "tokio-runtime")]
            timeout: None,
        }
    }

    /// Fails fetches that take longer than `timeout`
    #[cfg(feature = "tokio-runtime")]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn submit(&mut self, request: FetchRequest) {
        log::debug!(
            "{}: queueing fetch #{} of {}",
            request.kind,
            request.token,
            request.url
        );
        let fetcher = Arc::clone(&self.fetcher);
        #[cfg(feature = "tokio-runtime")]
        let timeout = self.timeout;

        let future = async move {
            let FetchRequest { kind, token, url } = request;
            let fetch = fetcher.fetch(&url);

            #[cfg(feature = "tokio-runtime")]
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, fetch).await {
                    Ok(result) => result,
                    Err(_) => Err(crate::Error::Fetch {
                        overlay: kind.to_string(),
                        message: format!("{} timed out after {:?}", url, limit),
                    }),
                },
                None => fetch.await,
            };
            #[cfg(not(feature = "tokio-runtime"))]
            let result = fetch.await;

            FetchCompletion {
                kind,
                token,
                result,
            }
        };
        self.in_flight.push(future.boxed_local());
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Waits for the next fetch to finish; `None` once the queue is empty
    pub async fn next(&mut self) -> Option<FetchCompletion> {
        self.in_flight.next().await
    }

    /// Collects completions that are ready without waiting
    pub fn drain_ready(&mut self) -> Vec<FetchCompletion> {
        let mut ready = Vec::new();
        while let Some(Some(completion)) = self.in_flight.next().now_or_never() {
            ready.push(completion);
        }
        ready
    }

    /// Drops every in-flight fetch
    pub fn clear(&mut self) {
        self.in_flight = FuturesUnordered::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fetch::MemoryFetcher;
    use async_trait::async_trait;

    fn request(kind: OverlayKind, token: u64, url: &str) -> FetchRequest {
        FetchRequest {
            kind,
            token,
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_completions_carry_request_tokens() {
        let fetcher = MemoryFetcher::new().with_payload("/Road.json", FeatureCollection::default());
        let mut queue = FetchQueue::new(Arc::new(fetcher));

        queue.submit(request(OverlayKind::RoadNetwork, 7, "/Road.json"));
        queue.submit(request(OverlayKind::WaterResources, 2, "/missing.json"));
        assert_eq!(queue.len(), 2);

        let mut completions = Vec::new();
        while let Some(completion) = queue.next().await {
            completions.push(completion);
        }
        completions.sort_by_key(|c| c.token);

        assert_eq!(completions[0].kind, OverlayKind::WaterResources);
        assert!(completions[0].result.is_err());
        assert_eq!(completions[1].token, 7);
        assert!(completions[1].result.is_ok());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_ready_does_not_block() {
        let fetcher = MemoryFetcher::new().with_payload("/water.json", FeatureCollection::default());
        let mut queue = FetchQueue::new(Arc::new(fetcher.clone()));
        queue.submit(request(OverlayKind::WaterResources, 1, "/water.json"));

        let ready = queue.drain_ready();
        assert_eq!(ready.len(), 1);
        assert_eq!(fetcher.call_count(), 1);
        assert!(queue.drain_ready().is_empty());
    }

    struct NeverFetcher;

    #[async_trait]
    impl DataFetcher for NeverFetcher {
        async fn fetch(&self, _url: &str) -> Result<FeatureCollection> {
            futures::future::pending().await
        }
    }

    #[cfg(feature = "tokio-runtime")]
    #[tokio::test]
    async fn test_slow_fetch_times_out() {
        let mut queue =
            FetchQueue::new(Arc::new(NeverFetcher)).with_timeout(Duration::from_millis(20));
        queue.submit(request(OverlayKind::HistoricalPlaces, 1, "/historical.geojson"));

        let completion = queue.next().await.unwrap();
        assert!(matches!(
            completion.result,
            Err(crate::Error::Fetch { ref message, .. }) if message.contains("timed out")
        ));
    }

    #[test]
    fn test_clear_drops_in_flight() {
        let mut queue = FetchQueue::new(Arc::new(NeverFetcher));
        queue.submit(request(OverlayKind::WardBoundary, 1, "/merge_ward.json"));
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.drain_ready().is_empty());
    }
}
