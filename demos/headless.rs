//! Headless session against the real data endpoints.
//!
//! ```text
//! RUST_LOG=debug cargo run --example headless -- https://example.org [config.json]
//! ```
//!
//! Shows the default overlays plus roads, applies a land-category filter and a
//! cadastral region, swaps to the satellite basemap and prints what ended up
//! on the map.

use anyhow::Context;
use parcelmap::prelude::*;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let base_url = args.next().unwrap_or_else(|| "http://localhost:5173".to_string());
    let mut config = match args.next() {
        Some(path) => SessionConfig::from_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => SessionConfig::default(),
    };
    config.data.base_url = base_url;

    let renderer = Rc::new(RefCell::new(HeadlessRenderer::new()));
    let fetcher: Arc<dyn DataFetcher> = Arc::new(HttpFetcher::new());
    let queue = FetchQueue::new(fetcher.clone()).with_timeout(Duration::from_secs(30));
    let mut manager = OverlayManager::new(renderer.clone(), fetcher, config).with_queue(queue);

    manager.start().context("loading basemap")?;
    manager.set_visible(OverlayKind::RoadNetwork, true)?;
    manager.settle().await;

    manager.set_pending(FilterField::LandCategory, "guthi")?;
    manager.set_pending(FilterField::CadastralMap, "khokana")?;
    manager.apply_filters();

    manager.toggle_basemap().context("switching basemap")?;
    manager.settle().await;

    for kind in OverlayKind::ALL {
        println!(
            "{:<20} {}",
            kind.to_string(),
            manager
                .lifecycle(kind)
                .map(|state| state.to_string())
                .unwrap_or_default()
        );
    }
    {
        let renderer = renderer.borrow();
        println!("style: {}", renderer.style_url().unwrap_or("-"));
        println!("layers: {}", renderer.layer_ids().join(", "));
    }

    manager.teardown();
    Ok(())
}
