//! One scrape cycle: render the page, extract listings off the event loop.

use crate::config::ScoutConfig;
use crate::diagnostics;
use crate::extract::{self, Extraction, Markers};
use crate::renderer::{build_target_url, Renderer};
use crate::types::{ExtractionBatch, ScoutError, ScoutResult};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Runs Renderer → Extractor cycles against the configured page.
pub struct Scraper {
    renderer: Arc<dyn Renderer>,
    markers: Markers,
    base_url: String,
    keyword_param: String,
    dump_dir: Option<PathBuf>,
}

impl Scraper {
    pub fn new(renderer: Arc<dyn Renderer>, config: &ScoutConfig) -> ScoutResult<Self> {
        // Validate the base URL up front rather than on the first cycle.
        build_target_url(&config.base_url, &config.keyword_param, None)?;
        Ok(Self {
            renderer,
            markers: Markers::new(&config.name_marker, &config.price_marker)?,
            base_url: config.base_url.clone(),
            keyword_param: config.keyword_param.clone(),
            dump_dir: config.dump_dir.clone(),
        })
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Render and extract once. The batch is complete or the call fails.
    pub async fn scrape(&self, keyword: Option<&str>) -> ScoutResult<ExtractionBatch> {
        let start = Instant::now();
        let url = build_target_url(&self.base_url, &self.keyword_param, keyword)?;
        let markup = self.renderer.render(&url).await?;

        let markers = self.markers.clone();
        let dump_dir = self.dump_dir.clone();
        let task_url = url.clone();
        let extraction = tokio::task::spawn_blocking(move || {
            let extraction = extract::extract(&markup, &markers);
            if extraction.is_fallback() {
                diagnostics::report_fallback(
                    &task_url,
                    &markup,
                    extraction.candidates.as_ref(),
                    dump_dir.as_deref(),
                );
            }
            extraction
        })
        .await
        .map_err(|e| ScoutError::Worker(format!("extraction task failed: {e}")))?;

        log_outcome(&url, &extraction, start);
        Ok(ExtractionBatch::new(extraction.into_listings()))
    }
}

fn log_outcome(url: &str, extraction: &Extraction, start: Instant) {
    let elapsed_ms = start.elapsed().as_millis();
    if extraction.is_fallback() {
        tracing::info!("scrape of {url} found no listings ({elapsed_ms}ms)");
        return;
    }
    if extraction.listings.is_empty() {
        tracing::warn!(
            "scrape of {url} produced an empty batch: {} names, {} prices, {} dropped",
            extraction.name_hits,
            extraction.price_hits,
            extraction.dropped
        );
    } else {
        tracing::info!(
            "scraped {} listings from {url} ({} names, {} prices, {} dropped, {elapsed_ms}ms)",
            extraction.listings.len(),
            extraction.name_hits,
            extraction.price_hits,
            extraction.dropped
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::NoopRenderer;
    use crate::types::Listing;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recording {
        markup: String,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Renderer for Recording {
        async fn render(&self, url: &str) -> ScoutResult<String> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(self.markup.clone())
        }
    }

    fn recording(markup: &str) -> Arc<Recording> {
        Arc::new(Recording {
            markup: markup.to_string(),
            urls: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_scrape_builds_keyword_url() {
        let renderer = recording("<html></html>");
        let scraper = Scraper::new(renderer.clone(), &ScoutConfig::default()).unwrap();

        scraper.scrape(None).await.unwrap();
        scraper.scrape(Some("snail shell")).await.unwrap();

        let urls = renderer.urls.lock().unwrap();
        assert_eq!(urls[0], "https://msu.io/marketplace/nft");
        assert_eq!(urls[1], "https://msu.io/marketplace/nft?keyword=snail+shell");
    }

    #[tokio::test]
    async fn test_scrape_extracts_listings() {
        let html = r#"<body>
            <div class="BaseCard_itemName__Z2GfD">Maple Hat</div>
            <div class="CardPrice_number__OYpdb">4,200</div>
        </body>"#;
        let scraper = Scraper::new(recording(html), &ScoutConfig::default()).unwrap();
        let batch = scraper.scrape(None).await.unwrap();
        assert_eq!(batch.records, vec![Listing::new("Maple Hat", 4200)]);
    }

    #[tokio::test]
    async fn test_fallback_dumps_markup() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ScoutConfig {
            dump_dir: Some(dir.path().to_path_buf()),
            ..ScoutConfig::default()
        };
        let scraper = Scraper::new(recording("<body><p>Nothing Here Yet</p></body>"), &cfg).unwrap();

        let batch = scraper.scrape(None).await.unwrap();
        assert!(batch.is_empty());
        let dumped = std::fs::read_to_string(dir.path().join(diagnostics::DUMP_FILE)).unwrap();
        assert!(dumped.contains("Nothing Here Yet"));
    }

    #[tokio::test]
    async fn test_fallback_dumps_by_default() {
        let cfg = ScoutConfig::default();
        let dir = cfg.dump_dir.clone().unwrap();
        let scraper = Scraper::new(recording("<body><p>Still Loading</p></body>"), &cfg).unwrap();

        scraper.scrape(None).await.unwrap();
        assert!(dir.join(diagnostics::DUMP_FILE).exists());
    }

    #[tokio::test]
    async fn test_render_failure_propagates() {
        let scraper = Scraper::new(Arc::new(NoopRenderer), &ScoutConfig::default()).unwrap();
        assert!(matches!(
            scraper.scrape(None).await,
            Err(ScoutError::BrowserUnavailable(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = ScoutConfig {
            base_url: "nope".to_string(),
            ..ScoutConfig::default()
        };
        assert!(Scraper::new(Arc::new(NoopRenderer), &cfg).is_err());
    }
}
