//! Configuration resolution for the command-line surface.
//!
//! Precedence: command-line flag > `SCOUT_*` environment (including a
//! `.env` file) > built-in default.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use market_scout::{
    ChromiumRenderer, FileRenderer, ListingCache, NoopRenderer, Renderer, ScoutConfig, Scraper,
};

/// Flag values that override the environment when present.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub dump_dir: Option<PathBuf>,
    /// Disable the markup dump entirely.
    pub no_dump: bool,
    pub chromium: Option<PathBuf>,
}

/// Resolve the effective configuration.
pub fn resolve_config(overrides: &Overrides) -> ScoutConfig {
    apply_overrides(ScoutConfig::from_env(), overrides)
}

fn apply_overrides(mut config: ScoutConfig, overrides: &Overrides) -> ScoutConfig {
    if let Some(url) = &overrides.url {
        config.base_url = url.clone();
    }
    if let Some(ttl) = overrides.ttl_secs {
        config.cache_ttl_secs = ttl;
    }
    if let Some(dir) = &overrides.dump_dir {
        config.dump_dir = Some(dir.clone());
    }
    if overrides.no_dump {
        config.dump_dir = None;
    }
    if let Some(path) = &overrides.chromium {
        config.chromium_path = Some(path.clone());
    }
    config
}

/// Pick a renderer: a saved page when `from_file` is given, otherwise
/// Chromium, otherwise one that always reports the browser missing.
pub fn select_renderer(config: &ScoutConfig, from_file: Option<&Path>) -> Arc<dyn Renderer> {
    if let Some(path) = from_file {
        tracing::info!("Replaying markup from {}", path.display());
        return Arc::new(FileRenderer::new(path));
    }
    match ChromiumRenderer::new(config) {
        Ok(renderer) => {
            tracing::debug!("Using Chromium at {}", renderer.chrome_path().display());
            Arc::new(renderer)
        }
        Err(e) => {
            tracing::warn!("{e}; marketplace data will be unavailable");
            Arc::new(NoopRenderer)
        }
    }
}

/// Build the listing cache the commands run against.
pub fn open_cache(config: &ScoutConfig, from_file: Option<&Path>) -> anyhow::Result<ListingCache> {
    let scraper = Scraper::new(select_renderer(config, from_file), config)?;
    Ok(ListingCache::new(scraper, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let overrides = Overrides {
            url: Some("http://localhost:8080/market".to_string()),
            ttl_secs: Some(30),
            dump_dir: Some(PathBuf::from("/tmp/dumps")),
            no_dump: false,
            chromium: None,
        };
        let config = apply_overrides(ScoutConfig::default(), &overrides);
        assert_eq!(config.base_url, "http://localhost:8080/market");
        assert_eq!(config.cache_ttl_secs, 30);
        assert_eq!(config.dump_dir, Some(PathBuf::from("/tmp/dumps")));
        assert!(config.chromium_path.is_none());
    }

    #[test]
    fn test_no_dump_wins_over_dump_dir() {
        let overrides = Overrides {
            dump_dir: Some(PathBuf::from("/tmp/dumps")),
            no_dump: true,
            ..Overrides::default()
        };
        let config = apply_overrides(ScoutConfig::default(), &overrides);
        assert!(config.dump_dir.is_none());
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let base = ScoutConfig::default();
        let config = apply_overrides(base.clone(), &Overrides::default());
        assert_eq!(config.base_url, base.base_url);
        assert_eq!(config.cache_ttl_secs, base.cache_ttl_secs);
        assert_eq!(config.dump_dir, base.dump_dir);
    }

    #[tokio::test]
    async fn test_open_cache_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(
            &path,
            r#"<span class="BaseCard_itemName__Z2GfD">Hat</span><span class="CardPrice_number__OYpdb">1,200</span>"#,
        )
        .unwrap();

        let cache = open_cache(&ScoutConfig::default(), Some(&path)).unwrap();
        let batch = cache.listings().await;
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records[0].price, 1200);
    }
}
