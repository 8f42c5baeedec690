//! Renderer abstraction for producing fully rendered page markup.
//!
//! Defines the `Renderer` trait that abstracts over the browser engine
//! (currently Chromium via chromiumoxide) plus two browserless
//! implementations for offline and degraded operation.

pub mod chromium;

use crate::types::{ScoutError, ScoutResult};
use async_trait::async_trait;
use std::path::PathBuf;
use url::Url;

/// Something that turns a URL into rendered document markup.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `url` and return the document HTML.
    async fn render(&self, url: &str) -> ScoutResult<String>;
    /// Number of browser sessions currently open.
    fn active_sessions(&self) -> usize {
        0
    }
}

/// Build the page URL, appending `param=<keyword>` when a keyword is given.
///
/// The keyword is percent-encoded; existing query pairs on `base` are kept.
pub fn build_target_url(base: &str, param: &str, keyword: Option<&str>) -> ScoutResult<String> {
    let mut url =
        Url::parse(base).map_err(|e| ScoutError::Navigation(format!("invalid url {base}: {e}")))?;
    if let Some(kw) = keyword.map(str::trim).filter(|k| !k.is_empty()) {
        url.query_pairs_mut().append_pair(param, kw);
    }
    Ok(url.to_string())
}

/// A renderer used when no browser is available.
///
/// Every render fails with `BrowserUnavailable`, which the cache turns into
/// an empty result.
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn render(&self, _url: &str) -> ScoutResult<String> {
        Err(ScoutError::BrowserUnavailable(
            "no Chromium binary found".to_string(),
        ))
    }
}

/// Serves markup from a saved HTML file, ignoring the URL.
///
/// Handy for replaying a `page_source.html` diagnostics dump.
pub struct FileRenderer {
    path: PathBuf,
}

impl FileRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Renderer for FileRenderer {
    async fn render(&self, url: &str) -> ScoutResult<String> {
        tracing::debug!("serving {} from {}", url, self.path.display());
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}
