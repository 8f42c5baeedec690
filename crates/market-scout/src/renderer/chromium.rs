//! Chromium-based renderer using chromiumoxide.
//!
//! Every `render` call launches its own headless browser with a private
//! profile directory, so concurrent cycles never share a session. The
//! browser is closed and reaped on every path, including failures.

use super::Renderer;
use crate::config::ScoutConfig;
use crate::types::{ScoutError, ScoutResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

static SESSION_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Find the Chromium binary path.
pub fn find_chromium(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    // 1. Configured path
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.clone());
        }
    }

    // 2. SCOUT_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("SCOUT_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS locations
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Timing knobs for one render.
#[derive(Debug, Clone)]
struct RenderTimings {
    navigation_timeout: Duration,
    body_timeout: Duration,
    settle_budget: Duration,
    settle_poll: Duration,
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    chrome_path: PathBuf,
    user_agent: String,
    name_marker: String,
    timings: RenderTimings,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Create a renderer. Fails when no Chromium binary can be located.
    pub fn new(config: &ScoutConfig) -> ScoutResult<Self> {
        let chrome_path = find_chromium(config.chromium_path.as_ref()).ok_or_else(|| {
            ScoutError::BrowserUnavailable(
                "Chromium not found. Set SCOUT_CHROMIUM_PATH or install google-chrome."
                    .to_string(),
            )
        })?;

        Ok(Self {
            chrome_path,
            user_agent: config.user_agent.clone(),
            name_marker: config.name_marker.clone(),
            timings: RenderTimings {
                navigation_timeout: config.navigation_timeout(),
                body_timeout: config.body_timeout(),
                settle_budget: config.settle_budget(),
                settle_poll: config.settle_poll(),
            },
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn chrome_path(&self) -> &PathBuf {
        &self.chrome_path
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn render(&self, url: &str) -> ScoutResult<String> {
        let start = Instant::now();
        let session = BrowserSession::launch(
            &self.chrome_path,
            &self.user_agent,
            Arc::clone(&self.active_count),
        )
        .await?;

        let result = match session.browser() {
            Ok(browser) => capture(browser, url, &self.name_marker, &self.timings).await,
            Err(e) => Err(e),
        };
        session.close().await;

        match &result {
            Ok(html) => tracing::info!(
                "rendered {url}: {} bytes in {}ms",
                html.len(),
                start.elapsed().as_millis()
            ),
            Err(e) => tracing::warn!("render of {url} failed: {e}"),
        }
        result
    }

    fn active_sessions(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// One launched browser process and its event-handler task.
///
/// `close` shuts the browser down and reaps it. `Drop` releases the rest on
/// every path, including a render future dropped mid-capture: the process is
/// killed, the profile directory removed and the session count decremented.
struct BrowserSession {
    browser: Option<Browser>,
    handler: JoinHandle<()>,
    profile_dir: PathBuf,
    active_count: Arc<AtomicUsize>,
}

impl BrowserSession {
    async fn launch(
        chrome_path: &PathBuf,
        user_agent: &str,
        active_count: Arc<AtomicUsize>,
    ) -> ScoutResult<Self> {
        let profile_dir = std::env::temp_dir().join(format!(
            "market-scout-{}-{}",
            std::process::id(),
            SESSION_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .user_data_dir(&profile_dir)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg(format!("--user-agent={user_agent}"))
            .build()
            .map_err(|e| ScoutError::BrowserUnavailable(format!("browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScoutError::BrowserUnavailable(format!("failed to launch Chromium: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        active_count.fetch_add(1, Ordering::Relaxed);
        Ok(Self {
            browser: Some(browser),
            handler,
            profile_dir,
            active_count,
        })
    }

    fn browser(&self) -> ScoutResult<&Browser> {
        self.browser.as_ref().ok_or_else(|| {
            ScoutError::BrowserUnavailable("browser session already closed".to_string())
        })
    }

    /// Close the browser and reap its process.
    async fn close(mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                tracing::debug!("browser close: {e}");
            }
            if let Err(e) = browser.wait().await {
                tracing::warn!("failed to reap browser process: {e}");
            }
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Some(browser) = self.browser.take() {
            tracing::warn!("browser session dropped before close, killing it");
            // The child is spawned with kill-on-drop.
            drop(browser);
        }
        self.handler.abort();
        if let Err(e) = std::fs::remove_dir_all(&self.profile_dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!("failed to remove {}: {e}", self.profile_dir.display());
            }
        }
        self.active_count.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Navigate, wait for the page to become readable and return its markup.
async fn capture(
    browser: &Browser,
    url: &str,
    name_marker: &str,
    timings: &RenderTimings,
) -> ScoutResult<String> {
    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| ScoutError::Navigation(format!("failed to create page: {e}")))?;

    match tokio::time::timeout(timings.navigation_timeout, page.goto(url)).await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => return Err(ScoutError::Navigation(format!("navigation failed: {e}"))),
        Err(_) => return Err(ScoutError::RenderTimeout(timings.navigation_timeout)),
    }

    if !wait_for_body(&page, timings.body_timeout).await {
        tracing::warn!(
            "no <body> after {:?} on {url}, reading markup anyway",
            timings.body_timeout
        );
    }

    let settled = wait_for_settle(&page, name_marker, timings.settle_budget, timings.settle_poll).await;
    tracing::debug!("readiness on {url}: {settled:?}");

    let html = page
        .content()
        .await
        .map_err(|e| ScoutError::Navigation(format!("failed to read markup: {e}")))?;

    let _ = page.close().await;
    Ok(html)
}

/// Poll for `<body>` until `timeout`. Returns whether it appeared.
async fn wait_for_body(page: &Page, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if page.find_element("body").await.is_ok() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}

/// How the readiness poll ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// The marker count held steady across two polls.
    Stable(u64),
    /// The budget ran out first; holds the last count seen.
    BudgetSpent(u64),
}

/// Poll the number of name-marker elements until it stops changing.
async fn wait_for_settle(page: &Page, marker: &str, budget: Duration, poll: Duration) -> Settle {
    let script = format!(
        "document.getElementsByClassName({}).length",
        serde_json::Value::String(marker.to_string())
    );
    let deadline = tokio::time::Instant::now() + budget;
    let mut previous: Option<u64> = None;

    loop {
        let count = match page.evaluate(script.as_str()).await {
            Ok(v) => v.into_value::<u64>().unwrap_or(0),
            Err(_) => 0,
        };
        if let Some(prev) = previous {
            if settled(prev, count) {
                return Settle::Stable(count);
            }
        }
        previous = Some(count);

        if tokio::time::Instant::now() + poll > deadline {
            return Settle::BudgetSpent(count);
        }
        tokio::time::sleep(poll).await;
    }
}

/// Two consecutive equal, non-zero counts mean the list has rendered.
fn settled(previous: u64, current: u64) -> bool {
    current > 0 && previous == current
}
