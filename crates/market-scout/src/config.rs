//! Scout configuration: target page, structural markers, timings, cache policy.
//!
//! Defaults describe the live marketplace. `from_env` overlays `SCOUT_*`
//! environment variables; values that fail to parse keep the default.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://msu.io/marketplace/nft";
pub const DEFAULT_KEYWORD_PARAM: &str = "keyword";
pub const DEFAULT_NAME_MARKER: &str = "BaseCard_itemName__Z2GfD";
pub const DEFAULT_PRICE_MARKER: &str = "CardPrice_number__OYpdb";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// Marketplace page to render.
    pub base_url: String,
    /// Query parameter carrying a search keyword.
    pub keyword_param: String,
    /// Class identifying item-name elements.
    pub name_marker: String,
    /// Class identifying item-price elements.
    pub price_marker: String,
    pub cache_ttl_secs: u64,
    /// How long to wait for `<body>` before reading whatever is there.
    pub body_timeout_secs: u64,
    /// Upper bound on the readiness poll after the body appears.
    pub settle_budget_secs: u64,
    pub settle_poll_ms: u64,
    pub navigation_timeout_secs: u64,
    pub user_agent: String,
    pub chromium_path: Option<PathBuf>,
    /// Where fallback extractions dump raw markup. `None` disables the dump.
    ///
    /// Defaults to [`default_dump_dir`]; `SCOUT_DUMP_DIR=off` opts out.
    pub dump_dir: Option<PathBuf>,
    /// Serve the previous batch instead of overwriting it when a refresh fails.
    pub keep_stale_on_failure: bool,
    /// Collapse concurrent general-listing refreshes into one render cycle.
    pub single_flight: bool,
}

/// `<tmp>/market-scout`, shared by every run on the host.
pub fn default_dump_dir() -> PathBuf {
    std::env::temp_dir().join("market-scout")
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            keyword_param: DEFAULT_KEYWORD_PARAM.to_string(),
            name_marker: DEFAULT_NAME_MARKER.to_string(),
            price_marker: DEFAULT_PRICE_MARKER.to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            body_timeout_secs: 10,
            settle_budget_secs: 5,
            settle_poll_ms: 500,
            navigation_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chromium_path: None,
            dump_dir: Some(default_dump_dir()),
            keep_stale_on_failure: true,
            single_flight: true,
        }
    }
}

impl ScoutConfig {
    /// Defaults overlaid with `SCOUT_*` environment variables.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            base_url: read_env_string("SCOUT_BASE_URL").unwrap_or(d.base_url),
            keyword_param: read_env_string("SCOUT_KEYWORD_PARAM").unwrap_or(d.keyword_param),
            name_marker: read_env_string("SCOUT_NAME_MARKER").unwrap_or(d.name_marker),
            price_marker: read_env_string("SCOUT_PRICE_MARKER").unwrap_or(d.price_marker),
            cache_ttl_secs: read_env_u64("SCOUT_CACHE_TTL_SECS", d.cache_ttl_secs),
            body_timeout_secs: read_env_u64("SCOUT_BODY_TIMEOUT_SECS", d.body_timeout_secs),
            settle_budget_secs: read_env_u64("SCOUT_SETTLE_BUDGET_SECS", d.settle_budget_secs),
            settle_poll_ms: read_env_u64("SCOUT_SETTLE_POLL_MS", d.settle_poll_ms).max(50),
            navigation_timeout_secs: read_env_u64(
                "SCOUT_NAVIGATION_TIMEOUT_SECS",
                d.navigation_timeout_secs,
            )
            .max(1),
            user_agent: read_env_string("SCOUT_USER_AGENT").unwrap_or(d.user_agent),
            chromium_path: read_env_string("SCOUT_CHROMIUM_PATH").map(PathBuf::from),
            dump_dir: read_env_dump_dir("SCOUT_DUMP_DIR", d.dump_dir),
            keep_stale_on_failure: read_env_bool(
                "SCOUT_KEEP_STALE_ON_FAILURE",
                d.keep_stale_on_failure,
            ),
            single_flight: read_env_bool("SCOUT_SINGLE_FLIGHT", d.single_flight),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn body_timeout(&self) -> Duration {
        Duration::from_secs(self.body_timeout_secs)
    }

    pub fn settle_budget(&self) -> Duration {
        Duration::from_secs(self.settle_budget_secs)
    }

    pub fn settle_poll(&self) -> Duration {
        Duration::from_millis(self.settle_poll_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

fn read_env_u64(name: &str, default_value: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default_value)
}

fn read_env_bool(name: &str, default_value: bool) -> bool {
    match read_env_string(name).as_deref().map(str::to_ascii_lowercase) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default_value,
    }
}

/// A path, or `None` for `off`/`none`/`false`/`0`.
fn read_env_dump_dir(name: &str, default_value: Option<PathBuf>) -> Option<PathBuf> {
    match read_env_string(name) {
        None => default_value,
        Some(v) if matches!(v.to_ascii_lowercase().as_str(), "off" | "none" | "false" | "0") => {
            None
        }
        Some(v) => Some(PathBuf::from(v)),
    }
}

/// Trimmed value of an environment variable, `None` when unset or blank.
fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
