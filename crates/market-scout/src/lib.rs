// Copyright 2026 Market Scout Contributors
// SPDX-License-Identifier: MIT

//! Market Scout: render a marketplace page, extract its listings, then cache and query them.

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod extract;
pub mod pipeline;
pub mod price;
pub mod query;
pub mod renderer;
pub mod types;

pub use cache::{CacheState, CacheStatus, ListingCache};
pub use config::ScoutConfig;
pub use extract::{extract, extract_listings, Extraction, Extractor, Markers, Strategy};
pub use pipeline::Scraper;
pub use price::{format_price, parse_price, PriceParseError};
pub use query::{aggregate, filter, find_exact, sort_by_price, top, PriceStats, Query, SortOrder};
pub use renderer::chromium::ChromiumRenderer;
pub use renderer::{build_target_url, FileRenderer, NoopRenderer, Renderer};
pub use types::*;
