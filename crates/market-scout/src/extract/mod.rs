//! Listing extraction from rendered markup.
//!
//! Two strategies share the [`Extractor`] trait:
//!
//! - [`MarkerBased`] pairs item-name and item-price elements by position.
//! - [`HeuristicScan`] classifies loose text into name/price candidates for
//!   diagnostics. It never yields usable listings.
//!
//! [`extract`] runs the first strategy that applies. Parsing uses the
//! `scraper` crate; `Html` is not `Send`, so callers in async code should
//! run extraction on a blocking thread.

pub mod heuristic;
pub mod markers;

pub use heuristic::{Candidate, CandidateReport, HeuristicScan};
pub use markers::{MarkerBased, Markers};

use crate::types::Listing;
use scraper::Html;
use serde::Serialize;

/// Which strategy produced an [`Extraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    MarkerBased,
    HeuristicScan,
}

/// Everything one extraction pass found.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub strategy: Option<Strategy>,
    /// Paired listings, in document order.
    pub listings: Vec<Listing>,
    /// Elements matching the name marker.
    pub name_hits: usize,
    /// Elements matching the price marker.
    pub price_hits: usize,
    /// Pairs discarded for an unparsable price or empty name.
    pub dropped: usize,
    /// Filled by the heuristic scan.
    pub candidates: Option<CandidateReport>,
}

impl Extraction {
    /// Whether the markers were missing and the heuristic scan ran instead.
    pub fn is_fallback(&self) -> bool {
        self.strategy == Some(Strategy::HeuristicScan)
    }

    /// Listings callers may act on. Always empty for the heuristic scan.
    pub fn into_listings(self) -> Vec<Listing> {
        match self.strategy {
            Some(Strategy::MarkerBased) => self.listings,
            _ => Vec::new(),
        }
    }
}

/// An extraction strategy over a parsed document.
pub trait Extractor: Send + Sync {
    fn strategy(&self) -> Strategy;
    /// Whether this strategy has anything to work with in `document`.
    fn applies(&self, document: &Html) -> bool;
    fn extract(&self, document: &Html) -> Extraction;
}

/// Parse `markup` and run the first applicable strategy.
///
/// Never fails: malformed markup parses to whatever tree `html5ever`
/// recovers, and no matches yields an empty extraction.
pub fn extract(markup: &str, markers: &Markers) -> Extraction {
    let document = Html::parse_document(markup);
    let primary = MarkerBased::new(markers.clone());
    let strategies: [&dyn Extractor; 2] = [&primary, &HeuristicScan];

    for strategy in strategies {
        if strategy.applies(&document) {
            return strategy.extract(&document);
        }
    }
    Extraction::default()
}

/// Parse `markup` and return only usable listings.
pub fn extract_listings(markup: &str, markers: &Markers) -> Vec<Listing> {
    extract(markup, markers).into_listings()
}

/// Element text with whitespace runs collapsed and ends trimmed.
pub(crate) fn element_text(el: &scraper::ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
