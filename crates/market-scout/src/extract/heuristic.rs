//! Heuristic scan used when the structural markers are missing.
//!
//! Classifies text-bearing elements into price-like and name-like candidates
//! and collects elements whose class names mention "card" or "price". The
//! result helps find the new marker classes after an upstream rebuild; it is
//! never turned into listings.

use super::{element_text, Extraction, Extractor, Strategy};
use scraper::{Html, Selector};
use serde::Serialize;

const TEXT_ELEMENTS: &str = "div, span, h1, h2, h3, h4, h5, h6, p";
/// Price candidates are shorter than this many characters.
const PRICE_MAX_CHARS: usize = 20;
const HINT_TEXT_CHARS: usize = 50;

/// One element picked up by the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub classes: Vec<String>,
    pub text: String,
}

/// Candidates grouped by what they might be.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CandidateReport {
    pub price_like: Vec<Candidate>,
    pub name_like: Vec<Candidate>,
    /// Elements whose class names contain "card" or "price".
    pub class_hints: Vec<Candidate>,
}

/// Whether trimmed text looks like a price: short and containing a digit.
pub fn is_price_candidate(text: &str) -> bool {
    let text = text.trim();
    text.chars().any(|c| c.is_ascii_digit()) && text.chars().count() < PRICE_MAX_CHARS
}

/// Whether trimmed text looks like an item name: 2 to 5 words, longer than
/// 3 characters, not starting with a digit.
pub fn is_name_candidate(text: &str) -> bool {
    let text = text.trim();
    let words = text.split_whitespace().count();
    (2..=5).contains(&words)
        && text.chars().count() > 3
        && !text.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Loose text classification over common text elements.
pub struct HeuristicScan;

impl Extractor for HeuristicScan {
    fn strategy(&self) -> Strategy {
        Strategy::HeuristicScan
    }

    fn applies(&self, _document: &Html) -> bool {
        true
    }

    fn extract(&self, document: &Html) -> Extraction {
        let mut report = CandidateReport::default();

        if let Ok(sel) = Selector::parse(TEXT_ELEMENTS) {
            for el in document.select(&sel) {
                let text = element_text(&el);
                if text.is_empty() {
                    continue;
                }
                let classes: Vec<String> = el.value().classes().map(str::to_string).collect();
                if is_price_candidate(&text) {
                    report.price_like.push(Candidate {
                        classes: classes.clone(),
                        text: text.clone(),
                    });
                }
                if is_name_candidate(&text) {
                    report.name_like.push(Candidate { classes, text });
                }
            }
        }

        if let Ok(sel) = Selector::parse("[class]") {
            for el in document.select(&sel) {
                let hinted = el.value().classes().any(|c| {
                    let c = c.to_ascii_lowercase();
                    c.contains("card") || c.contains("price")
                });
                if hinted {
                    report.class_hints.push(Candidate {
                        classes: el.value().classes().map(str::to_string).collect(),
                        text: element_text(&el).chars().take(HINT_TEXT_CHARS).collect(),
                    });
                }
            }
        }

        Extraction {
            strategy: Some(Strategy::HeuristicScan),
            candidates: Some(report),
            ..Extraction::default()
        }
    }
}
