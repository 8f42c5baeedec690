//! Marker-based extraction: pair name and price elements by index.

use super::{element_text, Extraction, Extractor, Strategy};
use crate::price::parse_price;
use crate::types::{Listing, ScoutError, ScoutResult};
use scraper::{Html, Selector};

/// The two class identifiers that locate listing fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    name_class: String,
    price_class: String,
}

impl Markers {
    /// Validate both class names as CSS class selectors.
    pub fn new(name_class: &str, price_class: &str) -> ScoutResult<Self> {
        let markers = Self {
            name_class: name_class.trim().to_string(),
            price_class: price_class.trim().to_string(),
        };
        class_selector(&markers.name_class)?;
        class_selector(&markers.price_class)?;
        Ok(markers)
    }

    pub fn name_class(&self) -> &str {
        &self.name_class
    }

    pub fn price_class(&self) -> &str {
        &self.price_class
    }
}

fn class_selector(class: &str) -> ScoutResult<Selector> {
    let invalid = |reason: String| ScoutError::InvalidMarker {
        marker: class.to_string(),
        reason,
    };
    if class.is_empty() || class.contains(char::is_whitespace) {
        return Err(invalid("must be a single class name".to_string()));
    }
    Selector::parse(&format!(".{class}")).map_err(|e| invalid(format!("{e:?}")))
}

/// Pairs the n-th name element with the n-th price element.
///
/// When the counts differ, only `min(names, prices)` pairs are considered.
/// A pair whose price does not parse, or whose name is blank, is dropped.
pub struct MarkerBased {
    markers: Markers,
}

impl MarkerBased {
    pub fn new(markers: Markers) -> Self {
        Self { markers }
    }

    fn texts(&self, document: &Html, class: &str) -> Vec<String> {
        match class_selector(class) {
            Ok(sel) => document.select(&sel).map(|el| element_text(&el)).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Extractor for MarkerBased {
    fn strategy(&self) -> Strategy {
        Strategy::MarkerBased
    }

    fn applies(&self, document: &Html) -> bool {
        let has = |class: &str| {
            class_selector(class)
                .map(|sel| document.select(&sel).next().is_some())
                .unwrap_or(false)
        };
        has(&self.markers.name_class) && has(&self.markers.price_class)
    }

    fn extract(&self, document: &Html) -> Extraction {
        let names = self.texts(document, &self.markers.name_class);
        let prices = self.texts(document, &self.markers.price_class);

        let mut listings = Vec::with_capacity(names.len().min(prices.len()));
        let mut dropped = 0;
        for (name, price_text) in names.iter().zip(prices.iter()) {
            match parse_price(price_text) {
                Ok(price) if !name.is_empty() => listings.push(Listing::new(name.clone(), price)),
                Ok(_) => {
                    dropped += 1;
                    tracing::debug!("dropping listing with blank name (price {price_text:?})");
                }
                Err(e) => {
                    dropped += 1;
                    tracing::debug!("dropping listing {name:?}: {e}");
                }
            }
        }

        if names.len() != prices.len() {
            tracing::debug!(
                "marker counts differ: {} names, {} prices; pairing {}",
                names.len(),
                prices.len(),
                names.len().min(prices.len())
            );
        }

        Extraction {
            strategy: Some(Strategy::MarkerBased),
            listings,
            name_hits: names.len(),
            price_hits: prices.len(),
            dropped,
            candidates: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: &str = "BaseCard_itemName__Z2GfD";
    const PRICE: &str = "CardPrice_number__OYpdb";

    fn run(html: &str) -> Extraction {
        let doc = Html::parse_document(html);
        MarkerBased::new(Markers::new(NAME, PRICE).unwrap()).extract(&doc)
    }

    fn names(n: usize) -> String {
        (0..n)
            .map(|i| format!(r#"<p class="{NAME}">Item {i}</p>"#))
            .collect()
    }

    fn prices(n: usize) -> String {
        (0..n)
            .map(|i| format!(r#"<p class="{PRICE}">{},000</p>"#, i + 1))
            .collect()
    }

    #[test]
    fn test_pairs_min_of_counts() {
        for (n, m) in [(3, 3), (5, 2), (2, 5), (0, 4), (4, 0)] {
            let out = run(&format!("<body>{}{}</body>", names(n), prices(m)));
            assert_eq!(out.listings.len(), n.min(m), "n={n} m={m}");
            assert_eq!(out.name_hits, n);
            assert_eq!(out.price_hits, m);
        }
    }

    #[test]
    fn test_pairs_in_document_order() {
        // Names and prices separated in the tree still pair by index.
        let out = run(&format!(
            "<body><section>{}</section><aside>{}</aside></body>",
            names(3),
            prices(3)
        ));
        assert_eq!(
            out.listings,
            vec![
                Listing::new("Item 0", 1000),
                Listing::new("Item 1", 2000),
                Listing::new("Item 2", 3000),
            ]
        );
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let html = format!(
            r#"<body><p class="{NAME}">Hat</p><p class="{PRICE}">10</p><p class="{NAME}">Hat</p><p class="{PRICE}">10</p></body>"#
        );
        assert_eq!(run(&html).listings.len(), 2);
    }

    #[test]
    fn test_element_with_extra_classes_matches() {
        let html = format!(
            r#"<body><p class="a {NAME} b">Cape</p><span class="x {PRICE}"> 12,000 </span></body>"#
        );
        assert_eq!(run(&html).listings, vec![Listing::new("Cape", 12_000)]);
    }

    #[test]
    fn test_blank_name_dropped() {
        let html = format!(r#"<body><p class="{NAME}">   </p><p class="{PRICE}">10</p></body>"#);
        let out = run(&html);
        assert!(out.listings.is_empty());
        assert_eq!(out.dropped, 1);
    }

    #[test]
    fn test_applies_needs_both_markers() {
        let markers = Markers::new(NAME, PRICE).unwrap();
        let strategy = MarkerBased::new(markers);
        let only_names = Html::parse_document(&format!("<body>{}</body>", names(2)));
        let both = Html::parse_document(&format!("<body>{}{}</body>", names(1), prices(1)));
        assert!(!strategy.applies(&only_names));
        assert!(strategy.applies(&both));
    }

    #[test]
    fn test_invalid_markers_rejected() {
        assert!(matches!(
            Markers::new("", PRICE),
            Err(ScoutError::InvalidMarker { .. })
        ));
        assert!(Markers::new("two words", PRICE).is_err());
        assert!(Markers::new(NAME, "bad[").is_err());
    }
}
