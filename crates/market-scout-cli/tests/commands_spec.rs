//! Command replies against canned marketplace pages.

use async_trait::async_trait;
use market_scout::{ListingCache, Renderer, ScoutConfig, ScoutError, ScoutResult, Scraper};
use market_scout_cli::commands::{CommandError, CommandRegistry};
use market_scout_cli::format::UNAVAILABLE;
use market_scout_cli::Reply;
use std::sync::{Arc, Mutex};

// ── helpers ──

fn page(items: &[(&str, &str)]) -> String {
    let cards: String = items
        .iter()
        .map(|(name, price)| {
            format!(
                r#"<div class="BaseCard_card"><span class="BaseCard_itemName__Z2GfD">{name}</span><span class="CardPrice_number__OYpdb">{price}</span></div>"#
            )
        })
        .collect();
    format!("<html><body>{cards}</body></html>")
}

/// Serves one page for the general listing and another for keyword searches.
struct FakeMarket {
    listing: Option<String>,
    search: Option<String>,
    urls: Mutex<Vec<String>>,
}

#[async_trait]
impl Renderer for FakeMarket {
    async fn render(&self, url: &str) -> ScoutResult<String> {
        self.urls.lock().unwrap().push(url.to_string());
        let page = if url.contains("keyword=") {
            &self.search
        } else {
            &self.listing
        };
        page.clone()
            .ok_or_else(|| ScoutError::Navigation("connection refused".to_string()))
    }
}

fn market(listing: Option<String>, search: Option<String>) -> (ListingCache, Arc<FakeMarket>) {
    let renderer = Arc::new(FakeMarket {
        listing,
        search,
        urls: Mutex::new(Vec::new()),
    });
    let config = ScoutConfig::default();
    let scraper = Scraper::new(renderer.clone(), &config).unwrap();
    (ListingCache::new(scraper, &config), renderer)
}

fn default_market() -> ListingCache {
    market(
        Some(page(&[
            ("Maple Hat", "1,000"),
            ("Zakum Helmet", "250,000"),
            ("Red Dragon Cape", "45,500"),
            ("Blue Dragon Cape", "12,000"),
            ("Work Gloves", "300"),
        ])),
        Some(page(&[
            ("Red Dragon Cape", "45,500"),
            ("Blue Dragon Cape", "12,000"),
            ("Dragon Slayer Mug", "9"),
            ("Cape Hook", "50"),
        ])),
    )
    .0
}

fn many(n: usize) -> String {
    let items: Vec<(String, String)> = (1..=n)
        .map(|i| (format!("Item {i:02}"), format!("{}", i * 100)))
        .collect();
    let refs: Vec<(&str, &str)> = items.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    page(&refs)
}

async fn call(cache: &ListingCache, name: &str, arg: Option<&str>) -> Reply {
    CommandRegistry::call(name, arg, cache).await.unwrap()
}

fn item_names(reply: &Reply) -> Vec<&str> {
    reply.items.iter().map(|l| l.name.as_str()).collect()
}

// ── registry ──

#[test]
fn registry_lists_five_commands() {
    let names: Vec<&str> = CommandRegistry::list().iter().map(|d| d.name).collect();
    assert_eq!(names, ["top", "search", "price", "stats", "sample"]);
}

#[tokio::test]
async fn unknown_command_is_an_error() {
    let cache = default_market();
    let err = CommandRegistry::call("buy", None, &cache).await.unwrap_err();
    assert!(matches!(err, CommandError::UnknownCommand(ref n) if n == "buy"));
}

// ── top ──

#[tokio::test]
async fn top_sorts_descending() {
    let cache = default_market();
    let reply = call(&cache, "top", Some("3")).await;
    assert_eq!(
        item_names(&reply),
        ["Zakum Helmet", "Red Dragon Cape", "Blue Dragon Cape"]
    );
    assert_eq!(reply.lines[0], " 1. Zakum Helmet - 250,000");
    assert_eq!(
        reply.footer.as_deref(),
        Some("Showing 3 of 5 listings (truncated)")
    );
}

#[tokio::test]
async fn top_defaults_to_ten_and_caps_at_fifteen() {
    let (cache, _) = market(Some(many(40)), None);

    let reply = call(&cache, "top", None).await;
    assert_eq!(reply.items.len(), 10);
    assert_eq!(reply.items[0].name, "Item 40");

    let reply = call(&cache, "top", Some("100")).await;
    assert_eq!(reply.items.len(), 15);
    assert_eq!(
        reply.footer.as_deref(),
        Some("Showing 15 of 40 listings (truncated)")
    );
}

#[tokio::test]
async fn top_title_counts_what_is_shown() {
    let cache = default_market();
    let reply = call(&cache, "top", None).await;
    assert_eq!(reply.title, "Top 5 listings by price");
    assert_eq!(reply.footer.as_deref(), Some("Showing 5 of 5 listings"));
}

#[tokio::test]
async fn top_rejects_bad_count() {
    let cache = default_market();
    for arg in ["0", "-2", "many"] {
        let reply = call(&cache, "top", Some(arg)).await;
        assert_eq!(reply.title, "Usage", "arg {arg}");
    }
}

// ── search ──

#[tokio::test]
async fn search_filters_and_sorts_ascending() {
    let (cache, renderer) = market(None, Some(page(&[
        ("Red Dragon Cape", "45,500"),
        ("Dragon Slayer Mug", "9"),
        ("Cape Hook", "50"),
    ])));

    let reply = call(&cache, "search", Some("dragon")).await;
    assert_eq!(item_names(&reply), ["Dragon Slayer Mug", "Red Dragon Cape"]);
    assert_eq!(reply.footer.as_deref(), Some("Showing 2 of 2 listings"));

    let urls = renderer.urls.lock().unwrap();
    assert!(urls[0].ends_with("?keyword=dragon"));
}

#[tokio::test]
async fn search_without_matches() {
    let cache = default_market();
    let reply = call(&cache, "search", Some("sword")).await;
    assert!(reply.items.is_empty());
    assert!(!reply.is_unavailable());
    assert_eq!(reply.lines, ["No listings match 'sword'."]);
}

#[tokio::test]
async fn search_requires_term() {
    let cache = default_market();
    assert_eq!(call(&cache, "search", None).await.title, "Usage");
    assert_eq!(call(&cache, "search", Some("   ")).await.title, "Usage");
}

// ── price ──

#[tokio::test]
async fn price_exact_match_ignores_case() {
    let cache = default_market();
    let reply = call(&cache, "price", Some("maple hat")).await;
    assert_eq!(reply.lines, ["Maple Hat - 1,000"]);
    assert_eq!(item_names(&reply), ["Maple Hat"]);
}

#[tokio::test]
async fn price_falls_back_to_partial_matches() {
    let cache = default_market();
    let reply = call(&cache, "price", Some("dragon")).await;
    assert_eq!(item_names(&reply), ["Blue Dragon Cape", "Red Dragon Cape"]);
}

#[tokio::test]
async fn price_unknown_item() {
    let cache = default_market();
    let reply = call(&cache, "price", Some("Pink Bean")).await;
    assert_eq!(reply.lines, ["No listing named 'Pink Bean'."]);
}

// ── stats and sample ──

#[tokio::test]
async fn stats_reports_extremes_and_mean() {
    let (cache, _) = market(
        Some(page(&[("A", "100"), ("B", "300"), ("C", "200")])),
        None,
    );
    let reply = call(&cache, "stats", None).await;
    assert_eq!(
        reply.lines,
        [
            "Listings: 3",
            "Average:  200",
            "Lowest:   100 (A)",
            "Highest:  300 (B)",
        ]
    );
    assert!(reply.footer.unwrap().starts_with("Captured "));
}

#[tokio::test]
async fn sample_keeps_page_order() {
    let (cache, _) = market(Some(many(20)), None);
    let reply = call(&cache, "sample", None).await;
    assert_eq!(reply.items.len(), 15);
    assert_eq!(reply.items[0].name, "Item 01");
    assert_eq!(reply.items[14].name, "Item 15");
    assert_eq!(
        reply.footer.as_deref(),
        Some("Showing 15 of 20 listings (truncated)")
    );
}

// ── unavailable ──

#[tokio::test]
async fn every_command_reports_unavailable_without_data() {
    let (cache, _) = market(None, None);
    for (name, arg) in [
        ("top", None),
        ("search", Some("hat")),
        ("price", Some("hat")),
        ("stats", None),
        ("sample", None),
    ] {
        let reply = call(&cache, name, arg).await;
        assert!(reply.is_unavailable(), "{name}");
        assert_eq!(reply.lines, [UNAVAILABLE]);
    }
}

#[tokio::test]
async fn empty_page_is_unavailable() {
    let (cache, _) = market(Some("<html><body></body></html>".to_string()), None);
    assert!(call(&cache, "stats", None).await.is_unavailable());
    assert!(call(&cache, "top", Some("5")).await.is_unavailable());
}

#[tokio::test]
async fn reply_serializes_items() {
    let cache = default_market();
    let reply = call(&cache, "top", Some("1")).await;
    let json = serde_json::to_value(&reply).unwrap();
    assert_eq!(json["items"][0]["name"], "Zakum Helmet");
    assert_eq!(json["items"][0]["price"], 250000);
}
