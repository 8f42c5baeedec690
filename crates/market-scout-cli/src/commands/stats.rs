//! `stats` command: marketplace price statistics.

use market_scout::query::{cheapest, priciest};
use market_scout::{aggregate, format_price, ListingCache};

use super::registry::CommandDefinition;
use crate::format::Reply;

pub fn definition() -> CommandDefinition {
    CommandDefinition {
        name: "stats",
        usage: "stats",
        description: "Show listing count and price statistics",
    }
}

pub async fn execute(cache: &ListingCache) -> Reply {
    let batch = cache.listings().await;
    let Ok(stats) = aggregate(&batch.records) else {
        return Reply::unavailable();
    };

    let mut lines = vec![
        format!("Listings: {}", stats.count),
        format!("Average:  {}", format_price(stats.mean.round() as u64)),
    ];
    if let Some(low) = cheapest(&batch.records) {
        lines.push(format!("Lowest:   {} ({})", format_price(stats.min), low.name));
    }
    if let Some(high) = priciest(&batch.records) {
        lines.push(format!("Highest:  {} ({})", format_price(stats.max), high.name));
    }

    let mut reply = Reply::message("Marketplace statistics", lines);
    reply.footer = Some(format!(
        "Captured {}",
        batch.captured_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    reply
}
