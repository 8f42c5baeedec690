//! `price` command: look up a listing by name.
//!
//! Exact (case-insensitive) matches win; otherwise partial matches are
//! listed cheapest first.

use market_scout::{filter, find_exact, format_price, sort_by_price, ListingCache};

use super::{non_empty, registry::CommandDefinition};
use crate::format::Reply;

const USAGE: &str = "price <item name>";

pub fn definition() -> CommandDefinition {
    CommandDefinition {
        name: "price",
        usage: USAGE,
        description: "Look up the price of an item by name",
    }
}

pub async fn execute(arg: Option<&str>, cache: &ListingCache) -> Reply {
    let Some(name) = non_empty(arg) else {
        return Reply::usage(USAGE);
    };

    let batch = cache.listings().await;
    if batch.is_empty() {
        return Reply::unavailable();
    }

    if let Some(hit) = find_exact(&batch.records, name) {
        let mut reply = Reply::message(
            format!("Price of {}", hit.name),
            vec![format!("{} - {}", hit.name, format_price(hit.price))],
        );
        reply.items = vec![hit.clone()];
        return reply;
    }

    let partial = sort_by_price(&filter(&batch.records, name), false);
    if partial.is_empty() {
        return Reply::message(
            format!("Price of {name}"),
            vec![format!("No listing named '{name}'.")],
        );
    }
    Reply::listings(
        format!("No exact match for '{name}', similar listings"),
        &partial,
        partial.len(),
    )
}
