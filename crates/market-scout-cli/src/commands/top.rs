//! `top` command: most expensive listings.

use market_scout::{sort_by_price, top, ListingCache};

use super::{non_empty, registry::CommandDefinition};
use crate::format::{Reply, MAX_DISPLAY};

const DEFAULT_COUNT: usize = 10;
const USAGE: &str = "top [N]  (N between 1 and 15, default 10)";

pub fn definition() -> CommandDefinition {
    CommandDefinition {
        name: "top",
        usage: USAGE,
        description: "Show the N most expensive listings",
    }
}

pub async fn execute(arg: Option<&str>, cache: &ListingCache) -> Reply {
    let count = match non_empty(arg) {
        None => DEFAULT_COUNT,
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => n.min(MAX_DISPLAY),
            _ => return Reply::usage(USAGE),
        },
    };

    let batch = cache.listings().await;
    if batch.is_empty() {
        return Reply::unavailable();
    }

    let sorted = sort_by_price(&batch.records, true);
    let shown = top(&sorted, count);
    Reply::listings(
        format!("Top {} listings by price", shown.len()),
        shown,
        batch.len(),
    )
}
