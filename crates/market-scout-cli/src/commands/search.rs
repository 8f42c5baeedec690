//! `search` command: live keyword search.

use market_scout::{filter, sort_by_price, ListingCache};

use super::{non_empty, registry::CommandDefinition};
use crate::format::Reply;

const USAGE: &str = "search <term>";

pub fn definition() -> CommandDefinition {
    CommandDefinition {
        name: "search",
        usage: USAGE,
        description: "Search the marketplace live, cheapest first",
    }
}

pub async fn execute(arg: Option<&str>, cache: &ListingCache) -> Reply {
    let Some(term) = non_empty(arg) else {
        return Reply::usage(USAGE);
    };

    let batch = cache.search(term).await;
    if batch.is_empty() {
        return Reply::unavailable();
    }

    let matches = sort_by_price(&filter(&batch.records, term), false);
    if matches.is_empty() {
        return Reply::message(
            format!("Search: {term}"),
            vec![format!("No listings match '{term}'.")],
        );
    }
    Reply::listings(format!("Search: {term}"), &matches, matches.len())
}
