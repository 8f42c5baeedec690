//! `sample` command: listings in page order.

use market_scout::ListingCache;

use super::registry::CommandDefinition;
use crate::format::Reply;

pub fn definition() -> CommandDefinition {
    CommandDefinition {
        name: "sample",
        usage: "sample",
        description: "List the first listings as shown on the page",
    }
}

pub async fn execute(cache: &ListingCache) -> Reply {
    let batch = cache.listings().await;
    if batch.is_empty() {
        return Reply::unavailable();
    }
    Reply::listings("Marketplace listings", &batch.records, batch.len())
}
