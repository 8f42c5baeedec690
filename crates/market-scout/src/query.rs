//! Query and aggregation over a listing set.

use crate::types::{Listing, ScoutError, ScoutResult};
use serde::{Deserialize, Serialize};

/// Price ordering for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    Descending,
    #[default]
    None,
}

/// An ephemeral listing query: filter, then sort, then truncate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Query {
    pub search_term: Option<String>,
    pub sort_order: SortOrder,
    pub limit: Option<usize>,
}

impl Query {
    pub fn apply(&self, records: &[Listing]) -> Vec<Listing> {
        let mut out = match self.search_term.as_deref() {
            Some(term) => filter(records, term),
            None => records.to_vec(),
        };
        match self.sort_order {
            SortOrder::Ascending => out = sort_by_price(&out, false),
            SortOrder::Descending => out = sort_by_price(&out, true),
            SortOrder::None => {}
        }
        if let Some(n) = self.limit {
            out.truncate(n);
        }
        out
    }
}

/// Summary statistics over listing prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceStats {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
}

/// Listings whose name contains `term`, ignoring case, in input order.
pub fn filter(records: &[Listing], term: &str) -> Vec<Listing> {
    let needle = term.trim().to_lowercase();
    records
        .iter()
        .filter(|l| l.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Stable sort by price. Equal prices keep their input order.
pub fn sort_by_price(records: &[Listing], descending: bool) -> Vec<Listing> {
    let mut out = records.to_vec();
    if descending {
        out.sort_by(|a, b| b.price.cmp(&a.price));
    } else {
        out.sort_by_key(|l| l.price);
    }
    out
}

/// Count, min, max and mean of prices. Fails on an empty slice.
pub fn aggregate(records: &[Listing]) -> ScoutResult<PriceStats> {
    let first = records.first().ok_or(ScoutError::EmptyInput)?;
    let (mut min, mut max, mut sum) = (first.price, first.price, 0u128);
    for l in records {
        min = min.min(l.price);
        max = max.max(l.price);
        sum += l.price as u128;
    }
    Ok(PriceStats {
        count: records.len(),
        min,
        max,
        mean: sum as f64 / records.len() as f64,
    })
}

/// The first `n` records, or all of them when there are fewer.
pub fn top(records: &[Listing], n: usize) -> &[Listing] {
    &records[..n.min(records.len())]
}

/// First listing whose name equals `name`, ignoring case and outer spaces.
pub fn find_exact<'a>(records: &'a [Listing], name: &str) -> Option<&'a Listing> {
    let wanted = name.trim().to_lowercase();
    records.iter().find(|l| l.name.to_lowercase() == wanted)
}

/// Cheapest listing; the first one on ties.
pub fn cheapest(records: &[Listing]) -> Option<&Listing> {
    records.iter().reduce(|best, l| if l.price < best.price { l } else { best })
}

/// Most expensive listing; the first one on ties.
pub fn priciest(records: &[Listing]) -> Option<&Listing> {
    records.iter().reduce(|best, l| if l.price > best.price { l } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(name: &str, price: u64) -> Listing {
        Listing::new(name, price)
    }

    #[test]
    fn test_aggregate() {
        let stats = aggregate(&[l("a", 100), l("b", 300), l("c", 200)]).unwrap();
        assert_eq!(
            stats,
            PriceStats {
                count: 3,
                min: 100,
                max: 300,
                mean: 200.0
            }
        );
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(matches!(aggregate(&[]), Err(ScoutError::EmptyInput)));
    }

    #[test]
    fn test_aggregate_large_prices_do_not_overflow() {
        let stats = aggregate(&[l("a", u64::MAX), l("b", u64::MAX)]).unwrap();
        assert_eq!(stats.max, u64::MAX);
        assert!(stats.mean > 1.8e19);
    }

    #[test]
    fn test_filter_case_insensitive() {
        let records = [l("Red Dragon Cape", 10), l("cape", 5), l("DRAGON egg", 7)];
        let out = filter(&records, "dragon");
        assert_eq!(out, vec![l("Red Dragon Cape", 10), l("DRAGON egg", 7)]);
        assert!(filter(&records, "Dragon").iter().all(|r| r.name.to_lowercase().contains("dragon")));
    }

    #[test]
    fn test_sort_stable_and_idempotent() {
        let records = [l("a", 5), l("b", 1), l("c", 5), l("d", 3), l("e", 1)];
        let asc = sort_by_price(&records, false);
        assert_eq!(
            asc.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            ["b", "e", "d", "a", "c"]
        );
        assert_eq!(sort_by_price(&asc, false), asc);

        let desc = sort_by_price(&records, true);
        assert_eq!(
            desc.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            ["a", "c", "d", "b", "e"]
        );
        assert_eq!(sort_by_price(&desc, true), desc);
    }

    #[test]
    fn test_top_clamps() {
        let records: Vec<_> = (0..5).map(|i| l("x", i)).collect();
        assert_eq!(top(&records, 10).len(), 5);
        assert_eq!(top(&records, 2), &records[..2]);
        assert!(top(&records, 0).is_empty());
    }

    #[test]
    fn test_find_exact() {
        let records = [l("Snail Shell", 1), l("snail shell", 2), l("Snail Shell Plus", 3)];
        assert_eq!(find_exact(&records, "SNAIL SHELL ").map(|r| r.price), Some(1));
        assert!(find_exact(&records, "snail").is_none());
    }

    #[test]
    fn test_cheapest_and_priciest() {
        let records = [l("a", 5), l("b", 1), l("c", 9), l("d", 1), l("e", 9)];
        assert_eq!(cheapest(&records).unwrap().name, "b");
        assert_eq!(priciest(&records).unwrap().name, "c");
        assert!(cheapest(&[]).is_none());
    }

    #[test]
    fn test_query_apply() {
        let records = [l("Red Hat", 30), l("Blue Hat", 10), l("Red Cape", 20), l("Red Shoe", 5)];
        let q = Query {
            search_term: Some("red".to_string()),
            sort_order: SortOrder::Descending,
            limit: Some(2),
        };
        assert_eq!(q.apply(&records), vec![l("Red Hat", 30), l("Red Cape", 20)]);
        assert_eq!(Query::default().apply(&records), records.to_vec());
    }
}
