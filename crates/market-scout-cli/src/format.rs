//! Reply formatting shared by every command.

use market_scout::{format_price, Listing};
use serde::Serialize;
use std::fmt;

/// Most items a reply ever displays.
pub const MAX_DISPLAY: usize = 15;

pub const UNAVAILABLE: &str =
    "Marketplace data is unavailable right now, please try again later.";

/// A formatted command result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub title: String,
    pub lines: Vec<String>,
    pub footer: Option<String>,
    /// Listings behind `lines`, for machine-readable output.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<Listing>,
}

impl Reply {
    pub fn message(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
            footer: None,
            items: Vec::new(),
        }
    }

    /// The uniform "no data" reply.
    pub fn unavailable() -> Self {
        Self::message("Marketplace", vec![UNAVAILABLE.to_string()])
    }

    pub fn usage(usage: &str) -> Self {
        Self::message("Usage", vec![usage.to_string()])
    }

    /// A numbered listing table of at most [`MAX_DISPLAY`] rows.
    ///
    /// `total` is how many listings were available before truncation.
    pub fn listings(title: impl Into<String>, shown: &[Listing], total: usize) -> Self {
        let shown = &shown[..shown.len().min(MAX_DISPLAY)];
        let lines = shown
            .iter()
            .enumerate()
            .map(|(i, l)| listing_line(i + 1, l))
            .collect();
        Self {
            title: title.into(),
            lines,
            footer: Some(footer(shown.len(), total)),
            items: shown.to_vec(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.lines.len() == 1 && self.lines[0] == UNAVAILABLE
    }
}

pub fn listing_line(rank: usize, listing: &Listing) -> String {
    format!("{rank:>2}. {} - {}", listing.name, format_price(listing.price))
}

/// `Showing X of Y listings`, marked when items were cut.
pub fn footer(shown: usize, total: usize) -> String {
    let noun = if total == 1 { "listing" } else { "listings" };
    if shown < total {
        format!("Showing {shown} of {total} {noun} (truncated)")
    } else {
        format!("Showing {shown} of {total} {noun}")
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for line in &self.lines {
            writeln!(f, "  {line}")?;
        }
        if let Some(footer) = &self.footer {
            write!(f, "{footer}")?;
        }
        Ok(())
    }
}
