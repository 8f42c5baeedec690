//! Core data types for marketplace listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One marketplace item as shown on the listing page.
///
/// Listings are positional within a batch: two records with the same name
/// are still distinct items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Display name, trimmed and never empty.
    pub name: String,
    /// Price parsed from a comma-grouped numeral.
    pub price: u64,
}

impl Listing {
    pub fn new(name: impl Into<String>, price: u64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// The result of one render + extract cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionBatch {
    /// Listings in page order.
    pub records: Vec<Listing>,
    /// Wall-clock capture time.
    pub captured_at: DateTime<Utc>,
}

impl ExtractionBatch {
    pub fn new(records: Vec<Listing>) -> Self {
        Self {
            records,
            captured_at: Utc::now(),
        }
    }

    /// An empty batch, used when a cycle produced nothing usable.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Errors that can occur in the scout library.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    #[error("Render timed out after {0:?}")]
    RenderTimeout(Duration),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Browser unavailable: {0}")]
    BrowserUnavailable(String),

    #[error("No records to aggregate")]
    EmptyInput,

    #[error("Invalid structural marker '{marker}': {reason}")]
    InvalidMarker { marker: String, reason: String },

    #[error("Worker error: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type ScoutResult<T> = Result<T, ScoutError>;
