//! Chat-style commands over the listing cache.

pub mod price;
pub mod registry;
pub mod sample;
pub mod search;
pub mod stats;
pub mod top;

pub use registry::{CommandDefinition, CommandError, CommandRegistry};

/// Trimmed argument, `None` when absent or blank.
pub(crate) fn non_empty(arg: Option<&str>) -> Option<&str> {
    arg.map(str::trim).filter(|a| !a.is_empty())
}
