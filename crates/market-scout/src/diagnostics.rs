//! Diagnostics for extractions that found no structural markers.
//!
//! Writes the raw markup to disk for manual inspection and logs the
//! heuristic candidates. Failures here are logged and never surface.

use crate::extract::{Candidate, CandidateReport};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the markup dump inside the dump directory.
pub const DUMP_FILE: &str = "page_source.html";

const SHOWN_CANDIDATES: usize = 10;
const SHOWN_HINTS: usize = 5;

/// Write `markup` to `<dir>/page_source.html`, replacing any previous dump.
pub fn dump_markup(dir: &Path, markup: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(DUMP_FILE);
    let tmp = dir.join(format!("{DUMP_FILE}.tmp"));
    fs::write(&tmp, markup)?;
    fs::rename(&tmp, &path)?;
    Ok(path)
}

/// Log a fallback extraction and optionally dump its markup.
pub fn report_fallback(
    url: &str,
    markup: &str,
    report: Option<&CandidateReport>,
    dump_dir: Option<&Path>,
) -> Option<PathBuf> {
    tracing::warn!(
        "no listing markers found on {url} ({} bytes of markup)",
        markup.len()
    );

    if let Some(report) = report {
        log_candidates("price-like", &report.price_like, SHOWN_CANDIDATES);
        log_candidates("name-like", &report.name_like, SHOWN_CANDIDATES);
        log_candidates("card/price class", &report.class_hints, SHOWN_HINTS);
    }

    let dir = dump_dir?;
    match dump_markup(dir, markup) {
        Ok(path) => {
            tracing::info!("saved page source to {}", path.display());
            Some(path)
        }
        Err(e) => {
            tracing::warn!("failed to save page source in {}: {e}", dir.display());
            None
        }
    }
}

fn log_candidates(kind: &str, candidates: &[Candidate], shown: usize) {
    tracing::info!("found {} {kind} elements", candidates.len());
    for (i, c) in candidates.iter().take(shown).enumerate() {
        tracing::info!("  {}. classes={:?} text={:?}", i + 1, c.classes, c.text);
    }
}
