//! Environment readiness check.

use std::path::Path;

use market_scout::renderer::chromium::find_chromium;
use market_scout::ScoutConfig;

/// Print platform, browser and configuration diagnostics.
///
/// Returns whether a live scrape can run.
pub fn run(config: &ScoutConfig) -> bool {
    println!("Market Scout Doctor");
    println!("===================");
    println!();

    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!();

    let chromium = find_chromium(config.chromium_path.as_ref());
    match &chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!("[!!] Chromium NOT found. Set SCOUT_CHROMIUM_PATH or install google-chrome."),
    }

    match &config.dump_dir {
        Some(dir) if dump_dir_usable(dir) => {
            println!("[OK] Diagnostics dump dir: {}", dir.display())
        }
        Some(dir) => println!("[!!] Diagnostics dump dir is not writable: {}", dir.display()),
        None => println!("[--] Diagnostics dump disabled (SCOUT_DUMP_DIR=off or --no-dump)"),
    }

    println!();
    println!("Target:       {}", config.base_url);
    println!("Name marker:  {}", config.name_marker);
    println!("Price marker: {}", config.price_marker);
    println!("Cache TTL:    {}s", config.cache_ttl_secs);
    println!(
        "Readiness:    body {}s, settle {}s every {}ms",
        config.body_timeout_secs, config.settle_budget_secs, config.settle_poll_ms
    );

    println!();
    let ready = chromium.is_some();
    if ready {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
        println!("  Live scraping needs Chromium. Use --from-file to replay a saved page.");
    }
    ready
}

fn dump_dir_usable(dir: &Path) -> bool {
    if dir.is_dir() {
        return std::fs::metadata(dir).is_ok_and(|m| !m.permissions().readonly());
    }
    // Created on first dump; usable when its nearest existing ancestor is.
    dir.ancestors()
        .skip(1)
        .find(|p| p.exists())
        .is_some_and(|p| std::fs::metadata(p).is_ok_and(|m| !m.permissions().readonly()))
}
