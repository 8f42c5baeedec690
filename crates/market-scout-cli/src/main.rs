// Copyright 2026 Market Scout Contributors
// SPDX-License-Identifier: MIT

//! Market Scout entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use market_scout_cli::commands::CommandRegistry;
use market_scout_cli::config::{open_cache, resolve_config, Overrides};
use market_scout_cli::{doctor, repl, Reply};

#[derive(Parser)]
#[command(
    name = "market-scout",
    about = "Market Scout — scrape marketplace listings and answer price questions",
    version,
    after_help = "Run 'market-scout' with no command to enter interactive mode."
)]
struct Cli {
    /// Marketplace page to scrape (overrides SCOUT_BASE_URL).
    #[arg(long, global = true)]
    url: Option<String>,

    /// Cache lifetime in seconds (overrides SCOUT_CACHE_TTL_SECS).
    #[arg(long, global = true)]
    ttl: Option<u64>,

    /// Directory for page dumps when extraction falls back.
    #[arg(long, global = true)]
    dump_dir: Option<PathBuf>,

    /// Never write page dumps.
    #[arg(long, global = true)]
    no_dump: bool,

    /// Replay a saved HTML page instead of launching a browser.
    #[arg(long, global = true)]
    from_file: Option<PathBuf>,

    /// Path to the Chromium binary.
    #[arg(long, global = true)]
    chromium: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Print replies as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Most expensive listings.
    Top {
        /// How many to show (1-15, default 10).
        count: Option<String>,
    },
    /// Search the marketplace live, cheapest first.
    Search {
        /// Search term; several words are joined with spaces.
        #[arg(required = true)]
        term: Vec<String>,
    },
    /// Look up the price of an item by name.
    Price {
        /// Item name; several words are joined with spaces.
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Listing count and price statistics.
    Stats,
    /// Listings in page order.
    Sample,
    /// Launch interactive REPL mode (default).
    Repl,
    /// Check environment and configuration.
    Doctor,
    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   market-scout completions bash > ~/.local/share/bash-completion/completions/market-scout
    ///   market-scout completions zsh > ~/.zfunc/_market-scout
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let overrides = Overrides {
        url: cli.url.clone(),
        ttl_secs: cli.ttl,
        dump_dir: cli.dump_dir.clone(),
        no_dump: cli.no_dump,
        chromium: cli.chromium.clone(),
    };
    let config = resolve_config(&overrides);

    let command = cli.command.unwrap_or(Commands::Repl);
    let (name, arg) = match command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "market-scout", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Doctor => {
            if !doctor::run(&config) {
                std::process::exit(1);
            }
            return Ok(());
        }
        Commands::Repl => {
            let rt = runtime()?;
            let cache = open_cache(&config, cli.from_file.as_deref())?;
            return repl::run(&rt, &cache);
        }
        Commands::Top { count } => ("top", count),
        Commands::Search { term } => ("search", Some(term.join(" "))),
        Commands::Price { name } => ("price", Some(name.join(" "))),
        Commands::Stats => ("stats", None),
        Commands::Sample => ("sample", None),
    };

    let rt = runtime()?;
    let cache = open_cache(&config, cli.from_file.as_deref())?;
    let reply = rt.block_on(CommandRegistry::call(name, arg.as_deref(), &cache))?;
    print_reply(&reply, cli.json)?;
    if reply.is_unavailable() {
        std::process::exit(2);
    }
    Ok(())
}

/// The browser and cache only need one thread.
fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

fn print_reply(reply: &Reply, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reply)?);
    } else {
        println!("{reply}");
    }
    Ok(())
}
