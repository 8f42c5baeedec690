//! Interactive REPL over the listing cache.
//!
//! Launch with `market-scout repl` (or no subcommand). Commands work with
//! or without a leading `/`; type `/help` for the list, Tab for completion.

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use tokio::runtime::Runtime;

use market_scout::{CacheState, ListingCache};

use crate::commands::{CommandError, CommandRegistry};

const COMMANDS: &[(&str, &str)] = &[
    ("/top", "Most expensive listings: /top [N]"),
    ("/search", "Live keyword search: /search <term>"),
    ("/price", "Price of an item: /price <name>"),
    ("/stats", "Count, lowest, highest and average price"),
    ("/sample", "Listings in page order"),
    ("/status", "Show cache state"),
    ("/refresh", "Drop the cached batch and scrape again"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

struct ScoutHelper;

impl Completer for ScoutHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];
        if input.contains(' ') {
            return Ok((pos, Vec::new()));
        }

        let slashed = input.starts_with('/');
        let matches = COMMANDS
            .iter()
            .filter(|(cmd, _)| {
                if slashed {
                    cmd.starts_with(input)
                } else {
                    cmd[1..].starts_with(input)
                }
            })
            .map(|(cmd, desc)| {
                let name = if slashed { *cmd } else { &cmd[1..] };
                Pair {
                    display: format!("{cmd:<12} {desc}"),
                    replacement: format!("{name} "),
                }
            })
            .collect();
        Ok((0, matches))
    }
}

impl Hinter for ScoutHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|(cmd, _)| cmd.starts_with(line) && *cmd != line)
            .map(|(cmd, _)| cmd[line.len()..].to_string())
    }
}

impl Highlighter for ScoutHelper {}
impl Validator for ScoutHelper {}
impl Helper for ScoutHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Run the interactive REPL until `/exit` or EOF.
///
/// Each command blocks on `rt`, so the editor never crosses an await.
pub fn run(rt: &Runtime, cache: &ListingCache) -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mmarket-scout v{}\x1b[0m \x1b[90m{}\x1b[0m",
        env!("CARGO_PKG_VERSION"),
        cache.scraper().base_url()
    );
    eprintln!();
    eprintln!(
        "    Try \x1b[36mtop 5\x1b[0m or \x1b[36msearch hat\x1b[0m, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<ScoutHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(ScoutHelper));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".market_scout_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = " \x1b[36mscout>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let (cmd, args) = split_command(input);
                match cmd.as_str() {
                    "exit" | "quit" => {
                        eprintln!("  Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "status" => cmd_status(cache),
                    "refresh" => cmd_refresh(rt, cache),
                    _ => match rt.block_on(CommandRegistry::call(&cmd, args, cache)) {
                        Ok(reply) => {
                            println!();
                            println!("{reply}");
                            println!();
                        }
                        Err(CommandError::UnknownCommand(name)) => {
                            eprintln!("  Unknown command '{name}'. Type /help for commands.");
                        }
                    },
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    Ok(())
}

/// Lower-cased command word and the trimmed remainder, if any.
fn split_command(input: &str) -> (String, Option<&str>) {
    let mut parts = input.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_lowercase();
    let args = parts.next().map(str::trim).filter(|a| !a.is_empty());
    (cmd, args)
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<12} {desc}");
    }
    eprintln!();
}

fn cmd_status(cache: &ListingCache) {
    let status = cache.status();
    let state = match status.state {
        CacheState::Empty => "empty",
        CacheState::Fresh => "fresh",
        CacheState::Stale => "stale",
    };
    eprintln!();
    eprintln!("  Cache:     {state}");
    eprintln!("  Listings:  {}", status.records);
    if let Some(at) = status.captured_at {
        eprintln!("  Captured:  {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(age) = status.age {
        eprintln!("  Age:       {}s of {}s", age.as_secs(), status.ttl.as_secs());
    }
    eprintln!("  Scrapes:   {}", cache.cycles());
    eprintln!("  In flight: {}", cache.in_flight());
    eprintln!();
}

fn cmd_refresh(rt: &Runtime, cache: &ListingCache) {
    cache.invalidate();
    let batch = rt.block_on(cache.listings());
    eprintln!("  Refreshed: {} listings", batch.len());
}
