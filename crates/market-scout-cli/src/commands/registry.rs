//! Command registration and dispatch.

use market_scout::ListingCache;
use serde::Serialize;

use super::{price, sample, search, stats, top};
use crate::format::Reply;

/// Name, usage line and description of one command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

pub struct CommandRegistry;

impl CommandRegistry {
    pub fn list() -> Vec<CommandDefinition> {
        vec![
            top::definition(),
            search::definition(),
            price::definition(),
            stats::definition(),
            sample::definition(),
        ]
    }

    pub async fn call(
        name: &str,
        arg: Option<&str>,
        cache: &ListingCache,
    ) -> Result<Reply, CommandError> {
        tracing::debug!("command {name} {arg:?}");
        match name.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(top::execute(arg, cache).await),
            "search" => Ok(search::execute(arg, cache).await),
            "price" => Ok(price::execute(arg, cache).await),
            "stats" => Ok(stats::execute(cache).await),
            "sample" | "list" => Ok(sample::execute(cache).await),
            _ => Err(CommandError::UnknownCommand(name.to_string())),
        }
    }
}
