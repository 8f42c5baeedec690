// Copyright 2026 Market Scout Contributors
// SPDX-License-Identifier: MIT

//! Market Scout command surface: chat-style commands, reply formatting,
//! configuration resolution and the interactive REPL.

pub mod commands;
pub mod config;
pub mod doctor;
pub mod format;
pub mod repl;

pub use commands::{CommandDefinition, CommandError, CommandRegistry};
pub use format::Reply;
