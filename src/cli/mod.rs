//! CLI module for itemstore
//!
//! Provides command-line interface for:
//! - init: Create directory structure
//! - serve: Open the store and serve the HTTP API
//! - dump: Print every stored item
//! - compact: Rewrite the record file keeping only live items

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{compact, dump, dump_to, init, run, run_command, serve};
pub use config::{Config, StorageBackend};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_response, write_response_to};
