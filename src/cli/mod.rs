//! CLI module for sift
//!
//! Provides:
//! - render: compile a filter envelope from stdin and print the native query
//! - paging: page arithmetic

mod args;
mod commands;
mod errors;
mod io;
mod schema;

pub use args::{Cli, Command};
pub use commands::{paging, render, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
pub use schema::{decode_envelope, Schema, SchemaField};
