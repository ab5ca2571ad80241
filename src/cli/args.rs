//! CLI argument definitions using clap
//!
//! Commands:
//! - sift render --schema <path> --dialect <name> [--config <path>]
//! - sift paging --page <n> --size <n> [--first <n>] [--total <n> --received <n>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sift - compile search filters into native store queries
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a filter envelope read from stdin and print the native query
    Render {
        /// Path to the schema file describing the filter
        #[arg(long)]
        schema: PathBuf,

        /// Target dialect (postgres, mysql, oracle, mongo, ...)
        #[arg(long)]
        dialect: String,

        /// Path to a search configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print offset/limit for a page and, given totals, whether it is the last
    Paging {
        /// 1-based page index
        #[arg(long, default_value_t = 1)]
        page: u64,

        /// Page size; 0 returns everything
        #[arg(long)]
        size: u64,

        /// Size of the first page, if different
        #[arg(long)]
        first: Option<u64>,

        /// Total number of matching items
        #[arg(long, requires = "received")]
        total: Option<u64>,

        /// Items returned on this page
        #[arg(long, requires = "total")]
        received: Option<u64>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "sift", "render", "--schema", "user.json", "--dialect", "oracle",
        ])
        .unwrap();
        match cli.command {
            Command::Render {
                schema,
                dialect,
                config,
            } => {
                assert_eq!(schema, PathBuf::from("user.json"));
                assert_eq!(dialect, "oracle");
                assert!(config.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_total_requires_received() {
        assert!(Cli::try_parse_from(["sift", "paging", "--size", "10", "--total", "15"]).is_err());
        assert!(Cli::try_parse_from([
            "sift", "paging", "--size", "10", "--total", "15", "--received", "5"
        ])
        .is_ok());
    }
}
