// SPDX-FileCopyrightText: 2026 Plugsync Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugsync - keeps a plugin directory's version metadata in sync.
//!
//! This is the binary entry point for the Plugsync service and its
//! maintenance commands.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod error;
mod index;
mod list;
mod serve;
mod sync;
mod validate;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use plugsync_core::PluginFormat;

/// Plugsync - keeps plugin version metadata in sync with upstream manifests.
#[derive(Parser, Debug)]
#[command(name = "plugsync", version, about, long_about = None)]
struct Cli {
    /// Configuration file merged on top of the default lookup chain.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run sync cycles on the configured interval until interrupted.
    Serve,
    /// Run a single sync cycle and print its report.
    Sync {
        /// Fetch and merge, but do not write the stores.
        #[arg(long)]
        dry_run: bool,
        /// Print the cycle report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List registered plugins.
    List {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
        /// Only show one storage format (legacy or cw2).
        #[arg(long, value_parser = parse_format)]
        format: Option<PluginFormat>,
        /// Case-insensitive filter over id, name, description and tags.
        #[arg(long)]
        search: Option<String>,
    },
    /// Check both plugin stores and report every problem.
    Validate,
    /// Generate the CW2 plugin index.
    Index {
        /// Output file (default: index.json next to the CW2 manifest directory).
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

fn parse_format(raw: &str) -> Result<PluginFormat, String> {
    raw.parse()
        .map_err(|_| format!("unknown format `{raw}` (expected legacy or cw2)"))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match plugsync_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            plugsync_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.service.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(&config).await,
        Some(Commands::Sync { dry_run, json }) => sync::run_sync(&config, dry_run, json).await,
        Some(Commands::List {
            json,
            format,
            search,
        }) => list::run_list(&config, json, format, search.as_deref()),
        Some(Commands::Validate) => validate::run_validate(&config),
        Some(Commands::Index { output }) => index::run_index(&config, output.as_deref()),
        None => {
            println!("plugsync: use --help for available commands");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("plugsync={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_list_filters() {
        let cli = Cli::try_parse_from([
            "plugsync", "list", "--format", "cw2", "--search", "clock", "--json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::List {
                json,
                format,
                search,
            }) => {
                assert!(json);
                assert_eq!(format, Some(PluginFormat::Cw2));
                assert_eq!(search.as_deref(), Some("clock"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["plugsync", "list", "--format", "v3"]).is_err());
    }

    #[test]
    fn global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["plugsync", "sync", "--dry-run", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Sync {
                dry_run: true,
                json: false
            })
        ));
    }
}
