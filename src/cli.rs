// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `monobuild`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "monobuild",
    version,
    about = "Build, test and deploy only the monorepo projects affected by a change.",
    long_about = None
)]
pub struct CliArgs {
    /// Base tag to compare against.
    #[arg(short = 't', long, value_name = "TAG", global = true, conflicts_with = "branch")]
    pub tag: Option<String>,

    /// Base branch to compare against (default: `[config].main_branch`).
    #[arg(short = 'b', long, value_name = "BRANCH", global = true)]
    pub branch: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MONOBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Path to the config file (TOML).
    ///
    /// Default: `.monobuild/config.toml` in the repository root, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory to start looking for the repository root from.
    ///
    /// Default: the current working directory.
    #[arg(long, value_name = "DIR", global = true)]
    pub repo: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Build and test affected projects (the default).
    Build {
        /// Extra arguments forwarded to every `build.sh` and `test.sh`.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Deploy affected projects that have an executable `deploy.sh`.
    Deploy {
        /// Extra arguments forwarded to every `deploy.sh`.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Print the dependency graph and write `projects/graph.json`.
    Graph,
    /// Print changed and affected projects without running anything.
    Affected,
    /// Print version and run context.
    Version,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl CliArgs {
    /// The subcommand to run; `build` with no arguments when none is given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Build { args: Vec::new() })
    }

    /// Base ref from `--tag` or `--branch`, if either was given.
    pub fn base_ref(&self) -> Option<String> {
        self.tag.clone().or_else(|| self.branch.clone())
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
