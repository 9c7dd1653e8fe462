//! Command-line argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use webcheck::{CheckKind, CheckSettings, WebCheckError};

/// Watch web pages for changes and outages
#[derive(Parser, Debug)]
#[command(name = "webcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/webcheck/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file (overrides $WEBCHECK_DATABASE and the config file)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every due check once
    Check,

    /// Run checks repeatedly until interrupted
    Watch {
        /// Seconds between passes (defaults to watch.interval_seconds)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// List stored checks
    List {
        /// Only list checks of this kind
        #[arg(long)]
        kind: Option<CheckKind>,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Add a check
    Add {
        #[command(subcommand)]
        check: AddCommands,
    },

    /// Delete a check
    Delete {
        /// hash, string or diff
        kind: CheckKind,
        url: String,
    },

    /// Add checks from a file, one per line
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum AddCommands {
    /// Alert when the page text changes or reverts
    Hash {
        url: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Alert when a string appears on or disappears from the page
    String {
        target: String,
        url: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Alert with a diff of the page text when it changes
    Diff {
        url: String,
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Per-check overrides. Taken as text so that bad values are reported the
/// same way as in import files.
#[derive(Args, Debug, Default, Clone)]
pub struct SettingsArgs {
    /// Seconds a site can be down for before warning
    #[arg(long, allow_hyphen_values = true)]
    pub max_down_time: Option<String>,

    /// Seconds to wait between checks
    #[arg(long, allow_hyphen_values = true)]
    pub check_frequency: Option<String>,

    /// Seconds to wait for a response
    #[arg(long, allow_hyphen_values = true)]
    pub check_timeout: Option<String>,
}

impl SettingsArgs {
    /// Merge the given flags over `defaults` and validate the result
    pub fn resolve(&self, defaults: &CheckSettings) -> Result<CheckSettings, WebCheckError> {
        CheckSettings::parse(
            self.max_down_time.as_deref().unwrap_or(&defaults.max_down_time.to_string()),
            self.check_frequency.as_deref().unwrap_or(&defaults.check_frequency.to_string()),
            self.check_timeout.as_deref().unwrap_or(&defaults.check_timeout.to_string()),
        )
    }
}
