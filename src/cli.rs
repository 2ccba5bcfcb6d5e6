//! CLI argument parsing for the installer.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for hypr-ai-install.
#[derive(Parser, Clone)]
#[command(name = "hypr-ai-install")]
#[command(version, about = "Install the Hyprland AI Automator daemon as a user service")]
pub struct Cli {
    /// Don't start the service after install
    #[arg(long)]
    pub no_start: bool,

    /// Non-interactive mode for scripted or CI runs
    ///
    /// Skips every prompt; the API key must come from --api-key or the
    /// GEMINI_API_KEY environment variable on a fresh install.
    #[arg(long)]
    pub no_interaction: bool,

    /// Gemini API key for the daemon configuration
    ///
    /// Ignored when a configuration file already exists.
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Install into this directory instead of the invoking user's home
    ///
    /// Intended for test installations into an isolated root.
    #[arg(long, value_name = "DIR")]
    pub target_root: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
