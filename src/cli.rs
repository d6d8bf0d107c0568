//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Page theming toolkit: inspect, edit, render, and simulate themed page overrides.
#[derive(Debug, Parser)]
#[command(name = "pageshade", version)]
pub struct Args {
    /// Path to config file (default: ./pageshade.toml or ~/.config/pageshade/pageshade.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the persisted settings.
    Show {
        /// Print settings as JSON instead of formatted text.
        #[arg(long = "json")]
        json: bool,
    },
    /// Select the active theme mode and push it to the active page.
    SetMode {
        /// Mode to select: off, dark, or eye.
        mode: String,
    },
    /// Edit one color of a theme profile.
    SetColor {
        /// Profile to edit: dark or eye.
        profile: String,
        /// Field to set: background, text, link, or accent.
        field: String,
        /// Color value in #rrggbb form.
        value: String,
    },
    /// Restore hardcoded default settings.
    Reset,
    /// Render the override stylesheet for the current settings.
    Render {
        /// Render for this mode instead of the persisted one.
        #[arg(long = "mode")]
        mode: Option<String>,
        /// Override strategy: narrow or broad-inherit.
        #[arg(long = "strategy")]
        strategy: Option<String>,
    },
    /// Run controller, pages, and panel through a scripted in-memory scenario.
    Simulate {
        /// Number of concurrently open pages.
        #[arg(long = "tabs", default_value_t = 2)]
        tabs: u32,
        /// Override strategy: narrow or broad-inherit.
        #[arg(long = "strategy")]
        strategy: Option<String>,
    },
}
