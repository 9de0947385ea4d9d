//! CLI structure and command definitions.

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use flog_core::config::TreeConfig;
use flog_types::{MsgId, MsgType};

use crate::commands;

#[derive(Parser)]
#[command(name = "flog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hierarchical message logging", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Tree configuration file
    #[arg(short, long, global = true, env = "FLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show flog's own diagnostics (repeat for more)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress flog's own diagnostics
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the demo tree and print through it
    Demo {
        /// Also run the self test on the main log
        #[arg(long)]
        self_test: bool,
    },

    /// Print one message through the configured tree
    Print {
        /// Message type (e.g. error, warning, info)
        #[arg(short = 't', long = "type", default_value = "info")]
        msg_type: MsgType,

        /// Subsystem label
        #[arg(short, long)]
        subsystem: Option<String>,

        /// Message id, numeric or a built-in name such as `mark`
        #[arg(short, long)]
        id: Option<MsgId>,

        /// Log to print to (the first configured log if not specified)
        #[arg(short, long)]
        log: Option<String>,

        /// Message text
        text: Vec<String>,
    },

    /// Print one message of every type
    #[command(name = "selftest")]
    SelfTest {
        /// Log to test (the first configured log if not specified)
        #[arg(short, long)]
        log: Option<String>,
    },

    /// Show the effective configuration
    #[command(name = "render-config")]
    RenderConfig {
        /// Render the demo tree instead of the loaded one
        #[arg(long)]
        demo: bool,

        /// Render as JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version {
        /// Show build details
        #[arg(long)]
        detailed: bool,
    },
}

impl Cli {
    /// Load `--config`, or the default configuration file if present.
    pub fn load_config(&self) -> Result<TreeConfig> {
        match &self.config {
            Some(path) => TreeConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display())),
            None => TreeConfig::load_default().context("Failed to load default configuration"),
        }
    }

    /// Trace filter implied by `--verbose` / `--quiet`.
    pub fn trace_filter(&self) -> Option<&'static str> {
        if self.quiet {
            return Some("off");
        }
        match self.verbose {
            0 => None,
            1 => Some("flog_core=info,flog=info"),
            2 => Some("flog_core=debug,flog=debug"),
            _ => Some("flog_core=trace,flog=trace"),
        }
    }

    pub fn execute(&self, config: &TreeConfig) -> Result<()> {
        match &self.command {
            Commands::Demo { self_test } => commands::demo::execute(config, *self_test),
            Commands::Print { msg_type, subsystem, id, log, text } => commands::print::execute(
                config,
                log.as_deref(),
                *msg_type,
                subsystem.as_deref(),
                id.unwrap_or(MsgId::NONE),
                &text.join(" "),
            ),
            Commands::SelfTest { log } => commands::selftest::execute(config, log.as_deref()),
            Commands::RenderConfig { demo, json } => commands::render_config::execute(config, *demo, *json),
            Commands::Version { detailed } => commands::version::execute(*detailed),
        }
    }
}
