//! Command line interface

pub mod commands;
pub mod notifier;
pub mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::api::RecordStore;
use crate::config::Config;
use crate::repository::Notifier;
use commands::{ActivityCommands, DealCommands};
pub use notifier::ConsoleNotifier;

#[derive(Parser, Debug)]
#[command(name = "crm-cli")]
#[command(version)]
#[command(about = "Query and update CRM activities and deals")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to <config dir>/crm-cli/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Print the request that would be sent without contacting the store
    #[arg(long, global = true)]
    pub dry: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tasks, calls and meetings
    Activities {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Sales pipeline deals
    Deals {
        #[command(subcommand)]
        command: DealCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Single-line JSON
    JsonCompact,
    Csv,
}

/// Shared state handed to command handlers
pub struct CommandContext {
    pub format: OutputFormat,
    pub dry: bool,
    pub config: Config,
    pub notifier: Arc<dyn Notifier>,
}

impl CommandContext {
    /// Build the configured store; only called when a command actually
    /// talks to it
    pub fn store(&self) -> Result<Arc<dyn RecordStore>> {
        self.config.build_store()
    }
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let ctx = CommandContext {
        format: cli.format,
        dry: cli.dry,
        config,
        notifier: Arc::new(ConsoleNotifier),
    };

    match cli.command {
        Commands::Activities { command } => {
            commands::activities::handle_activity_command(command, &ctx).await
        }
        Commands::Deals { command } => commands::deals::handle_deal_command(command, &ctx).await,
    }
}
