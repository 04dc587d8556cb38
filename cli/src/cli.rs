//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Container runtimes in a local virtual machine
#[derive(Parser)]
#[command(
    name = "berth",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log lifecycle stages to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the VM and its container runtimes
    Start(commands::start::StartArgs),

    /// Stop container runtimes and the VM (preserves state)
    Stop,

    /// Remove the VM and host-side runtime files
    Delete(commands::DeleteArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            quiet,
            no_color,
            command,
            ..
        } = self;

        if let Command::Version { json } = command {
            commands::version::run(json);
            return Ok(());
        }

        let yes = matches!(&command, Command::Delete(args) if args.yes);
        let app = AppContext::new(&AppFlags {
            output: OutputFlags { no_color, quiet },
            behaviour: BehaviourFlags { yes },
        })?;

        match command {
            Command::Start(args) => commands::start::run(&args, &app).await,
            Command::Stop => commands::stop::run(&app).await,
            Command::Delete(args) => commands::delete::run(&args, &app).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version { .. } => Ok(()),
        }
    }
}
