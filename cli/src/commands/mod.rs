//! Command implementations

pub mod config;
pub mod delete;
pub mod start;
pub mod stop;
pub mod version;

use clap::Args;

/// Arguments for the delete command.
#[derive(Args, Default)]
pub struct DeleteArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}
