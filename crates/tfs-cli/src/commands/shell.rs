//! The flat command namespace of the shell.

use clap::Subcommand;
use tfs_core::Session;
use tfs_types::Result;

use super::cache::CacheCommands;
use super::edit::EditCommands;
use super::navigate::NavigateCommands;
use super::{help_text, CommandOutput};

#[derive(Debug, Subcommand)]
pub enum ShellCommand {
    #[command(flatten)]
    Navigate(NavigateCommands),

    #[command(flatten)]
    Edit(EditCommands),

    #[command(flatten)]
    Cache(CacheCommands),

    /// List the available commands.
    Help,

    /// Leave the shell.
    #[command(visible_aliases = ["exit", "q"])]
    Quit,
}

impl ShellCommand {
    pub async fn execute(&self, session: &mut Session) -> Result<CommandOutput> {
        match self {
            Self::Navigate(cmd) => cmd.execute(session).await,
            Self::Edit(cmd) => cmd.execute(session).await,
            Self::Cache(cmd) => cmd.execute(session),
            Self::Help => Ok(CommandOutput::Message(help_text())),
            Self::Quit => Ok(CommandOutput::Exit),
        }
    }
}
