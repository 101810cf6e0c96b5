//! Local cache management: top-level mounts and the cache file.
//!
//! None of these call a hook.

use clap::{Args, Subcommand};
use tfs_core::Session;
use tfs_types::Result;

use super::CommandOutput;

#[derive(Debug, Subcommand)]
pub enum CacheCommands {
    /// Add a top-level name under the root.
    Mount(MountArgs),

    /// Drop a top-level name and everything cached below it.
    Unmount(MountArgs),

    /// Write the cache file now (persisted mode only).
    Save,
}

#[derive(Debug, Args)]
pub struct MountArgs {
    pub name: String,
}

impl CacheCommands {
    pub fn execute(&self, session: &mut Session) -> Result<CommandOutput> {
        match self {
            Self::Mount(args) => {
                session.mount(&args.name)?;
                Ok(CommandOutput::Message(format!("Mounted \"{}\" success", args.name)))
            }
            Self::Unmount(args) => {
                session.unmount(&args.name)?;
                Ok(CommandOutput::Message(format!("Unmounted \"{}\" success", args.name)))
            }
            Self::Save => {
                let file = session.save()?;
                Ok(CommandOutput::Message(format!("Saved cache to {}", file.display())))
            }
        }
    }
}
