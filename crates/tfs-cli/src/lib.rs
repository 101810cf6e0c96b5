//! Interactive shell over the lazy tree cache.
//!
//! # Architecture
//!
//! - **[`commands`]** -- clap definitions of every shell command, grouped into
//!   navigation, edits and cache management, plus line parsing and dispatch.
//! - **[`output`]** -- table and JSON rendering of command results and errors.
//! - **[`connection`]** -- top-level flags, config overrides and backend
//!   selection.
//! - **[`repl`]** -- the prompt loop and one-shot execution.
//!
//! # Usage
//!
//! ```ignore
//! use tfs_cli::{repl, OutputFormat, Printer, ShellOptions};
//!
//! let options = ShellOptions::default();
//! let config = options.load_config()?;
//! let mut session = options.connect(config).await?;
//! let mut printer = Printer::stdout(OutputFormat::Table);
//! let stdin = tokio::io::BufReader::new(tokio::io::stdin());
//! repl::run(&mut session, stdin, &mut printer, true).await?;
//! ```

pub mod commands;
pub mod connection;
pub mod output;
pub mod repl;

pub use commands::{dispatch, CommandOutput, ShellCommand};
pub use connection::ShellOptions;
pub use output::{OutputFormat, OutputTable, Printer};
