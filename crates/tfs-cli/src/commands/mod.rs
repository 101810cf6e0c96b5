//! Shell command definitions and handlers.
//!
//! Commands are grouped by concern: [`navigate`] moves around and reads the
//! cache, [`edit`] writes through the hooks, [`cache`] manages mounts and the
//! cache file. [`shell::ShellCommand`] flattens the groups into one flat
//! command namespace.

pub mod cache;
pub mod edit;
pub mod navigate;
pub mod shell;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tfs_core::{Session, TreeEntry};
use tfs_types::{Result, TfsError};

pub use cache::CacheCommands;
pub use edit::EditCommands;
pub use navigate::NavigateCommands;
pub use shell::ShellCommand;

/// What a command hands back to the printer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Empty,
    Message(String),
    List(Vec<String>),
    Attributes(Vec<(String, String)>),
    Tree(Vec<TreeEntry>),
    /// The session should end.
    Exit,
}

/// One input line, parsed with clap.
#[derive(Debug, Parser)]
#[command(
    name = "tfs",
    no_binary_name = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Debug)]
pub enum ParsedLine {
    Blank,
    /// `-h`/`--help` output produced by clap.
    Usage(String),
    Command(ShellCommand),
}

/// Split a line on whitespace and parse it.
pub fn parse_line(line: &str) -> Result<ParsedLine> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some(first) = words.first() else {
        return Ok(ParsedLine::Blank);
    };
    match ShellLine::try_parse_from(words.iter().copied()) {
        Ok(parsed) => Ok(ParsedLine::Command(parsed.command)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Ok(ParsedLine::Usage(err.render().to_string()))
            }
            ErrorKind::InvalidSubcommand => Err(TfsError::NoSuchCommand(first.to_string())),
            _ => Err(TfsError::InvalidArgument(clap_message(&err))),
        },
    }
}

/// Parse and run one line against the session.
pub async fn dispatch(session: &mut Session, line: &str) -> Result<CommandOutput> {
    match parse_line(line)? {
        ParsedLine::Blank => Ok(CommandOutput::Empty),
        ParsedLine::Usage(text) => Ok(CommandOutput::Message(text.trim_end().to_string())),
        ParsedLine::Command(command) => {
            tracing::debug!(?command, "dispatch");
            command.execute(session).await
        }
    }
}

/// Top-level help listing every command.
pub fn help_text() -> String {
    ShellLine::command().render_help().to_string().trim_end().to_string()
}

fn clap_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tfs_core::TfsConfig;
    use tfs_hooks::{HookRegistry, MemTreeDb};

    use super::*;

    fn offline_session() -> (Session, Arc<MemTreeDb>) {
        let db = Arc::new(MemTreeDb::new());
        db.insert("/master/tableA/row1", [("type", "row")]);
        db.insert("/master/tableA/row2", [("type", "row"), ("owner", "ops")]);
        db.insert("/master/tableB", [("kind", "table")]);
        let config = TfsConfig {
            host: "db01".to_string(),
            mounts: vec!["master".to_string()],
            ..TfsConfig::default()
        };
        let session = Session::new(config, HookRegistry::bind(db.clone())).unwrap();
        (session, db)
    }

    #[test]
    fn test_parse_blank_and_unknown() {
        assert!(matches!(parse_line("   ").unwrap(), ParsedLine::Blank));
        match parse_line("frobnicate x") {
            Err(TfsError::NoSuchCommand(name)) => assert_eq!(name, "frobnicate"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_bad_arguments() {
        assert!(matches!(parse_line("get onlypath"), Err(TfsError::InvalidArgument(_))));
        assert!(matches!(parse_line("ls -z"), Err(TfsError::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_aliases() {
        for line in ["quit", "exit", "q"] {
            assert!(matches!(
                parse_line(line).unwrap(),
                ParsedLine::Command(ShellCommand::Quit)
            ));
        }
        assert!(matches!(
            parse_line("rename /master/a b").unwrap(),
            ParsedLine::Command(ShellCommand::Edit(EditCommands::Mv(_)))
        ));
    }

    #[test]
    fn test_subcommand_help_is_usage() {
        match parse_line("mkdir --help").unwrap() {
            ParsedLine::Usage(text) => assert!(text.contains("mkdir"), "{}", text),
            other => panic!("unexpected {:?}", other),
        }
        assert!(help_text().contains("refresh"));
    }

    #[tokio::test]
    async fn test_navigation_round_trip() {
        let (mut session, _db) = offline_session();
        assert_eq!(
            dispatch(&mut session, "ls /master").await.unwrap(),
            CommandOutput::List(vec!["tableA".to_string(), "tableB".to_string()])
        );
        assert_eq!(
            dispatch(&mut session, "cd /master/tableA").await.unwrap(),
            CommandOutput::Empty
        );
        assert_eq!(
            dispatch(&mut session, "pwd").await.unwrap(),
            CommandOutput::Message("/master/tableA".to_string())
        );
        assert_eq!(
            dispatch(&mut session, "ls").await.unwrap(),
            CommandOutput::List(vec!["row1".to_string(), "row2".to_string()])
        );
        dispatch(&mut session, "cd -").await.unwrap();
        assert_eq!(session.pwd(), "/");
        assert_eq!(dispatch(&mut session, "").await.unwrap(), CommandOutput::Empty);
    }

    #[tokio::test]
    async fn test_write_commands_reach_backend() {
        let (mut session, db) = offline_session();
        dispatch(&mut session, "mkdir /master/tableA/row3").await.unwrap();
        assert!(db.contains("/master/tableA/row3"));

        assert_eq!(
            dispatch(&mut session, "set /master/tableA/row3 type row").await.unwrap(),
            CommandOutput::Message("Set value \"row\" a new attribute \"type\"".to_string())
        );
        assert_eq!(db.attribute("/master/tableA/row3", "type").as_deref(), Some("row"));
        assert_eq!(
            dispatch(&mut session, "get /master/tableA/row3 type").await.unwrap(),
            CommandOutput::Message("row".to_string())
        );

        dispatch(&mut session, "mv /master/tableA/row3 row4").await.unwrap();
        assert!(db.contains("/master/tableA/row4"));
        dispatch(&mut session, "rm /master/tableA/row4").await.unwrap();
        assert!(!db.contains("/master/tableA/row4"));
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let (mut session, _db) = offline_session();
        assert!(matches!(
            dispatch(&mut session, "cd /master/nope").await,
            Err(TfsError::ObjectNotExists(_))
        ));
        assert!(matches!(
            dispatch(&mut session, "save").await,
            Err(TfsError::InvalidOperation(_))
        ));
        assert_eq!(dispatch(&mut session, "quit").await.unwrap(), CommandOutput::Exit);
    }
}
