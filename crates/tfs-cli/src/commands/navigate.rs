//! Read-side commands: listing, moving around, searching and refreshing.
//!
//! Listings only fetch the node they name. `tree` and `find` walk whatever is
//! already cached below it.

use clap::{Args, Subcommand};
use tfs_core::Session;
use tfs_types::Result;

use super::CommandOutput;

#[derive(Debug, Subcommand)]
pub enum NavigateCommands {
    /// List the children of a node.
    Ls(PathArg),

    /// Show the cached subtree of a node.
    Tree(PathArg),

    /// Change the working directory. No path goes to the root, `-` to the
    /// previous directory.
    Cd(PathArg),

    /// Print the working directory.
    Pwd,

    /// Find cached descendants whose name contains a pattern.
    Find(FindArgs),

    /// Drop cached data so the next access fetches it again.
    Refresh(PathArg),
}

#[derive(Debug, Args)]
pub struct PathArg {
    /// Absolute or relative path; the working directory when omitted.
    pub path: Option<String>,
}

#[derive(Debug, Args)]
pub struct FindArgs {
    /// Substring matched against node names.
    pub pattern: String,

    /// Where to search; the working directory when omitted.
    pub path: Option<String>,
}

impl NavigateCommands {
    pub async fn execute(&self, session: &mut Session) -> Result<CommandOutput> {
        match self {
            Self::Ls(args) => Ok(CommandOutput::List(session.ls(args.path.as_deref()).await?)),
            Self::Tree(args) => Ok(CommandOutput::Tree(
                session.tree_listing(args.path.as_deref()).await?,
            )),
            Self::Cd(args) => {
                session.cd(args.path.as_deref()).await?;
                Ok(CommandOutput::Empty)
            }
            Self::Pwd => Ok(CommandOutput::Message(session.pwd())),
            Self::Find(args) => Ok(CommandOutput::List(
                session.find(&args.pattern, args.path.as_deref()).await?,
            )),
            Self::Refresh(args) => {
                let refreshed = session.refresh(args.path.as_deref())?;
                Ok(CommandOutput::Message(format!("Refreshed \"{}\"", refreshed)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tfs_core::TfsConfig;
    use tfs_hooks::{HookRegistry, MemTreeDb};

    use super::*;
    use crate::commands::dispatch;

    fn session(db: Arc<MemTreeDb>) -> Session {
        let config = TfsConfig {
            mounts: vec!["master".to_string()],
            ..TfsConfig::default()
        };
        Session::new(config, HookRegistry::bind(db)).unwrap()
    }

    #[tokio::test]
    async fn test_tree_shows_cached_nodes_only() {
        let db = Arc::new(MemTreeDb::new());
        db.insert("/master/tableA/row1", [("type", "row")]);
        let mut session = session(db);

        let CommandOutput::Tree(entries) = dispatch(&mut session, "tree /master").await.unwrap() else {
            panic!("expected a tree");
        };
        let names: Vec<(usize, &str)> = entries.iter().map(|e| (e.depth, e.name.as_str())).collect();
        assert_eq!(names, vec![(0, "master"), (1, "tableA")]);

        dispatch(&mut session, "ls /master/tableA").await.unwrap();
        let CommandOutput::Tree(entries) = dispatch(&mut session, "tree /").await.unwrap() else {
            panic!("expected a tree");
        };
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/master", "/master/tableA", "/master/tableA/row1"]);
    }

    #[tokio::test]
    async fn test_refresh_refetches() {
        let db = Arc::new(MemTreeDb::new());
        db.insert("/master/tableA", [("kind", "table")]);
        let mut session = session(db.clone());

        dispatch(&mut session, "ls /master").await.unwrap();
        db.insert("/master/tableB", [("kind", "table")]);
        assert_eq!(
            dispatch(&mut session, "ls /master").await.unwrap(),
            CommandOutput::List(vec!["tableA".to_string()])
        );

        assert_eq!(
            dispatch(&mut session, "refresh /master").await.unwrap(),
            CommandOutput::Message("Refreshed \"/master\"".to_string())
        );
        assert_eq!(
            dispatch(&mut session, "ls /master").await.unwrap(),
            CommandOutput::List(vec!["tableA".to_string(), "tableB".to_string()])
        );
    }

    #[tokio::test]
    async fn test_find_matches_cached_names() {
        let db = Arc::new(MemTreeDb::new());
        db.insert("/master/tableA/row1", [("type", "row")]);
        db.insert("/master/tableA/row2", [("type", "row")]);
        let mut session = session(db);
        dispatch(&mut session, "ls /master/tableA").await.unwrap();

        assert_eq!(
            dispatch(&mut session, "find row /master").await.unwrap(),
            CommandOutput::List(vec![
                "/master/tableA/row1".to_string(),
                "/master/tableA/row2".to_string()
            ])
        );
    }
}
