//! Commands that write through the hooks.
//!
//! Each one reaches the backend before the cache changes; a failed hook call
//! leaves the cache as it was.

use clap::{Args, Subcommand};
use tfs_core::{AttrWrite, Session};
use tfs_types::Result;

use super::CommandOutput;

#[derive(Debug, Subcommand)]
pub enum EditCommands {
    /// Create a node.
    Mkdir(MakeNode),

    /// Remove a node.
    Rm(RemoveNode),

    /// Rename a node in place.
    #[command(visible_alias = "rename")]
    Mv(RenameNode),

    /// Print one attribute value.
    Get(GetAttr),

    /// Add or overwrite an attribute.
    Set(SetAttr),

    /// Delete an attribute.
    Unset(UnsetAttr),

    /// List attributes whose key contains a pattern (`*` for all). With a
    /// value, sets that attribute instead.
    Stat(StatArgs),
}

#[derive(Debug, Args)]
pub struct MakeNode {
    /// Create missing parents one level at a time.
    #[arg(short = 'p', long = "parents")]
    pub parents: bool,

    pub path: String,
}

#[derive(Debug, Args)]
pub struct RemoveNode {
    /// Also remove a node that has children.
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    pub path: String,
}

#[derive(Debug, Args)]
pub struct RenameNode {
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    pub path: String,

    /// New last segment; the node keeps its parent.
    pub new_name: String,
}

#[derive(Debug, Args)]
pub struct GetAttr {
    pub path: String,
    pub key: String,
}

#[derive(Debug, Args)]
pub struct SetAttr {
    pub path: String,
    pub key: String,
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Debug, Args)]
pub struct UnsetAttr {
    pub path: String,
    pub key: String,
}

#[derive(Debug, Args)]
pub struct StatArgs {
    /// Node to inspect; the working directory when omitted.
    pub path: Option<String>,

    /// Key substring, or `*` for every attribute.
    pub pattern: Option<String>,

    #[arg(allow_hyphen_values = true)]
    pub value: Option<String>,
}

fn describe_write(write: AttrWrite, key: &str, value: &str) -> String {
    match write {
        AttrWrite::Added => format!("Set value \"{}\" a new attribute \"{}\"", value, key),
        AttrWrite::Updated => format!("Update attribute \"{}\" to value \"{}\"", key, value),
    }
}

impl EditCommands {
    pub async fn execute(&self, session: &mut Session) -> Result<CommandOutput> {
        match self {
            Self::Mkdir(args) => {
                session.mkdir(&args.path, args.parents).await?;
                Ok(CommandOutput::Empty)
            }
            Self::Rm(args) => {
                session.rm(&args.path, args.recursive).await?;
                Ok(CommandOutput::Empty)
            }
            Self::Mv(args) => {
                session.rename(&args.path, &args.new_name, args.recursive).await?;
                Ok(CommandOutput::Empty)
            }
            Self::Get(args) => Ok(CommandOutput::Message(session.get(&args.path, &args.key).await?)),
            Self::Set(args) => {
                let write = session.set(&args.path, &args.key, &args.value).await?;
                Ok(CommandOutput::Message(describe_write(write, &args.key, &args.value)))
            }
            Self::Unset(args) => {
                session.unset(&args.path, &args.key).await?;
                Ok(CommandOutput::Empty)
            }
            Self::Stat(args) => match (&args.pattern, &args.value) {
                (Some(key), Some(value)) => {
                    let path = args.path.as_deref().unwrap_or(".");
                    let write = session.set(path, key, value).await?;
                    Ok(CommandOutput::Message(describe_write(write, key, value)))
                }
                _ => Ok(CommandOutput::Attributes(
                    session.stat(args.path.as_deref(), args.pattern.as_deref()).await?,
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tfs_core::TfsConfig;
    use tfs_hooks::{HookRegistry, MemTreeDb, MockTreeDb};
    use tfs_types::{HookKind, TfsError};

    use super::*;
    use crate::commands::dispatch;

    fn session(hooks: HookRegistry) -> Session {
        let config = TfsConfig {
            mounts: vec!["master".to_string()],
            ..TfsConfig::default()
        };
        Session::new(config, hooks).unwrap()
    }

    #[tokio::test]
    async fn test_stat_filters_and_sets() {
        let db = Arc::new(MemTreeDb::new());
        db.insert("/master/t/r", [("type", "row"), ("owner", "ops"), ("row_id", "7")]);
        let mut session = session(HookRegistry::bind(db.clone()));

        assert_eq!(
            dispatch(&mut session, "stat /master/t/r row").await.unwrap(),
            CommandOutput::Attributes(vec![("row_id".to_string(), "7".to_string())])
        );
        let CommandOutput::Attributes(all) = dispatch(&mut session, "stat /master/t/r *").await.unwrap() else {
            panic!("expected attributes");
        };
        assert_eq!(all.len(), 3);

        assert_eq!(
            dispatch(&mut session, "stat /master/t/r owner dba").await.unwrap(),
            CommandOutput::Message("Update attribute \"owner\" to value \"dba\"".to_string())
        );
        assert_eq!(db.attribute("/master/t/r", "owner").as_deref(), Some("dba"));
    }

    #[tokio::test]
    async fn test_set_accepts_hyphen_value() {
        let db = Arc::new(MemTreeDb::new());
        db.insert("/master/t", [("kind", "table")]);
        let mut session = session(HookRegistry::bind(db.clone()));
        dispatch(&mut session, "set /master/t offset -5").await.unwrap();
        assert_eq!(db.attribute("/master/t", "offset").as_deref(), Some("-5"));
    }

    #[tokio::test]
    async fn test_failed_hook_reports_kind() {
        let mock = Arc::new(MockTreeDb::new());
        mock.on_open(|call| {
            let children: Vec<&str> = if call.real_path == "/master" { vec!["t"] } else { vec![] };
            Ok(tfs_hooks::NodeSnapshot::new([("kind", "table")], children))
        });
        mock.on_remove(|_| Err(tfs_hooks::HookError::new("locked")));
        let mut session = session(HookRegistry::bind(mock.clone()));

        match dispatch(&mut session, "rm /master/t").await {
            Err(TfsError::HookMethodExec { hook, detail }) => {
                assert_eq!(hook, HookKind::Remove);
                assert_eq!(detail, "locked");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            dispatch(&mut session, "ls /master").await.unwrap(),
            CommandOutput::List(vec!["t".to_string()])
        );
    }

    #[tokio::test]
    async fn test_recursive_rename_not_implemented() {
        let db = Arc::new(MemTreeDb::new());
        db.insert("/master/t", [("kind", "table")]);
        let mut session = session(HookRegistry::bind(db));
        assert!(matches!(
            dispatch(&mut session, "mv -r /master/t u").await,
            Err(TfsError::NotImplemented(_))
        ));
    }
}
