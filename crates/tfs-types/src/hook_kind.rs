use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of backend operation slots a session can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    /// Fetch the attribute/child-name snapshot of one path.
    Open,
    /// Create a node.
    Add,
    /// Delete a node and everything below it.
    Remove,
    /// Rename a node.
    Update,
    /// Add a new attribute.
    AttrAdd,
    /// Delete an attribute.
    AttrRemove,
    /// Overwrite an existing attribute.
    AttrUpdate,
}

impl HookKind {
    pub const ALL: [HookKind; 7] = [
        HookKind::Open,
        HookKind::Add,
        HookKind::Remove,
        HookKind::Update,
        HookKind::AttrAdd,
        HookKind::AttrRemove,
        HookKind::AttrUpdate,
    ];

    /// Name of the slot as used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            HookKind::Open => "open",
            HookKind::Add => "add",
            HookKind::Remove => "remove",
            HookKind::Update => "update",
            HookKind::AttrAdd => "attr_add",
            HookKind::AttrRemove => "attr_remove",
            HookKind::AttrUpdate => "attr_update",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
