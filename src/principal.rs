//! Player identities and the permission view the core needs of them.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable player identity (the platform UUID string). Also the document key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Anything that can own or view a BigInv.
///
/// Permission checks are answered by the platform's authorization backend;
/// the core only asks yes/no questions about named nodes.
pub trait Principal {
    fn id(&self) -> &PlayerId;

    /// Display name, used in view titles and log lines
    fn name(&self) -> &str;

    fn has_permission(&self, node: &str) -> bool;
}

/// A point-in-time snapshot of a player and the permission nodes they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    permissions: HashSet<String>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            permissions: HashSet::new(),
        }
    }

    /// Grant a permission node (builder style)
    pub fn with_permission(mut self, node: impl Into<String>) -> Self {
        self.permissions.insert(node.into());
        self
    }

    pub fn grant(&mut self, node: impl Into<String>) {
        self.permissions.insert(node.into());
    }

    pub fn revoke(&mut self, node: &str) {
        self.permissions.remove(node);
    }
}

impl Principal for Player {
    fn id(&self) -> &PlayerId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, node: &str) -> bool {
        self.permissions.contains(node)
    }
}
