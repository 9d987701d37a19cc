//! Folder types
//!
//! Folders contain threads and other folders. The protocol does not prevent
//! folder cycles; traversal code must track visited ids.

use serde::{Deserialize, Serialize};

/// A folder snapshot with its direct children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub title: String,
    /// Direct children in service order, duplicates removed
    pub children: Vec<FolderEntry>,
}

impl Folder {
    /// Build a folder, enforcing the at-most-once child invariant.
    ///
    /// The service should never list a child twice, but the protocol does not
    /// guarantee it; later occurrences are dropped, order is preserved.
    pub fn from_parts(id: String, title: String, children: Vec<FolderEntry>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let children = children
            .into_iter()
            .filter(|c| seen.insert((c.kind, c.id.clone())))
            .collect();
        Self { id, title, children }
    }
}

/// What a folder child refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderEntryKind {
    Thread,
    Folder,
}

/// One direct child of a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub kind: FolderEntryKind,
    pub id: String,
    pub title: String,
}
