//! Thread types
//!
//! A thread is a remotely stored rich-text document addressed by an opaque
//! id. The client only ever observes snapshots; nothing is cached locally
//! beyond the lifetime of a single operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A full thread snapshot: metadata plus the raw html body and the sections
/// discovered inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    /// Opaque id, immutable once created
    pub id: String,
    pub title: String,
    /// Shareable URL on the human-facing link host
    pub link: Option<String>,
    pub updated: Option<DateTime<Utc>>,
    /// Raw body markup as returned by the service
    pub html: String,
    /// Sections in body order, discovered by scanning `html`
    pub sections: Vec<Section>,
}

impl Thread {
    /// Section ids in body order
    pub fn section_ids(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.id.as_str()).collect()
    }

    /// Whether the body declares the given section id
    pub fn has_section(&self, section_id: &str) -> bool {
        self.sections.iter().any(|s| s.id == section_id)
    }
}

/// An addressable sub-element of a thread body.
///
/// `start..end` is the byte span of the tag that declared the section id,
/// within [`Thread::html`]. Sections are not independently persisted; they
/// exist only as long as the snapshot they were scanned from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section id, unique within its thread
    pub id: String,
    /// Byte offset of the declaring tag within the body
    pub start: usize,
    /// Byte offset one past the declaring tag
    pub end: usize,
}

impl Section {
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Thread metadata without the body, as returned by search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub id: String,
    pub title: String,
    pub link: Option<String>,
    pub updated: Option<DateTime<Utc>>,
}
