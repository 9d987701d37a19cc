//! Wire-format envelopes
//!
//! Responses are structured objects for metadata, plus one field of raw
//! markup that gets scanned locally for section ids (the service returns no
//! structured section list). Timestamps travel as integer microseconds.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use threadloom_domain::{Folder, FolderEntry, FolderEntryKind, Thread, ThreadSummary};

use crate::sections::scan_sections;

/// Thread metadata as returned by the service.
#[derive(Debug, Deserialize)]
pub(crate) struct ThreadMeta {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub updated_usec: Option<i64>,
}

impl ThreadMeta {
    fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated_usec.and_then(DateTime::from_timestamp_micros)
    }

    pub fn into_summary(self) -> ThreadSummary {
        let updated = self.updated();
        ThreadSummary { id: self.id, title: self.title, link: self.link, updated }
    }
}

/// Envelope for a single thread: metadata plus the raw body.
#[derive(Debug, Deserialize)]
pub(crate) struct ThreadEnvelope {
    pub thread: ThreadMeta,
    #[serde(default)]
    pub html: String,
}

impl ThreadEnvelope {
    /// Build the domain snapshot, scanning the body for sections.
    pub fn into_thread(self) -> Thread {
        let updated = self.thread.updated();
        let sections = scan_sections(&self.html);
        Thread {
            id: self.thread.id,
            title: self.thread.title,
            link: self.thread.link,
            updated,
            html: self.html,
            sections,
        }
    }
}

/// Batch thread fetches come back keyed by id.
pub(crate) type ThreadBatch = HashMap<String, ThreadEnvelope>;

/// Search returns bodiless metadata only.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub threads: Vec<ThreadMeta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FolderMeta {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChildEntry {
    pub kind: FolderEntryKind,
    pub id: String,
    pub title: String,
}

/// Envelope for a folder and its direct children.
#[derive(Debug, Deserialize)]
pub(crate) struct FolderEnvelope {
    pub folder: FolderMeta,
    #[serde(default)]
    pub children: Vec<ChildEntry>,
}

impl FolderEnvelope {
    /// Build the domain snapshot, enforcing the at-most-once child
    /// invariant.
    pub fn into_folder(self) -> Folder {
        let children = self
            .children
            .into_iter()
            .map(|c| FolderEntry { kind: c.kind, id: c.id, title: c.title })
            .collect();
        Folder::from_parts(self.folder.id, self.folder.title, children)
    }
}
