//! Edit request types
//!
//! An [`EditRequest`] describes a mutation against a thread body. Validation
//! happens locally before any request is issued; a section-targeted mode
//! without a section id is rejected without a round trip.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ThreadLoomError};

/// Where the content fragment lands relative to the thread body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Append to the end of the body
    Append,
    /// Prepend to the start of the body
    Prepend,
    /// Insert immediately after the target section
    AfterSection,
    /// Insert immediately before the target section
    BeforeSection,
    /// Replace the target section
    ReplaceSection,
    /// Delete the target section; content is ignored
    DeleteSection,
}

impl EditMode {
    /// Numeric location code on the wire
    pub fn wire_code(self) -> u8 {
        match self {
            Self::Append => 0,
            Self::Prepend => 1,
            Self::AfterSection => 2,
            Self::BeforeSection => 3,
            Self::ReplaceSection => 4,
            Self::DeleteSection => 5,
        }
    }

    /// Whether this mode addresses an existing section
    pub fn requires_section_id(self) -> bool {
        matches!(
            self,
            Self::AfterSection | Self::BeforeSection | Self::ReplaceSection | Self::DeleteSection
        )
    }

    /// Whether this mode carries a content fragment
    pub fn requires_content(self) -> bool {
        !matches!(self, Self::DeleteSection)
    }
}

/// A described mutation against a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditRequest {
    /// Target thread id
    pub thread_id: String,
    /// Markup fragment to insert; ignored (and optional) for delete-section
    pub content: Option<String>,
    pub mode: EditMode,
    /// Target section id; required by section-targeted modes
    pub section_id: Option<String>,
}

impl EditRequest {
    /// Append a fragment to the end of a thread body.
    pub fn append(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            content: Some(content.into()),
            mode: EditMode::Append,
            section_id: None,
        }
    }

    /// Prepend a fragment to the start of a thread body.
    pub fn prepend(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            content: Some(content.into()),
            mode: EditMode::Prepend,
            section_id: None,
        }
    }

    /// Target an existing section with the given mode.
    pub fn at_section(
        thread_id: impl Into<String>,
        mode: EditMode,
        section_id: impl Into<String>,
        content: Option<String>,
    ) -> Self {
        Self {
            thread_id: thread_id.into(),
            content,
            mode,
            section_id: Some(section_id.into()),
        }
    }

    /// Validate the request locally.
    ///
    /// # Errors
    /// Returns `ThreadLoomError::InvalidRequest` if:
    /// - the thread id is empty
    /// - a section-targeted mode has no section id
    /// - a content-carrying mode has no content
    pub fn validate(&self) -> Result<()> {
        if self.thread_id.is_empty() {
            return Err(ThreadLoomError::InvalidRequest("thread id is empty".into()));
        }
        if self.mode.requires_section_id()
            && self.section_id.as_deref().map_or(true, str::is_empty)
        {
            return Err(ThreadLoomError::InvalidRequest(format!(
                "edit mode {:?} requires a section id (thread {})",
                self.mode, self.thread_id
            )));
        }
        if self.mode.requires_content() && self.content.as_deref().map_or(true, str::is_empty) {
            return Err(ThreadLoomError::InvalidRequest(format!(
                "edit mode {:?} requires content (thread {})",
                self.mode, self.thread_id
            )));
        }
        Ok(())
    }
}
