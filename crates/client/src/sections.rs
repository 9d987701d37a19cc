//! Section discovery
//!
//! The service returns thread bodies as raw markup; the only way to address
//! a sub-range of a document is to scan that markup for elements carrying a
//! `data-section-id` attribute. This module is deliberately decoupled from
//! the HTTP layer so it can be tested against literal fixtures.

use once_cell::sync::Lazy;
use regex::Regex;
use threadloom_domain::Section;
use tracing::debug;

// Matches an opening tag that declares a section id, in either quote style.
// The span of the whole match is the byte range of the declaring tag.
static SECTION_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*?)?\sdata-section-id\s*=\s*(?:"([^"]*)"|'([^']*)')[^<>]*>"#,
    )
    .expect("section tag pattern is valid")
});

/// Scan a thread body for sections, in body order.
///
/// Returns one [`Section`] per declaring tag, with the byte span of that
/// tag. Section ids are unique within a document by contract; should the
/// service ever repeat one, the first occurrence wins and the rest are
/// dropped.
pub fn scan_sections(html: &str) -> Vec<Section> {
    let mut seen = std::collections::HashSet::new();
    let mut sections = Vec::new();

    for caps in SECTION_TAG.captures_iter(html) {
        let tag = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        let id = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        if id.is_empty() {
            continue;
        }
        if !seen.insert(id.to_string()) {
            debug!(section_id = %id, "duplicate section id in body, keeping first");
            continue;
        }
        sections.push(Section { id: id.to_string(), start: tag.start(), end: tag.end() });
    }

    sections
}
