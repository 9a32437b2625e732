//! Flat markdown section splitter.
//!
//! Partitions a document into an ordered sequence of (title, body) pairs at
//! heading boundaries. No hierarchy is tracked: a level-1 and a level-3
//! heading each simply open a new section. This keeps the section title
//! usable as retrieval metadata without committing to a header-path scheme.

use crate::document::Section;

/// Parse a heading line, returning its text with the markers stripped.
///
/// A line is a heading if, after trimming, it consists of one to six `#`
/// characters followed by whitespace and non-empty text.
fn parse_heading(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    let title = rest.trim_start();
    // No whitespace after the markers ("#foo") is not a heading.
    if title.is_empty() || title.len() == rest.len() {
        return None;
    }
    Some(title)
}

/// Split markdown content into flat sections at heading boundaries.
///
/// Lines before the first heading accumulate under the title
/// `"Introduction"`. Each titled section's body begins with its own heading
/// line. A section is emitted only if it accumulated at least one line, so a
/// document that starts directly with a heading has no Introduction section.
pub fn split_sections(content: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut title = "Introduction".to_string();
    let mut lines: Vec<&str> = Vec::new();

    for line in content.split('\n') {
        if let Some(heading) = parse_heading(line) {
            if !lines.is_empty() {
                sections.push(Section { title: title.clone(), body: lines.join("\n") });
            }
            title = heading.to_string();
            lines = vec![line];
        } else {
            lines.push(line);
        }
    }

    if !lines.is_empty() {
        sections.push(Section { title, body: lines.join("\n") });
    }

    sections
}
