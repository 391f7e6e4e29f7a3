//! Rich-text cleanup for work item fields
//!
//! Work item descriptions and acceptance criteria arrive as loosely formed
//! HTML. Cleanup happens in three stages:
//!
//! 1. [`strip_html`] removes tags, decodes entities and normalizes whitespace
//!    into paragraphs separated by a blank line.
//! 2. [`normalize_headings`] drops blank lines and turns `#` headings into
//!    bold section labels.
//! 3. [`format_section`] indents the result for a given nesting depth,
//!    keeping bullet lists and quoting everything else.
//!
//! None of these fail. Empty input gives empty output, and entities that do
//! not decode to a valid character are left as they were.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Anything between angle brackets counts as markup
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Decimal character references (`&#233;`)
static NUMERIC_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(\d+);").unwrap());

/// One to six `#` followed by whitespace at the start of a line
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}\s+").unwrap());

/// Named entities, decoded in this order
const NAMED_ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

/// Removes markup and entities and normalizes paragraph whitespace
///
/// Paragraphs are separated by blank lines. Inside a paragraph every line
/// is trimmed and the lines are joined with a single space. Empty
/// paragraphs are dropped.
pub fn strip_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = text.replace("\r\n", "\n");
    let mut text = TAG_RE.replace_all(&text, "").into_owned();

    for (entity, replacement) in NAMED_ENTITIES {
        text = text.replace(entity, replacement);
    }

    let text = NUMERIC_ENTITY_RE.replace_all(&text, |caps: &Captures| {
        match caps[1].parse::<u32>().ok().and_then(char::from_u32) {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    });

    text.split("\n\n")
        .filter_map(|para| {
            let lines: Vec<&str> = para
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect();
            (!lines.is_empty()).then(|| lines.join(" "))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Drops blank lines and turns markdown headings into section labels
///
/// `## Scope` becomes `**Section: Scope**`. Horizontal rules, bullets and
/// plain lines pass through trimmed.
pub fn normalize_headings(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match HEADING_RE.find(line) {
            Some(marker) => format!("**Section: {}**", &line[marker.end()..]),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats cleaned content as indented document lines
///
/// A paragraph that opens with a bullet (`- ` or `* `) is emitted line by
/// line under `indent`. Any other paragraph becomes a blockquote. Each
/// paragraph is followed by one empty line.
pub fn format_section(content: &str, indent: &str) -> Vec<String> {
    if content.is_empty() {
        return Vec::new();
    }

    let content = normalize_headings(content);
    let mut lines = Vec::new();

    for para in content.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }

        if para.starts_with("- ") || para.starts_with("* ") {
            lines.extend(para.lines().map(|line| format!("{}{}", indent, line)));
        } else {
            lines.extend(
                para.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(|line| format!("{}> {}", indent, line)),
            );
        }
        lines.push(String::new());
    }

    lines
}
