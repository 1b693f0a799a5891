//! Inline Scanning
//!
//! Splits one line into [`InlineSpan`]s. At each cursor position every
//! [`Matcher`] reports its leftmost match in the remaining text; the match
//! with the smallest start offset wins, and on equal offsets the matcher
//! listed first in [`Matcher::PRIORITY`] wins.

use super::InlineSpan;

/// Inline pattern kinds, consulted in priority order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Matcher {
    /// `` `code` ``
    InlineCode,
    /// `**bold**`
    Bold,
    /// `[label](href)`
    Link,
}

/// A matched piece of markup within the remaining text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineMatch {
    /// Byte offset of the opening delimiter
    pub start: usize,
    /// Byte offset just past the closing delimiter
    pub end: usize,
    /// The typed span for the match
    pub span: InlineSpan,
}

impl Matcher {
    /// Tie-break order for matches starting at the same offset
    pub const PRIORITY: [Matcher; 3] = [Matcher::InlineCode, Matcher::Bold, Matcher::Link];

    /// Find this matcher's leftmost match in `text`
    #[must_use]
    pub fn find(self, text: &str) -> Option<InlineMatch> {
        match self {
            Self::InlineCode => find_code(text),
            Self::Bold => find_bold(text),
            Self::Link => find_link(text),
        }
    }
}

/// Earliest match across all matchers, priority breaking ties
#[must_use]
pub fn earliest_match(text: &str) -> Option<InlineMatch> {
    let mut best: Option<InlineMatch> = None;
    for matcher in Matcher::PRIORITY {
        if let Some(found) = matcher.find(text) {
            let better = match &best {
                Some(b) => found.start < b.start,
                None => true,
            };
            if better {
                best = Some(found);
            }
        }
    }
    best
}

/// Parse one line into spans
///
/// Text before each match becomes [`InlineSpan::PlainText`]; what is left
/// after the last match becomes a trailing plain span. Empty plain spans are
/// never emitted.
#[must_use]
pub fn parse_inline(line: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut rest = line;

    while !rest.is_empty() {
        let Some(found) = earliest_match(rest) else {
            spans.push(InlineSpan::PlainText(rest.to_string()));
            break;
        };
        if found.start > 0 {
            spans.push(InlineSpan::PlainText(rest[..found.start].to_string()));
        }
        spans.push(found.span);
        rest = &rest[found.end..];
    }

    spans
}

/// Offsets where `delim` begins, overlapping occurrences included
fn starts_of<'a>(text: &'a str, delim: &'a str) -> impl Iterator<Item = usize> + 'a {
    text.char_indices()
        .map(|(i, _)| i)
        .filter(move |&i| text[i..].starts_with(delim))
}

/// `` ` `` + one or more non-backticks + `` ` ``
fn find_code(text: &str) -> Option<InlineMatch> {
    for start in starts_of(text, "`") {
        let body = start + 1;
        let close = body + text[body..].find('`')?;
        if close > body {
            return Some(InlineMatch {
                start,
                end: close + 1,
                span: InlineSpan::InlineCode(text[body..close].to_string()),
            });
        }
    }
    None
}

/// `**` + one or more non-asterisks + `**`
fn find_bold(text: &str) -> Option<InlineMatch> {
    for start in starts_of(text, "**") {
        let body = start + 2;
        let Some(offset) = text[body..].find('*') else {
            // No asterisk after this point, so no later start can close either
            return None;
        };
        let close = body + offset;
        if close > body && text[close..].starts_with("**") {
            return Some(InlineMatch {
                start,
                end: close + 2,
                span: InlineSpan::Bold(text[body..close].to_string()),
            });
        }
    }
    None
}

/// `[` + one or more non-`]` + `](` + one or more non-`)` + `)`
fn find_link(text: &str) -> Option<InlineMatch> {
    for start in starts_of(text, "[") {
        let label_start = start + 1;
        let label_end = label_start + text[label_start..].find(']')?;
        if label_end == label_start || !text[label_end..].starts_with("](") {
            continue;
        }
        let href_start = label_end + 2;
        let Some(offset) = text[href_start..].find(')') else {
            continue;
        };
        let href_end = href_start + offset;
        if href_end == href_start {
            continue;
        }
        return Some(InlineMatch {
            start,
            end: href_end + 1,
            span: InlineSpan::Link {
                label: text[label_start..label_end].to_string(),
                href: text[href_start..href_end].to_string(),
            },
        });
    }
    None
}
