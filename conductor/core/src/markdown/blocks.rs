//! Block-Level Scanning
//!
//! A single forward pass over lines, driven by [`BlockState`]. Each call to
//! [`BlockState::step`] consumes one line and hands back the blocks that line
//! completed, so no accumulator lives outside the state itself.

use super::inline::parse_inline;
use super::{Block, InlineSpan};

const FENCE: &str = "```";

/// Accumulation mode of the block scanner
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BlockState {
    /// Between blocks
    #[default]
    Normal,
    /// Inside a fenced code block
    InFence {
        /// Lines seen since the opening fence, verbatim
        lines: Vec<String>,
    },
    /// Collecting consecutive list items
    InList {
        /// Parsed items so far
        items: Vec<Vec<InlineSpan>>,
    },
}

/// How a line outside a fence is read
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Fence,
    Blank,
    ListItem(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.starts_with(FENCE) {
        return LineKind::Fence;
    }
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if let Some(item) = list_item(trimmed) {
        return LineKind::ListItem(item);
    }
    LineKind::Text(line)
}

/// `-` or `*`, then one whitespace character
fn list_item(trimmed: &str) -> Option<&str> {
    let rest = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('*'))?;
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => Some(chars.as_str()),
        _ => None,
    }
}

impl BlockState {
    /// Consume one line, returning the next state and any completed blocks
    #[must_use]
    pub fn step(self, line: &str) -> (Self, Vec<Block>) {
        match self {
            Self::InFence { mut lines } => {
                if line.trim().starts_with(FENCE) {
                    (Self::Normal, vec![code_block(lines)])
                } else {
                    lines.push(line.to_string());
                    (Self::InFence { lines }, Vec::new())
                }
            }
            Self::InList { mut items } => match classify(line) {
                LineKind::ListItem(item) => {
                    items.push(parse_inline(item));
                    (Self::InList { items }, Vec::new())
                }
                other => {
                    let (next, mut flushed) = Self::enter(other);
                    flushed.insert(0, list_block(items));
                    (next, flushed)
                }
            },
            Self::Normal => Self::enter(classify(line)),
        }
    }

    /// Flush whatever is still open at end of input
    #[must_use]
    pub fn finish(self) -> Option<Block> {
        match self {
            Self::Normal => None,
            Self::InFence { lines } => Some(code_block(lines)),
            Self::InList { items } => Some(list_block(items)),
        }
    }

    /// Transition out of `Normal` for a classified line
    fn enter(kind: LineKind<'_>) -> (Self, Vec<Block>) {
        match kind {
            LineKind::Fence => (Self::InFence { lines: Vec::new() }, Vec::new()),
            LineKind::Blank => (Self::Normal, Vec::new()),
            LineKind::ListItem(item) => (
                Self::InList {
                    items: vec![parse_inline(item)],
                },
                Vec::new(),
            ),
            LineKind::Text(text) => (
                Self::Normal,
                vec![Block::Paragraph {
                    inline: parse_inline(text),
                }],
            ),
        }
    }
}

fn code_block(lines: Vec<String>) -> Block {
    let mut raw = String::new();
    for line in lines {
        raw.push_str(&line);
        raw.push('\n');
    }
    Block::CodeBlock { raw }
}

fn list_block(items: Vec<Vec<InlineSpan>>) -> Block {
    Block::List {
        items,
        ordered: false,
    }
}
