//! Markdown-Lite Rendering
//!
//! Converts answer text written in a small markdown dialect into a document
//! tree that a display surface can map straight onto visual markup.
//!
//! # Supported Dialect
//!
//! - Fenced code blocks (```` ``` ````), content kept verbatim
//! - Unordered lists (`- item` / `* item`), one level only
//! - Inline code (`` `code` ``), bold (`**bold**`) and links (`[label](href)`)
//!
//! Anything else is plain text. Malformed markup never fails the render; it
//! simply stays literal.
//!
//! # Design Philosophy
//!
//! The renderer is a pure function over lines. Block structure is decided by
//! a three-state machine in [`blocks`], inline structure by an ordered list of
//! matchers in [`inline`]. Neither nests: code, bold and link contents are
//! stored as raw strings.
//!
//! ```
//! use perso_conductor_core::markdown::{render, Block, InlineSpan};
//!
//! let doc = render("Use `cargo` for **builds**");
//! assert_eq!(
//!     doc,
//!     vec![Block::Paragraph {
//!         inline: vec![
//!             InlineSpan::PlainText("Use ".to_string()),
//!             InlineSpan::InlineCode("cargo".to_string()),
//!             InlineSpan::PlainText(" for ".to_string()),
//!             InlineSpan::Bold("builds".to_string()),
//!         ],
//!     }]
//! );
//! ```

pub mod blocks;
pub mod inline;

use serde::{Deserialize, Serialize};

pub use blocks::BlockState;
pub use inline::{parse_inline, Matcher};

/// A rendered document: blocks in source order
pub type Document = Vec<Block>;

/// One structural unit of rendered text
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A single line of inline-parsed text
    Paragraph {
        /// Styled runs making up the line
        inline: Vec<InlineSpan>,
    },
    /// Consecutive list items
    List {
        /// One span sequence per item
        items: Vec<Vec<InlineSpan>>,
        /// Always `false`; ordered lists are not recognised
        ordered: bool,
    },
    /// Fenced code, verbatim
    CodeBlock {
        /// Every fenced line followed by `\n`
        raw: String,
    },
}

impl Block {
    /// Visible text of the block, list items separated by newlines
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Paragraph { inline } => spans_text(inline),
            Self::List { items, .. } => items
                .iter()
                .map(|item| spans_text(item))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::CodeBlock { raw } => raw.clone(),
        }
    }
}

/// One styled run of text within a paragraph or list item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum InlineSpan {
    /// Unstyled text
    PlainText(String),
    /// Text between single backticks
    InlineCode(String),
    /// Text between `**` pairs
    Bold(String),
    /// A `[label](href)` link
    Link {
        /// Visible link text
        label: String,
        /// Link target
        href: String,
    },
}

impl InlineSpan {
    /// The text a reader sees for this span (markers removed)
    #[must_use]
    pub fn visible_text(&self) -> &str {
        match self {
            Self::PlainText(text) | Self::InlineCode(text) | Self::Bold(text) => text,
            Self::Link { label, .. } => label,
        }
    }
}

fn spans_text(spans: &[InlineSpan]) -> String {
    spans.iter().map(InlineSpan::visible_text).collect()
}

/// Render markdown-lite text into a document tree
///
/// Total and side-effect free: every input produces a document, and the same
/// input always produces the same document.
#[must_use]
pub fn render(text: &str) -> Document {
    let mut document = Vec::new();
    let mut state = BlockState::Normal;

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let (next, flushed) = state.step(line);
        document.extend(flushed);
        state = next;
    }

    document.extend(state.finish());
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(text: &str) -> InlineSpan {
        InlineSpan::PlainText(text.to_string())
    }

    #[test]
    fn test_render_is_idempotent() {
        let input = "Intro **bold**\n- one\n- two `x`\n```\ncode\n```\n[a](b)";
        assert_eq!(render(input), render(input));
    }

    #[test]
    fn test_markup_free_line_is_single_plain_paragraph() {
        let doc = render("Perso.ai is a video dubbing service.");
        assert_eq!(
            doc,
            vec![Block::Paragraph {
                inline: vec![plain("Perso.ai is a video dubbing service.")]
            }]
        );
    }

    #[test]
    fn test_fence_integrity() {
        let doc = render("```\na\nb\n```");
        assert_eq!(
            doc,
            vec![Block::CodeBlock {
                raw: "a\nb\n".to_string()
            }]
        );
    }

    #[test]
    fn test_fence_ignores_info_string() {
        let doc = render("```rust\nfn main() {}\n```");
        assert_eq!(
            doc,
            vec![Block::CodeBlock {
                raw: "fn main() {}\n".to_string()
            }]
        );
    }

    #[test]
    fn test_fence_content_is_not_interpreted() {
        let doc = render("```\n- not a list\n**not bold**\n\n```");
        assert_eq!(
            doc,
            vec![Block::CodeBlock {
                raw: "- not a list\n**not bold**\n\n".to_string()
            }]
        );
    }

    #[test]
    fn test_unterminated_fence_still_emits_code_block() {
        let doc = render("before\n```\nleft open");
        assert_eq!(
            doc,
            vec![
                Block::Paragraph {
                    inline: vec![plain("before")]
                },
                Block::CodeBlock {
                    raw: "left open\n".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_list_grouping() {
        let doc = render("- x\n* y");
        assert_eq!(
            doc,
            vec![Block::List {
                items: vec![vec![plain("x")], vec![plain("y")]],
                ordered: false,
            }]
        );
    }

    #[test]
    fn test_blank_line_splits_lists() {
        let doc = render("- x\n\n* y");
        assert_eq!(
            doc,
            vec![
                Block::List {
                    items: vec![vec![plain("x")]],
                    ordered: false,
                },
                Block::List {
                    items: vec![vec![plain("y")]],
                    ordered: false,
                },
            ]
        );
    }

    #[test]
    fn test_fence_opening_flushes_list() {
        let doc = render("- item\n```\ncode\n```");
        assert_eq!(
            doc,
            vec![
                Block::List {
                    items: vec![vec![plain("item")]],
                    ordered: false,
                },
                Block::CodeBlock {
                    raw: "code\n".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_paragraph_after_list_flushes_list_first() {
        let doc = render("  - indented\nafter");
        assert_eq!(
            doc,
            vec![
                Block::List {
                    items: vec![vec![plain("indented")]],
                    ordered: false,
                },
                Block::Paragraph {
                    inline: vec![plain("after")]
                },
            ]
        );
    }

    #[test]
    fn test_list_items_are_inline_parsed() {
        let doc = render("- see [docs](https://p.ai/docs)");
        assert_eq!(
            doc,
            vec![Block::List {
                items: vec![vec![
                    plain("see "),
                    InlineSpan::Link {
                        label: "docs".to_string(),
                        href: "https://p.ai/docs".to_string(),
                    },
                ]],
                ordered: false,
            }]
        );
    }

    #[test]
    fn test_crlf_input() {
        let doc = render("- a\r\n- b\r\n");
        assert_eq!(
            doc,
            vec![Block::List {
                items: vec![vec![plain("a")], vec![plain("b")]],
                ordered: false,
            }]
        );
    }

    #[test]
    fn test_empty_input_renders_nothing() {
        assert!(render("").is_empty());
        assert!(render("\n   \n\t\n").is_empty());
    }

    #[test]
    fn test_plain_text_helpers() {
        let doc = render("**Perso** [site](https://p.ai)\n- a\n- `b`");
        assert_eq!(doc[0].plain_text(), "Perso site");
        assert_eq!(doc[1].plain_text(), "a\nb");
    }

    #[test]
    fn test_block_serializes_with_type_tag() {
        let block = Block::Paragraph {
            inline: vec![InlineSpan::Bold("hi".to_string())],
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "paragraph");
        assert_eq!(json["inline"][0]["kind"], "bold");
        assert_eq!(json["inline"][0]["value"], "hi");
    }
}
