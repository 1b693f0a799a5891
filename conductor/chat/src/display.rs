//! Terminal Display
//!
//! Turns [`ConductorMessage`]s into text for stdout. The chat client is a
//! thin surface: everything it prints comes from a message.
//!
//! Styling uses plain ANSI escapes; with color disabled the same layout is
//! produced without them.

use perso_conductor_core::{
    Block, ConductorMessage, ConductorState, ErrorBanner, InlineSpan, Role, SourcesSummary, Turn,
};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const UNDERLINE: &str = "\x1b[4m";
const REVERSE: &str = "\x1b[7m";

fn fg(c: (u8, u8, u8)) -> String {
    format!("\x1b[38;2;{};{};{}m", c.0, c.1, c.2)
}

// Palette
const ACCENT: (u8, u8, u8) = (122, 162, 247);
const MUTED: (u8, u8, u8) = (86, 95, 137);
const CYAN: (u8, u8, u8) = (125, 207, 255);
const BORDER: (u8, u8, u8) = (59, 66, 97);
const ERROR: (u8, u8, u8) = (247, 118, 142);

/// Renders conductor output for a terminal
#[derive(Clone, Copy, Debug)]
pub struct Display {
    color: bool,
}

impl Display {
    /// Create a display, with or without ANSI styling
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn style(&self, codes: &str, text: &str) -> String {
        if self.color {
            format!("{codes}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Text to print for a message, if any
    pub fn message(&self, msg: &ConductorMessage) -> Option<String> {
        match msg {
            ConductorMessage::TurnAppended { turn } => match turn.role {
                // The user's own line is already on screen
                Role::User => None,
                Role::Assistant => Some(self.turn(turn)),
            },
            ConductorMessage::State {
                state: ConductorState::Sending,
            } => Some(self.style(&fg(MUTED), ConductorState::Sending.description())),
            ConductorMessage::State { .. } => None,
            ConductorMessage::ErrorBanner { banner } => Some(self.banner(banner)),
            ConductorMessage::ErrorDismissed => None,
            ConductorMessage::Cleared => Some(self.style(DIM, "Conversation cleared.")),
        }
    }

    /// Render one assistant turn with its header and sources line
    pub fn turn(&self, turn: &Turn) -> String {
        let mut out = String::new();

        let header = format!("Perso · {}", turn.display_time());
        out.push_str(&self.style(&format!("{BOLD}{}", fg(ACCENT)), &header));
        out.push('\n');

        match &turn.document {
            Some(document) => out.push_str(&self.document(document)),
            None => {
                out.push_str(&turn.content);
                out.push('\n');
            }
        }

        if let Some(summary) = SourcesSummary::new(&turn.sources, turn.confidence) {
            out.push_str(&self.style(&fg(MUTED), &summary.headline()));
            out.push('\n');
            for source in &turn.sources {
                out.push_str(&self.style(&fg(MUTED), &format!("  - {source}")));
                out.push('\n');
            }
        }

        out
    }

    /// Render a document tree, one line per paragraph or list item
    pub fn document(&self, document: &[Block]) -> String {
        let mut out = String::new();
        for block in document {
            match block {
                Block::Paragraph { inline } => {
                    out.push_str(&self.inline(inline));
                    out.push('\n');
                }
                Block::List { items, .. } => {
                    for item in items {
                        out.push_str("  • ");
                        out.push_str(&self.inline(item));
                        out.push('\n');
                    }
                }
                Block::CodeBlock { raw } => {
                    let bar = self.style(&fg(BORDER), "│");
                    for line in raw.lines() {
                        out.push_str(&format!("  {bar} {}\n", self.style(&fg(CYAN), line)));
                    }
                }
            }
        }
        out
    }

    /// Render inline spans
    pub fn inline(&self, spans: &[InlineSpan]) -> String {
        spans
            .iter()
            .map(|span| match span {
                InlineSpan::PlainText(text) => text.clone(),
                InlineSpan::InlineCode(code) => self.style(&format!("{REVERSE}{DIM}"), code),
                InlineSpan::Bold(text) => self.style(BOLD, text),
                InlineSpan::Link { label, href } => {
                    let label = self.style(&format!("{UNDERLINE}{}", fg(ACCENT)), label);
                    let href = self.style(&fg(MUTED), &format!("({href})"));
                    format!("{label} {href}")
                }
            })
            .collect()
    }

    /// Render the error banner
    pub fn banner(&self, banner: &ErrorBanner) -> String {
        let text = format!("! {}  (/dismiss to hide)", banner.message);
        self.style(&format!("{BOLD}{}", fg(ERROR)), &text)
    }

    /// Render the starter prompts for an empty conversation
    pub fn suggestions(&self, questions: &[&str]) -> String {
        let mut out = self.style(BOLD, "How can I help?");
        out.push('\n');
        for (i, question) in questions.iter().enumerate() {
            out.push_str(&format!("  {}. {question}\n", i + 1));
        }
        out.push_str(&self.style(&fg(MUTED), "Type a number to ask one, or your own question."));
        out
    }
}
