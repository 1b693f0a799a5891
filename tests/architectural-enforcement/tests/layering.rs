//! Integration Test: Layering Rules
//!
//! - The markdown renderer is self-contained: it imports only its own
//!   submodules, `serde` and `std`. No external markdown or regex crates.
//! - The core library has no terminal concerns: no terminal crates in its
//!   manifest, no ANSI escapes or stdout printing in its sources.

use std::fs;

use architectural_enforcement::{production_lines, rust_files, workspace_dir, workspace_root};

const RENDERER_ALLOWED_IMPORTS: &[&str] = &["super", "self", "crate", "serde", "std", "blocks", "inline"];

#[test]
fn test_renderer_imports_are_self_contained() {
    let mut violations = Vec::new();

    for path in rust_files(&workspace_dir("conductor/core/src/markdown")) {
        for (line_number, code) in production_lines(&path) {
            let code = code.trim();
            let Some(import) = code
                .strip_prefix("pub use ")
                .or_else(|| code.strip_prefix("use "))
            else {
                continue;
            };
            let root = import.split("::").next().unwrap_or(import).trim();
            if !RENDERER_ALLOWED_IMPORTS.contains(&root) {
                violations.push(format!("{}:{} - {}", path.display(), line_number, code));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "markdown renderer imports outside its allowed set:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_core_manifest_has_no_parser_or_terminal_crates() {
    let manifest = fs::read_to_string(workspace_root().join("conductor/core/Cargo.toml"))
        .expect("core manifest should be readable");

    for forbidden in [
        "pulldown-cmark",
        "comrak",
        "regex",
        "ratatui",
        "crossterm",
        "clap",
        "tracing-subscriber",
    ] {
        assert!(
            !manifest
                .lines()
                .any(|line| line.trim_start().starts_with(forbidden)),
            "core library must not depend on {forbidden}"
        );
    }
}

#[test]
fn test_core_sources_do_not_write_to_terminal() {
    let mut violations = Vec::new();

    for path in rust_files(&workspace_dir("conductor/core/src")) {
        for (line_number, code) in production_lines(&path) {
            if code.contains("println!") || code.contains("print!(") || code.contains("\\x1b") {
                violations.push(format!("{}:{} - {}", path.display(), line_number, code.trim()));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "core library writes to the terminal:\n{}",
        violations.join("\n")
    );
}
