//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleep() calls in production code
//! - The markdown renderer depends on nothing but the standard library and serde
//! - The core library stays free of terminal concerns
//!
//! The helpers here locate the workspace and yield the production part of each
//! source file, i.e. everything before its `#[cfg(test)]` module.

use std::fs;
use std::path::{Path, PathBuf};

/// Workspace root, two levels above this package
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Resolve a workspace-relative directory, panicking if it is missing
pub fn workspace_dir(relative: &str) -> PathBuf {
    let path = workspace_root().join(relative);
    assert!(
        path.is_dir(),
        "expected directory {} to exist",
        path.display()
    );
    path
}

/// All `.rs` files under a directory
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Production lines of a source file as `(line_number, code)` pairs
///
/// Stops at the first `#[cfg(test)]`; line comments are stripped.
pub fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };

    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .map(|(idx, line)| {
            let code = line.split("//").next().unwrap_or(line);
            (idx + 1, code.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").is_file());
    }

    #[test]
    fn test_production_lines_stop_at_tests() {
        let path = workspace_dir("conductor/core/src").join("lib.rs");
        let lines = production_lines(&path);
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|(_, code)| !code.contains("#[cfg(test)]")));
    }
}
