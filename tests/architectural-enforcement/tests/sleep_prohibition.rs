//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the core library and the chat client MUST
//! NOT call sleep methods. Waiting happens on I/O, timers owned by a request
//! (`timeout_at`) or cancellation tokens.
//!
//! **Exceptions**: test code (`#[cfg(test)]` modules).

use std::path::Path;

use architectural_enforcement::{production_lines, rust_files, workspace_dir};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {}", violation);
        }

        eprintln!("\n✅ ACCEPTABLE:");
        eprintln!("  - Test code inside #[cfg(test)] modules");
        eprintln!("  - tokio::time::timeout_at() bound to a request deadline");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleep in polling loops");
        eprintln!("  - Sleep as poor man's synchronization");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Find all sleep() calls in production code
fn find_sleep_violations() -> Vec<String> {
    let mut violations = Vec::new();
    for dir in ["conductor/core/src", "conductor/chat/src"] {
        check_directory(&workspace_dir(dir), &mut violations);
    }
    violations
}

fn check_directory(dir: &Path, violations: &mut Vec<String>) {
    for path in rust_files(dir) {
        for (line_number, code) in production_lines(&path) {
            if code.contains("::sleep(") || code.contains(".sleep(") || code.contains(" sleep(")
            {
                violations.push(format!(
                    "{}:{} - {}",
                    path.display(),
                    line_number,
                    code.trim()
                ));
            }
        }
    }
}

#[test]
fn test_scanner_sees_source_files() {
    let files = rust_files(&workspace_dir("conductor/core/src"));
    assert!(
        files.iter().any(|p| p.ends_with("controller.rs")),
        "scanner should find the controller module"
    );
}
