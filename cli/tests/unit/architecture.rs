//! Structural tests for layer boundaries.
//!
//! These tests scan source files to verify that the domain, application and
//! infra layers only depend inward.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Read a file and strip comment lines to avoid false positives.
fn read_non_comment_lines(path: &Path) -> Vec<String> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    content
        .lines()
        .filter(|l| {
            let trimmed = l.trim();
            !trimmed.starts_with("//") && !trimmed.starts_with("/*") && !trimmed.starts_with('*')
        })
        .map(String::from)
        .collect()
}

/// Lines in `src/<layer>` that contain any of `forbidden`, stopping at the
/// first `#[cfg(test)]` in each file.
fn violations(layer: &str, forbidden: &[&str]) -> Vec<String> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(layer);
    let mut found = Vec::new();
    for file in collect_rs_files(&dir) {
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        for (i, line) in read_non_comment_lines(&file).iter().enumerate() {
            if line.contains("#[cfg(test)]") {
                break;
            }
            if let Some(pat) = forbidden.iter().find(|p| line.contains(*p)) {
                found.push(format!("{rel}:{}: uses `{pat}`", i + 1));
            }
        }
    }
    found
}

#[test]
fn domain_has_no_io_or_outer_layer_imports() {
    let found = violations(
        "domain",
        &[
            "crate::application",
            "crate::infra",
            "crate::commands",
            "crate::output",
            "tokio",
            "reqwest",
            "std::fs",
        ],
    );
    assert!(found.is_empty(), "domain layer violations:\n{}", found.join("\n"));
}

#[test]
fn application_does_not_reach_into_adapters() {
    let found = violations(
        "application",
        &["crate::infra", "crate::commands", "crate::output", "reqwest"],
    );
    assert!(
        found.is_empty(),
        "application layer violations:\n{}",
        found.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let found = violations("infra", &["crate::commands", "crate::output"]);
    assert!(found.is_empty(), "infra layer violations:\n{}", found.join("\n"));
}

#[test]
fn infra_has_no_print_macros() {
    let found = violations("infra", &["println!", "eprintln!", "print!("]);
    assert!(found.is_empty(), "infra prints directly:\n{}", found.join("\n"));
}

#[test]
fn commands_render_json_through_the_renderer() {
    let found = violations("commands", &["serde_json::", "json!("]);
    assert!(
        found.is_empty(),
        "inline JSON in command handlers:\n{}",
        found.join("\n")
    );
}
