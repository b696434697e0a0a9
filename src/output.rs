//! CLI output formatting.
//!
//! Each report has a `format_*` function returning lines (pure, no I/O, easy
//! to test) and a `print_*` wrapper that writes them to stdout. Warnings about
//! individual directories are logged as they happen; these reports are the
//! end-of-run inventory.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! Listings
//!     3 written
//!     1 failed
//!         a/index.html: Is a directory (os error 21)
//!
//! Headers
//!     _headers (5 rules)
//!
//! Skipped (unreadable)
//!     locked/
//!
//! Skipped (non-UTF-8 name)
//!     docs/caf�.txt
//! ```
//!
//! ## Check
//!
//! ```text
//! Listings
//!     index.html
//!     a/index.html
//!
//! Headers
//!     /d.html → text/html
//!     /index.html → text/html
//! ```

use crate::pipeline::{Plan, RunSummary};
use crate::walk::Skipped;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Display `path` relative to `root` with forward slashes, falling back to the full path.
fn display_rel(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Run summary
// ============================================================================

/// Format the end-of-run report.
pub fn format_run_summary(summary: &RunSummary, root: &Path, listings_ran: bool) -> Vec<String> {
    let mut lines = Vec::new();

    if listings_ran {
        lines.push("Listings".to_string());
        lines.push(format!("{}{} written", indent(1), summary.listings_written.len()));
        if !summary.listing_failures.is_empty() {
            lines.push(format!(
                "{}{} failed",
                indent(1),
                summary.listing_failures.len()
            ));
            for failure in &summary.listing_failures {
                let reason = std::error::Error::source(failure)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| failure.to_string());
                lines.push(format!(
                    "{}{}: {}",
                    indent(2),
                    display_rel(failure.path(), root),
                    reason
                ));
            }
        }
    }

    if let Some((path, count)) = &summary.headers {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Headers".to_string());
        lines.push(format!(
            "{}{} ({})",
            indent(1),
            display_rel(path, root),
            plural(*count, "rule", "rules")
        ));
    }

    lines.extend(format_skipped(&summary.skipped, root));
    lines
}

/// Sections naming what the walk left out, each preceded by a blank line.
fn format_skipped(skipped: &Skipped, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    if !skipped.dirs.is_empty() {
        lines.push(String::new());
        lines.push("Skipped (unreadable)".to_string());
        for dir in &skipped.dirs {
            lines.push(format!("{}{}/", indent(1), display_rel(dir, root)));
        }
    }
    if !skipped.non_utf8.is_empty() {
        lines.push(String::new());
        lines.push("Skipped (non-UTF-8 name)".to_string());
        for path in &skipped.non_utf8 {
            lines.push(format!("{}{}", indent(1), display_rel(path, root)));
        }
    }
    lines
}

/// Print the end-of-run report to stdout.
pub fn print_run_summary(summary: &RunSummary, root: &Path, listings_ran: bool) {
    for line in format_run_summary(summary, root, listings_ran) {
        println!("{}", line);
    }
}

// ============================================================================
// Check (dry run)
// ============================================================================

/// Format the dry-run plan.
pub fn format_plan(plan: &Plan) -> Vec<String> {
    let mut lines = vec!["Listings".to_string()];
    for listing in &plan.listings {
        lines.push(format!("{}{}", indent(1), listing));
    }

    lines.push(String::new());
    lines.push("Headers".to_string());
    if plan.rules.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for rule in &plan.rules {
        lines.push(format!("{}{} → {}", indent(1), rule.path, rule.content_type));
    }

    lines.extend(format_skipped(&plan.skipped, &plan.root));
    lines
}

/// Print the dry-run plan to stdout.
pub fn print_plan(plan: &Plan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}
