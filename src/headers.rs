//! Header-rule file generation.
//!
//! Produces the `_headers` file consumed by the static host: one rule per
//! file under the root, pairing the file's URL path with a `Content-Type`.
//!
//! ```text
//! /a/b/c.txt
//!   Content-Type: text/plain
//!
//! /d.html
//!   Content-Type: text/html
//! ```
//!
//! Rules follow walk order (parents first, each directory's files in
//! case-insensitive order), so an unchanged tree always renders the same
//! bytes. Generated listing documents are included; the header file itself
//! and tool-owned paths are not.
//!
//! The format is line based, so control characters in a path (a newline in
//! a file name, say) are percent-encoded; every rule stays exactly two lines.
//!
//! Unlike listings, failing to write this file is fatal to the run: it is the
//! one artifact every deployment needs.

use crate::config::ScaffoldConfig;
use crate::exclusion::ExclusionSet;
use crate::walk::{Selection, Skipped, Walker};
use std::fmt::Write as _;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum HeadersError {
    #[error("cannot write header rules to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A URL path and the Content-Type served for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderRule {
    pub path: String,
    pub content_type: String,
}

/// Written instead of an empty file when the tree has no files.
pub const EMPTY_PLACEHOLDER: &str = "# No files found under the site root; no header rules generated.\n";

/// Rules for every eligible file, plus whatever the walk had to leave out.
pub fn collect_rules(
    root: &Path,
    config: &ScaffoldConfig,
    exclusions: &ExclusionSet,
) -> (Vec<HeaderRule>, Skipped) {
    let mut rules = Vec::new();
    let mut walker = Walker::new(root, exclusions, Selection::HeaderRules);
    for node in walker.by_ref() {
        let dir = node.components();
        for file in &node.files {
            rules.push(HeaderRule {
                path: url_path(&dir, file),
                content_type: config.content_type_for(file),
            });
        }
    }
    (rules, walker.into_skipped())
}

/// Root-relative URL path with a leading slash, control characters escaped.
pub fn url_path(dir: &[String], file: &str) -> String {
    let mut path = String::new();
    for part in dir.iter().map(String::as_str).chain([file]) {
        path.push('/');
        push_escaped(&mut path, part);
    }
    path
}

fn push_escaped(out: &mut String, segment: &str) {
    for c in segment.chars() {
        if c.is_control() {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{byte:02X}");
            }
        } else {
            out.push(c);
        }
    }
}

/// Render rules as blank-line separated blocks, or the placeholder when empty.
pub fn render_headers(rules: &[HeaderRule]) -> String {
    if rules.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }
    rules
        .iter()
        .map(|rule| format!("{}\n  Content-Type: {}\n", rule.path, rule.content_type))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write the header-rule file at the root, replacing any existing one.
pub fn write_headers(
    root: &Path,
    config: &ScaffoldConfig,
    rules: &[HeaderRule],
) -> Result<PathBuf, HeadersError> {
    let path = root.join(&config.headers_filename);
    info!(path = %path.display(), rules = rules.len(), "writing header rules");
    fs::write(&path, render_headers(rules)).map_err(|source| HeadersError::Write {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "wrote header rules");
    Ok(path)
}
