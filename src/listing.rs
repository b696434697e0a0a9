//! Listing document generation.
//!
//! Writes one listing document (`index.html` by default) into every
//! directory the walker yields. Each document is a small self-contained HTML5
//! page:
//!
//! ```text
//! / a / b                  ← breadcrumb; "/" links to the root listing
//! Index of a/b
//!   sub/                   → sub/index.html
//!   notes.txt              → notes.txt
//! ```
//!
//! Subdirectories come first, then files, each in the walker's
//! case-insensitive order. The listing never mentions itself, the header-rule
//! file, or anything in the exclusion set.
//!
//! ## HTML Generation
//!
//! Markup is built with [maud](https://maud.lambda.xyz/), so every name is
//! escaped on interpolation. Hrefs are additionally percent-encoded for the
//! characters that would otherwise end or corrupt a URL path segment.
//!
//! ## Failures
//!
//! A listing that cannot be written is logged and recorded in the
//! [`ListingReport`]; the remaining directories are still processed.

use crate::config::ScaffoldConfig;
use crate::exclusion::ExclusionSet;
use crate::walk::{DirectoryNode, Selection, Skipped, Walker};
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ListingError {
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ListingError {
    pub fn path(&self) -> &Path {
        match self {
            ListingError::Write { path, .. } => path,
        }
    }
}

/// Outcome of a listing pass over the tree.
#[derive(Debug, Default)]
pub struct ListingReport {
    /// Listing documents written, in walk order.
    pub written: Vec<PathBuf>,
    /// Listings that could not be written.
    pub failed: Vec<ListingError>,
    /// What the walker could not cover.
    pub skipped: Skipped,
}

const CSS: &str = include_str!("../static/listing.css");

/// Write a listing document into every directory under `root`.
pub fn generate_listings(
    root: &Path,
    config: &ScaffoldConfig,
    exclusions: &ExclusionSet,
) -> ListingReport {
    info!(root = %root.display(), "generating listings");
    let generated_at = config.listing.timestamp.then(Utc::now);

    let mut report = ListingReport::default();
    let mut walker = Walker::new(root, exclusions, Selection::Listing);
    for node in walker.by_ref() {
        match write_listing(&node, config, generated_at) {
            Ok(path) => report.written.push(path),
            Err(e) => {
                warn!(error = %e, "listing not written, continuing");
                report.failed.push(e);
            }
        }
    }
    report.skipped = walker.into_skipped();
    report
}

/// Render and write the listing for one directory, replacing any existing file.
pub fn write_listing(
    node: &DirectoryNode,
    config: &ScaffoldConfig,
    generated_at: Option<DateTime<Utc>>,
) -> Result<PathBuf, ListingError> {
    let path = node.path.join(&config.listing_filename);
    let markup = render_listing(node, config, generated_at);
    fs::write(&path, markup.into_string()).map_err(|source| ListingError::Write {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), "wrote listing");
    Ok(path)
}

/// Where a listing document lives, relative to the root, with forward slashes.
pub fn listing_rel_path(node: &DirectoryNode, config: &ScaffoldConfig) -> String {
    let mut parts = node.components();
    parts.push(config.listing_filename.clone());
    parts.join("/")
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the listing document for a directory.
pub fn render_listing(
    node: &DirectoryNode,
    config: &ScaffoldConfig,
    generated_at: Option<DateTime<Utc>>,
) -> Markup {
    let title = format!("Index of {}", node.title());
    let listing = &config.listing_filename;

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                @if config.listing.stylesheet {
                    style { (PreEscaped(CSS)) }
                }
            }
            body {
                @if config.listing.breadcrumbs {
                    (breadcrumb(node, listing))
                }
                h1 { (title) }
                ul.entries {
                    @for dir in &node.subdirs {
                        li.dir {
                            a href={ (encode_segment(dir)) "/" (encode_segment(listing)) } {
                                (dir) "/"
                            }
                        }
                    }
                    @for file in &node.files {
                        li.file {
                            a href=(encode_segment(file)) { (file) }
                        }
                    }
                }
                @if let Some(at) = generated_at {
                    p.generated { "Generated " (at.format("%Y-%m-%d %H:%M UTC")) }
                }
            }
        }
    }
}

/// Breadcrumb trail; the leading `/` always links to the root listing.
fn breadcrumb(node: &DirectoryNode, listing: &str) -> Markup {
    let parts = node.components();
    let depth = parts.len();

    html! {
        nav.breadcrumb {
            @if depth == 0 {
                span.current { "/" }
            } @else {
                a href={ (up(depth)) (encode_segment(listing)) } { "/" }
                @for (i, part) in parts.iter().enumerate() {
                    @if i > 0 { " / " } @else { " " }
                    @if i + 1 == depth {
                        span.current { (part) }
                    } @else {
                        a href={ (up(depth - 1 - i)) (encode_segment(listing)) } { (part) }
                    }
                }
            }
        }
    }
}

fn up(levels: usize) -> String {
    "../".repeat(levels)
}

/// Percent-encode the characters that break a relative URL path segment.
///
/// Everything else, non-ASCII included, is passed through; maud escapes the
/// result for the attribute.
pub fn encode_segment(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            ' ' | '"' | '#' | '%' | '<' | '>' | '?' | '\\' | '`' | '{' | '}' | '|' | '^' => {
                out.push_str(&format!("%{:02X}", c as u32));
            }
            c if c.is_ascii_control() => out.push_str(&format!("%{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use chrono::TimeZone;

    fn node(rel: &[&str], subdirs: &[&str], files: &[&str]) -> DirectoryNode {
        let rel_path: PathBuf = rel.iter().collect();
        DirectoryNode {
            path: Path::new("/site").join(&rel_path),
            rel_path,
            subdirs: subdirs.iter().map(|s| s.to_string()).collect(),
            files: files.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn render(node: &DirectoryNode) -> String {
        render_listing(node, &ScaffoldConfig::default(), None).into_string()
    }

    #[test]
    fn root_listing_title_is_slash() {
        let html = render(&node(&[], &[], &[]));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Index of /</title>"));
        assert!(html.contains("<h1>Index of /</h1>"));
    }

    #[test]
    fn nested_listing_title_is_relative_path() {
        let html = render(&node(&["a", "b"], &[], &[]));
        assert!(html.contains("<title>Index of a/b</title>"));
    }

    #[test]
    fn dirs_link_to_their_listing_then_files() {
        let html = render(&node(&[], &["sub"], &["a.txt"]));
        assert_eq!(entry_hrefs(&html), vec!["sub/index.html", "a.txt"]);
        assert!(html.contains(">sub/</a>"));
        assert!(html.contains(">a.txt</a>"));
    }

    #[test]
    fn custom_listing_filename_used_in_links() {
        let config = ScaffoldConfig {
            listing_filename: "listing.html".to_string(),
            ..Default::default()
        };
        let html = render_listing(&node(&["x"], &["sub"], &[]), &config, None).into_string();
        assert_eq!(entry_hrefs(&html), vec!["sub/listing.html"]);
        assert!(html.contains(r#"href="../listing.html""#));
    }

    #[test]
    fn names_are_escaped() {
        let html = render(&node(&[], &[], &["<script>alert('x')</script>.txt", "a&b.txt"]));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(">a&amp;b.txt</a>"));
    }

    #[test]
    fn hrefs_are_percent_encoded() {
        let html = render(&node(&[], &["my dir"], &["file #1?.txt"]));
        assert_eq!(
            entry_hrefs(&html),
            vec!["my%20dir/index.html", "file%20%231%3F.txt"]
        );
    }

    #[test]
    fn encode_segment_passes_plain_names() {
        assert_eq!(encode_segment("report-2024_v1.pdf"), "report-2024_v1.pdf");
        assert_eq!(encode_segment("café.txt"), "café.txt");
        assert_eq!(encode_segment("100%.txt"), "100%25.txt");
    }

    #[test]
    fn breadcrumb_root_links_to_top_listing() {
        let html = render(&node(&["a", "b"], &[], &[]));
        assert!(html.contains(r#"<a href="../../index.html">/</a>"#));
        assert!(html.contains(r#"<a href="../index.html">a</a>"#));
        assert!(html.contains(r#"<span class="current">b</span>"#));
    }

    #[test]
    fn breadcrumb_on_root_has_no_links() {
        let html = render(&node(&[], &[], &[]));
        assert!(html.contains(r#"<nav class="breadcrumb"><span class="current">/</span></nav>"#));
    }

    #[test]
    fn presentation_switches() {
        let mut config = ScaffoldConfig::default();
        config.listing.stylesheet = false;
        config.listing.breadcrumbs = false;
        let html = render_listing(&node(&["a"], &[], &[]), &config, None).into_string();
        assert!(!html.contains("<style>"));
        assert!(!html.contains("breadcrumb"));

        let html = render(&node(&["a"], &[], &[]));
        assert!(html.contains("<style>"));
        assert!(html.contains("breadcrumb"));
    }

    #[test]
    fn timestamp_footer_only_when_given() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let html = render_listing(&node(&[], &[], &[]), &ScaffoldConfig::default(), Some(at))
            .into_string();
        assert!(html.contains("Generated 2024-05-01 12:30 UTC"));

        assert!(!render(&node(&[], &[], &[])).contains("Generated"));
    }

    #[test]
    fn listing_rel_path_for_root_and_nested() {
        let config = ScaffoldConfig::default();
        assert_eq!(listing_rel_path(&node(&[], &[], &[]), &config), "index.html");
        assert_eq!(
            listing_rel_path(&node(&["a", "b"], &[], &[]), &config),
            "a/b/index.html"
        );
    }

    // =========================================================================
    // Tree generation
    // =========================================================================

    fn generate(root: &Path) -> ListingReport {
        let config = ScaffoldConfig::default();
        let exclusions = ExclusionSet::from_config(&config);
        generate_listings(root, &config, &exclusions)
    }

    #[test]
    fn every_directory_gets_a_listing() {
        let tmp = make_tree(&["a/b/c.txt", "d.html"]);
        let report = generate(tmp.path());

        assert_eq!(report.written.len(), 3);
        assert!(report.failed.is_empty());
        assert_eq!(
            listing_paths(tmp.path(), "index.html"),
            vec!["a/b/index.html", "a/index.html", "index.html"]
        );
        assert_eq!(
            listing_links(&tmp.path().join("index.html")),
            vec!["a/index.html", "d.html"]
        );
        assert_eq!(
            listing_links(&tmp.path().join("a/index.html")),
            vec!["b/index.html"]
        );
        assert_eq!(
            listing_links(&tmp.path().join("a/b/index.html")),
            vec!["c.txt"]
        );
    }

    #[test]
    fn excluded_dirs_get_no_listing_and_no_link() {
        let tmp = make_tree(&[".git/HEAD", "src/.git/config", "src/main.rs"]);
        generate(tmp.path());

        assert_eq!(
            listing_paths(tmp.path(), "index.html"),
            vec!["index.html", "src/index.html"]
        );
        assert_eq!(
            listing_links(&tmp.path().join("index.html")),
            vec!["src/index.html"]
        );
        assert_eq!(
            listing_links(&tmp.path().join("src/index.html")),
            vec!["main.rs"]
        );
    }

    #[test]
    fn existing_listing_and_headers_not_listed() {
        let tmp = make_tree(&["index.html", "_headers", "page.html"]);
        generate(tmp.path());
        assert_eq!(
            listing_links(&tmp.path().join("index.html")),
            vec!["page.html"]
        );
    }

    #[test]
    fn rerun_produces_identical_listings() {
        let tmp = make_tree(&["a/b/c.txt", "d.html", "Banana", "apple"]);
        generate(tmp.path());
        let first = fs::read_to_string(tmp.path().join("index.html")).unwrap();
        generate(tmp.path());
        let second = fs::read_to_string(tmp.path().join("index.html")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn siblings_listed_case_insensitively() {
        let tmp = make_tree(&["Banana", "apple", "Cherry"]);
        generate(tmp.path());
        assert_eq!(
            listing_links(&tmp.path().join("index.html")),
            vec!["apple", "Banana", "Cherry"]
        );
    }

    #[test]
    fn write_failure_does_not_stop_siblings() {
        let tmp = make_tree(&["a/x.txt", "b/y.txt"]);
        // A directory where the listing file should go makes the write fail
        fs::create_dir(tmp.path().join("a").join("index.html")).unwrap();

        let report = generate(tmp.path());

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path(), tmp.path().join("a").join("index.html"));
        assert!(tmp.path().join("b/index.html").is_file());
        assert!(tmp.path().join("index.html").is_file());
    }
}
