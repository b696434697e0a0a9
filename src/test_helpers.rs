//! Shared test utilities for the site-scaffold test suite.
//!
//! Builds synthetic trees in temp directories and pulls links back out of
//! generated listings, so tests can assert on link sets instead of markup.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = make_tree(&["a/b/c.txt", "d.html"]);
//! // ... run a generator over tmp.path() ...
//! let links = listing_links(&tmp.path().join("a/index.html"));
//! assert_eq!(links, vec!["b/index.html"]);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Tree setup
// =========================================================================

/// Create a temp directory containing the given files.
///
/// Each entry is a root-relative, slash-separated file path; parent
/// directories are created as needed and each file's content is its path.
pub fn make_tree(files: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for rel in files {
        let path = tmp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, rel).unwrap();
    }
    tmp
}

/// Restores a directory's permissions when dropped, so `TempDir` can clean up.
#[cfg(unix)]
pub struct PermissionGuard {
    path: PathBuf,
}

#[cfg(unix)]
impl Drop for PermissionGuard {
    fn drop(&mut self) {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o755));
    }
}

/// Remove all permissions from a directory until the guard drops.
#[cfg(unix)]
pub fn lock_dir(path: &Path) -> PermissionGuard {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
    PermissionGuard {
        path: path.to_path_buf(),
    }
}

// =========================================================================
// Listing inspection
// =========================================================================

/// All `href` values inside the listing's `<ul class="entries">`, in order.
pub fn listing_links(listing: &Path) -> Vec<String> {
    let html = fs::read_to_string(listing)
        .unwrap_or_else(|e| panic!("listing {} not readable: {e}", listing.display()));
    entry_hrefs(&html)
}

/// Extract the entry hrefs from rendered listing markup.
pub fn entry_hrefs(html: &str) -> Vec<String> {
    let start = html
        .find(r#"<ul class="entries">"#)
        .unwrap_or_else(|| panic!("no entry list in:\n{html}"));
    let end = start
        + html[start..]
            .find("</ul>")
            .unwrap_or_else(|| panic!("unterminated entry list in:\n{html}"));

    html[start..end]
        .split(r#"href=""#)
        .skip(1)
        .map(|rest| rest.split('"').next().unwrap_or_default().to_string())
        .collect()
}

/// Every listing document under `root`, as sorted root-relative slash paths.
pub fn listing_paths(root: &Path, listing_filename: &str) -> Vec<String> {
    let mut found = Vec::new();
    collect_named(root, root, listing_filename, &mut found);
    found.sort();
    found
}

fn collect_named(root: &Path, dir: &Path, name: &str, found: &mut Vec<String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect_named(root, &path, name, found);
        } else if path.file_name().is_some_and(|n| n == name) {
            let rel = path.strip_prefix(root).unwrap();
            let parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect();
            found.push(parts.join("/"));
        }
    }
}
