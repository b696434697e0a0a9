//! Top-down directory traversal with pruning.
//!
//! The walker yields one [`DirectoryNode`] per directory under the root,
//! parents before children, siblings in their listed order. Excluded
//! directory names are dropped from each node before it is yielded, so they
//! are never visited, listed, or ruled at any depth.
//!
//! ## Ordering
//!
//! Within a node, subdirectories and files are each sorted case-insensitively
//! (`apple`, `Banana`, `Cherry`), with the exact name as a tie-breaker so
//! names differing only by case still sort deterministically.
//!
//! ## Failures
//!
//! A directory that cannot be read (permissions, deleted mid-run) is logged
//! as a warning and skipped together with its subtree; the walk carries on
//! with the remaining directories. Entries whose names are not valid UTF-8
//! cannot be written into a listing or a header rule; they are left out and
//! recorded in [`Skipped::non_utf8`] so the run report can name them.
//! Symbolic links are never followed: a link appears as a file entry of the
//! directory that holds it.

use crate::exclusion::ExclusionSet;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Which files a node carries.
///
/// Listings hide the generated artifacts; header rules cover the listing
/// documents but not the header file itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Listing,
    HeaderRules,
}

/// One directory and its direct children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    /// Filesystem path of the directory.
    pub path: PathBuf,
    /// Path relative to the root; empty for the root itself.
    pub rel_path: PathBuf,
    /// Direct subdirectory names, sorted, excluded names removed.
    pub subdirs: Vec<String>,
    /// Direct file names, sorted, filtered for the walk's [`Selection`].
    pub files: Vec<String>,
}

impl DirectoryNode {
    /// Whether this node is the walk root.
    pub fn is_root(&self) -> bool {
        self.rel_path.as_os_str().is_empty()
    }

    /// Root-relative components as strings.
    pub fn components(&self) -> Vec<String> {
        self.rel_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect()
    }

    /// Display title: `/` for the root, else the slash-joined relative path.
    pub fn title(&self) -> String {
        if self.is_root() {
            "/".to_string()
        } else {
            self.components().join("/")
        }
    }
}

/// Case-insensitive name order, exact name as tie-breaker.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Paths a walk could not cover.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Skipped {
    /// Directories that could not be listed, subtrees included.
    pub dirs: Vec<PathBuf>,
    /// Entries left out because their names are not valid UTF-8.
    pub non_utf8: Vec<PathBuf>,
}

impl Skipped {
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.non_utf8.is_empty()
    }

    /// Fold another walk's skips into this one, sorted and deduplicated.
    pub fn merge(&mut self, other: Skipped) {
        self.dirs.extend(other.dirs);
        self.non_utf8.extend(other.non_utf8);
        self.dirs.sort();
        self.dirs.dedup();
        self.non_utf8.sort();
        self.non_utf8.dedup();
    }
}

/// Depth-first, top-down iterator over the directories under a root.
pub struct Walker<'a> {
    exclusions: &'a ExclusionSet,
    selection: Selection,
    pending: Vec<(PathBuf, PathBuf)>,
    skipped: Skipped,
}

impl<'a> Walker<'a> {
    pub fn new(root: &Path, exclusions: &'a ExclusionSet, selection: Selection) -> Self {
        Self {
            exclusions,
            selection,
            pending: vec![(root.to_path_buf(), PathBuf::new())],
            skipped: Skipped::default(),
        }
    }

    /// What the walk has had to leave out so far.
    pub fn skipped(&self) -> &Skipped {
        &self.skipped
    }

    /// Consume the walker, returning what it left out.
    pub fn into_skipped(self) -> Skipped {
        self.skipped
    }

    fn read_node(&mut self, path: &Path, rel_path: &Path) -> Result<DirectoryNode, walkdir::Error> {
        let mut subdirs = Vec::new();
        let mut files = Vec::new();

        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
        {
            let entry = match entry {
                Ok(entry) => entry,
                // Depth 0 means the directory itself could not be opened
                Err(e) if e.depth() == 0 => return Err(e),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                warn!(path = %entry.path().display(), "skipping non-UTF-8 file name");
                self.skipped.non_utf8.push(entry.path().to_path_buf());
                continue;
            };

            if entry.file_type().is_dir() {
                if !self.exclusions.is_excluded_dir(&name) {
                    subdirs.push(name);
                }
                continue;
            }

            let excluded = match self.selection {
                Selection::Listing => self.exclusions.is_listing_excluded(&name, entry.path()),
                Selection::HeaderRules => self.exclusions.is_rule_excluded(&name, entry.path()),
            };
            if !excluded {
                files.push(name);
            }
        }

        subdirs.sort_by(|a, b| compare_names(a, b));
        files.sort_by(|a, b| compare_names(a, b));

        Ok(DirectoryNode {
            path: path.to_path_buf(),
            rel_path: rel_path.to_path_buf(),
            subdirs,
            files,
        })
    }
}

impl Iterator for Walker<'_> {
    type Item = DirectoryNode;

    fn next(&mut self) -> Option<DirectoryNode> {
        while let Some((path, rel_path)) = self.pending.pop() {
            match self.read_node(&path, &rel_path) {
                Ok(node) => {
                    // Reverse so the first subdirectory is popped first
                    for name in node.subdirs.iter().rev() {
                        self.pending.push((path.join(name), rel_path.join(name)));
                    }
                    return Some(node);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot list directory, skipping");
                    self.skipped.dirs.push(path);
                }
            }
        }
        None
    }
}
