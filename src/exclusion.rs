//! Names and paths the walker and generators skip.
//!
//! Name-based exclusions come straight from [`ScaffoldConfig`]. Path-based
//! exclusions cover files that belong to the tool rather than the site (the
//! running executable, the config file passed with `--config`). Those paths
//! are canonicalized once when the set is resolved, so relative invocations
//! and symlinked launchers still match the file found during the walk.

use crate::config::ScaffoldConfig;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    dirs: BTreeSet<String>,
    files: BTreeSet<String>,
    listing_filename: String,
    headers_filename: String,
    paths: BTreeSet<PathBuf>,
}

impl ExclusionSet {
    /// Build the set from config plus tool-owned paths.
    ///
    /// Paths that cannot be canonicalized (not on disk) cannot be met during
    /// the walk either, so they are dropped.
    pub fn resolve<I, P>(config: &ScaffoldConfig, extra_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths = extra_paths
            .into_iter()
            .filter_map(|p| fs::canonicalize(p.as_ref()).ok())
            .collect();

        Self {
            dirs: config.excluded_dirs.iter().cloned().collect(),
            files: config.excluded_files.iter().cloned().collect(),
            listing_filename: config.listing_filename.clone(),
            headers_filename: config.headers_filename.clone(),
            paths,
        }
    }

    /// Name-only exclusions, for callers that do not own any paths in the tree.
    pub fn from_config(config: &ScaffoldConfig) -> Self {
        Self::resolve(config, std::iter::empty::<PathBuf>())
    }

    /// Whether a directory with this name is pruned from the walk.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.dirs.contains(name)
    }

    /// Whether a file is left out of its directory's listing.
    ///
    /// The listing document and the header file are always hidden, whatever
    /// `excluded_files` holds.
    pub fn is_listing_excluded(&self, name: &str, path: &Path) -> bool {
        name == self.listing_filename
            || name == self.headers_filename
            || self.files.contains(name)
            || self.is_excluded_path(path)
    }

    /// Whether a file gets no header rule.
    ///
    /// Generated listing documents are served like any other page, so they
    /// keep their rules even though listings hide them.
    pub fn is_rule_excluded(&self, name: &str, path: &Path) -> bool {
        if name == self.headers_filename {
            return true;
        }
        if name != self.listing_filename && self.files.contains(name) {
            return true;
        }
        self.is_excluded_path(path)
    }

    fn is_excluded_path(&self, path: &Path) -> bool {
        if self.paths.is_empty() {
            return false;
        }
        fs::canonicalize(path)
            .map(|p| self.paths.contains(&p))
            .unwrap_or(false)
    }

    /// Canonical tool-owned paths, for reporting.
    pub fn excluded_paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}
