//! Run orchestration: validate the root, then run the requested stages.
//!
//! ```text
//! validate_root ──► listings (per directory) ──► header rules (one file)
//! ```
//!
//! Listings run first so that freshly generated listing documents are
//! covered by the header rules written afterwards. Per-directory problems
//! are collected into the [`RunSummary`]; only an invalid root or an
//! unwritable header file fails the run.

use crate::config::{ConfigError, ScaffoldConfig};
use crate::exclusion::ExclusionSet;
use crate::headers::{self, HeaderRule, HeadersError};
use crate::listing::{self, ListingError};
use crate::walk::{Selection, Skipped, Walker, compare_names};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("root directory not found: {0}")]
    RootNotFound(PathBuf),
    #[error("root is not a directory: {0}")]
    RootNotDirectory(PathBuf),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Headers(#[from] HeadersError),
}

/// Which artifacts a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub listings: bool,
    pub headers: bool,
}

impl Stages {
    pub const ALL: Stages = Stages {
        listings: true,
        headers: true,
    };
    pub const LISTINGS: Stages = Stages {
        listings: true,
        headers: false,
    };
    pub const HEADERS: Stages = Stages {
        listings: false,
        headers: true,
    };
}

/// What a run did.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub listings_written: Vec<PathBuf>,
    pub listing_failures: Vec<ListingError>,
    /// Header file path and rule count, when the header stage ran.
    pub headers: Option<(PathBuf, usize)>,
    /// Unreadable directories and non-UTF-8 names, across both stages.
    pub skipped: Skipped,
}

/// Canonicalize the root and make sure it is a directory.
pub fn validate_root(root: &Path) -> Result<PathBuf, SiteError> {
    let canonical =
        fs::canonicalize(root).map_err(|_| SiteError::RootNotFound(root.to_path_buf()))?;
    if !canonical.is_dir() {
        return Err(SiteError::RootNotDirectory(canonical));
    }
    Ok(canonical)
}

/// Generate the requested artifacts under `root`.
pub fn run(
    root: &Path,
    config: &ScaffoldConfig,
    exclusions: &ExclusionSet,
    stages: Stages,
) -> Result<RunSummary, SiteError> {
    let root = validate_root(root)?;
    let mut summary = RunSummary::default();

    if stages.listings {
        let report = listing::generate_listings(&root, config, exclusions);
        summary.listings_written = report.written;
        summary.listing_failures = report.failed;
        summary.skipped.merge(report.skipped);
    }

    if stages.headers {
        let (rules, skipped) = headers::collect_rules(&root, config, exclusions);
        let path = headers::write_headers(&root, config, &rules)?;
        summary.headers = Some((path, rules.len()));
        summary.skipped.merge(skipped);
    }

    Ok(summary)
}

/// A dry run: what a full run would write, without writing anything.
#[derive(Debug, Serialize)]
pub struct Plan {
    pub root: PathBuf,
    /// Root-relative paths of the listing documents, in walk order.
    pub listings: Vec<String>,
    /// Header rules as they would be written.
    pub rules: Vec<HeaderRule>,
    pub skipped: Skipped,
}

/// Walk the tree and report the listings and rules a full run would produce.
///
/// Listing documents that do not exist yet are included in the rules, since
/// a full run writes them before collecting rules.
pub fn plan(
    root: &Path,
    config: &ScaffoldConfig,
    exclusions: &ExclusionSet,
) -> Result<Plan, SiteError> {
    let root = validate_root(root)?;
    let mut listings = Vec::new();
    let mut rules = Vec::new();

    let mut walker = Walker::new(&root, exclusions, Selection::HeaderRules);
    for node in walker.by_ref() {
        listings.push(listing::listing_rel_path(&node, config));

        let mut files = node.files.clone();
        if !files.contains(&config.listing_filename) {
            files.push(config.listing_filename.clone());
            files.sort_by(|a, b| compare_names(a, b));
        }
        let dir = node.components();
        for file in &files {
            rules.push(HeaderRule {
                path: headers::url_path(&dir, file),
                content_type: config.content_type_for(file),
            });
        }
    }

    Ok(Plan {
        root,
        listings,
        rules,
        skipped: walker.into_skipped(),
    })
}
