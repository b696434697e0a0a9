//! # site-scaffold
//!
//! Prepares a static file tree for deployment: a browsable listing document
//! in every directory, and one `_headers` file at the root that tells the
//! host which files are HTML and which are served as plain text.
//!
//! # Architecture: Walk, Then Generate
//!
//! ```text
//! root/ ──► Walker ──► DirectoryNode ──► listing   → <dir>/index.html  (one per node)
//!                                   └──► headers   → root/_headers     (one per run)
//! ```
//!
//! A single top-down walk drives each generator. Each directory is handled
//! as soon as it is read; only the header rules are buffered until the end,
//! because they all land in one file.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `ScaffoldConfig`: names, exclusions, content types, TOML overlay |
//! | [`exclusion`] | Name and canonical-path exclusions resolved once per run |
//! | [`walk`] | Pruned, deterministic top-down traversal yielding `DirectoryNode`s |
//! | [`listing`] | Listing document rendering (Maud) and writing |
//! | [`headers`] | Header-rule collection, rendering and writing |
//! | [`pipeline`] | Root validation, stage selection, dry-run plan |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Explicit Configuration
//!
//! Exclusion sets and file names live in a [`config::ScaffoldConfig`] value
//! passed to every stage instead of module-level constants. Tests build their
//! own configs against temp trees; the CLI uses the stock defaults unless
//! `--config` is given.
//!
//! ## Failure Granularity
//!
//! A directory that cannot be read or a listing that cannot be written is
//! logged and skipped; the run goes on. The header-rule file is the one
//! required artifact, so failing to write it fails the run. Nothing is rolled
//! back: rerunning regenerates every output from scratch.
//!
//! ## Deterministic Output
//!
//! Children are sorted case-insensitively and the listing footer timestamp is
//! off by default, so running twice over an unchanged tree produces identical
//! files.

pub mod config;
pub mod exclusion;
pub mod headers;
pub mod listing;
pub mod output;
pub mod pipeline;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
