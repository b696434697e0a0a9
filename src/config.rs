//! Scaffold configuration module.
//!
//! Every knob the generators read lives in [`ScaffoldConfig`]: which names are
//! excluded, what the generated files are called, and which files are served
//! as HTML. The value is passed explicitly into the walker and both
//! generators, so tests can build synthetic trees with their own settings.
//!
//! ## Defaults
//!
//! Without a config file the stock defaults apply:
//!
//! ```toml
//! listing_filename = "index.html"     # Listing document written in every directory
//! headers_filename = "_headers"       # Header-rule file written at the root
//! excluded_dirs = [".git"]            # Never descended into, listed or ruled
//! excluded_files = ["index.html", "_headers"]  # Never listed
//! html_filenames = ["index.html", "index.htm"] # Served as text/html
//! html_extensions = ["html", "htm"]   # Served as text/html
//! html_content_type = "text/html"
//! default_content_type = "text/plain"
//! # charset = "utf-8"                 # Appended as `; charset=...` when set
//!
//! [listing]
//! stylesheet = true                   # Inline minimal CSS
//! breadcrumbs = true                  # Breadcrumb trail back to the root listing
//! timestamp = false                   # "Generated ..." footer (breaks byte-identical reruns)
//! ```
//!
//! ## Partial Configuration
//!
//! A file passed with `--config` is sparse; it overrides only the keys it
//! names and is merged over the defaults table by table:
//!
//! ```toml
//! excluded_dirs = [".git", "node_modules", "__pycache__"]
//! charset = "utf-8"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration.
///
/// All fields have defaults; a config file only needs the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaffoldConfig {
    /// Name of the listing document written into every directory.
    pub listing_filename: String,
    /// Name of the header-rule file written at the root.
    pub headers_filename: String,
    /// Directory names that are never traversed, listed or ruled.
    pub excluded_dirs: Vec<String>,
    /// File names that never appear in a listing. The listing and header
    /// file names are hidden even when this list leaves them out.
    pub excluded_files: Vec<String>,
    /// File names served as HTML, compared case-insensitively.
    pub html_filenames: Vec<String>,
    /// File extensions (without the dot) served as HTML, compared case-insensitively.
    pub html_extensions: Vec<String>,
    /// Content-Type for HTML documents.
    pub html_content_type: String,
    /// Content-Type for every other file.
    pub default_content_type: String,
    /// Optional charset parameter appended to both content types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    /// Listing document presentation.
    pub listing: ListingConfig,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            listing_filename: "index.html".to_string(),
            headers_filename: "_headers".to_string(),
            excluded_dirs: vec![".git".to_string()],
            excluded_files: vec!["index.html".to_string(), "_headers".to_string()],
            html_filenames: vec!["index.html".to_string(), "index.htm".to_string()],
            html_extensions: vec!["html".to_string(), "htm".to_string()],
            html_content_type: "text/html".to_string(),
            default_content_type: "text/plain".to_string(),
            charset: None,
            listing: ListingConfig::default(),
        }
    }
}

/// Presentation switches for the generated listing documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Embed the minimal inline stylesheet.
    pub stylesheet: bool,
    /// Render a breadcrumb trail linking back to the root listing.
    pub breadcrumbs: bool,
    /// Append a UTC "Generated" footer.
    pub timestamp: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            stylesheet: true,
            breadcrumbs: true,
            timestamp: false,
        }
    }
}

impl ScaffoldConfig {
    /// Validate that generated names are usable as single path components.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_file_name("listing_filename", &self.listing_filename)?;
        check_file_name("headers_filename", &self.headers_filename)?;
        if self.listing_filename == self.headers_filename {
            return Err(ConfigError::Validation(
                "listing_filename and headers_filename must differ".into(),
            ));
        }
        for name in &self.excluded_dirs {
            check_file_name("excluded_dirs", name)?;
        }
        for name in &self.excluded_files {
            check_file_name("excluded_files", name)?;
        }
        if self.html_content_type.trim().is_empty() {
            return Err(ConfigError::Validation(
                "html_content_type must not be empty".into(),
            ));
        }
        if self.default_content_type.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_content_type must not be empty".into(),
            ));
        }
        if let Some(charset) = &self.charset
            && charset.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "charset must not be empty when set".into(),
            ));
        }
        Ok(())
    }

    /// Whether a file with this name is served as an HTML document.
    ///
    /// The listing document always is, even when renamed to an extension
    /// outside `html_extensions`.
    pub fn is_html(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        if self.listing_filename.to_lowercase() == lower
            || self.html_filenames.iter().any(|n| n.to_lowercase() == lower)
        {
            return true;
        }
        Path::new(&lower)
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                self.html_extensions
                    .iter()
                    .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&ext))
            })
            .unwrap_or(false)
    }

    /// The Content-Type value for a file name, charset applied.
    pub fn content_type_for(&self, file_name: &str) -> String {
        let base = if self.is_html(file_name) {
            &self.html_content_type
        } else {
            &self.default_content_type
        };
        match &self.charset {
            Some(charset) => format!("{base}; charset={charset}"),
            None => base.clone(),
        }
    }
}

fn check_file_name(field: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "{field}: {name:?} is not a plain file name"
        )));
    }
    Ok(())
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// `ScaffoldConfig::default()` as a TOML table, the base every overlay lands on.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ScaffoldConfig::default()).expect("default config must serialize")
}

/// Lay a user config over the defaults.
///
/// Nested tables such as `[listing]` combine field by field. Scalars and
/// arrays from the user file win outright: `excluded_dirs = ["node_modules"]`
/// is the whole list, not an addition to `.git`. Anything the user leaves
/// out keeps its default.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    let (toml::Value::Table(mut defaults), toml::Value::Table(user)) = (base, overlay.clone())
    else {
        return overlay;
    };
    for (key, value) in user {
        let value = match defaults.remove(&key) {
            Some(default) => merge_toml(default, value),
            None => value,
        };
        defaults.insert(key, value);
    }
    toml::Value::Table(defaults)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ScaffoldConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ScaffoldConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file and merge it over the stock defaults.
pub fn load_config(path: &Path) -> Result<ScaffoldConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock config file.
///
/// Printed by `--gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# site-scaffold configuration
# ===========================
#
# Pass this file with `site-scaffold --config scaffold.toml [ROOT]`.
# Every key is optional; omitted keys keep the defaults shown here.
# Arrays replace the default list, they do not extend it.

# Listing document written into every directory.
listing_filename = "index.html"

# Header-rule file written once at the root.
headers_filename = "_headers"

# Directory names never descended into, listed or given header rules,
# wherever they appear in the tree.
excluded_dirs = [".git"]

# File names left out of every listing. The listing document itself is
# still given a header rule; the header-rule file is not.
excluded_files = ["index.html", "_headers"]

# Files served as text/html: exact names (case-insensitive) ...
html_filenames = ["index.html", "index.htm"]
# ... and extensions (case-insensitive, no leading dot).
html_extensions = ["html", "htm"]

# Content-Type values written into the header-rule file.
html_content_type = "text/html"
default_content_type = "text/plain"

# Uncomment to append `; charset=utf-8` to both content types.
# charset = "utf-8"

[listing]
# Inline a small stylesheet in every listing.
stylesheet = true

# Breadcrumb trail above the list; the first crumb links to the root listing.
breadcrumbs = true

# "Generated <time> UTC" footer. Off by default so reruns on an unchanged
# tree produce identical listings.
timestamp = false
"##
}
