//! Configuration module.
//!
//! Handles loading, validating, and merging `pagesmith.toml` files.
//! Configuration is layered: stock defaults are overridden by a site-level
//! file, which a section or page directory can override again.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! ├── pagesmith.toml           # Site config (overrides stock defaults)
//! └── blog/
//!     ├── pagesmith.toml       # Section config (overrides site)
//!     └── archive/
//!         └── pagesmith.toml   # Page config (overrides section)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [render]
//! profile = "html-5"          # Doctype profile (html-4.01-strict, xhtml-1.0-strict, ...)
//! charset = "utf-8"
//! compat_mode = false         # Serve XHTML as text/html
//! debug = false               # Log deprecated elements and attributes
//!
//! [chrome]
//! title_separator = " » "
//! group_ie_resources = true   # One conditional comment per IE condition
//! ie_class_ladder = false     # Wrap <html> in IE version classes
//! default_priority = 50       # Load order for scripts/stylesheets (0-100)
//! # language = "en"
//!
//! [page]
//! title = ["My Site"]
//! icons = ["/favicon.ico"]
//!
//! [page.metadata]
//! description = "A site"
//!
//! [[page.scripts]]
//! href = "/js/app.js"
//! priority = 10
//!
//! [[page.stylesheets]]
//! href = "/css/print.css"
//! media = "print"
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use crate::chrome::resource::MAX_PRIORITY;
use crate::chrome::{Chrome, ChromeError};
use crate::context::{ContextError, RenderContext};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub const CONFIG_FILE: &str = "pagesmith.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `pagesmith.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Output profile: doctype, charset, serving mode.
    pub render: RenderConfig,
    /// Page chrome behaviour (title separator, IE handling, priorities).
    pub chrome: ChromeConfig,
    /// Head content applied to every page rendered from this config.
    pub page: PageConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.render.context().map_err(|e| {
            ConfigError::Validation(format!("render.profile: {e}"))
        })?;
        if self.render.charset.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "render.charset must not be empty".into(),
            ));
        }
        if self.chrome.title_separator.is_empty() {
            return Err(ConfigError::Validation(
                "chrome.title_separator must not be empty".into(),
            ));
        }
        if self.chrome.default_priority > MAX_PRIORITY {
            return Err(ConfigError::Validation(format!(
                "chrome.default_priority must be 0-{MAX_PRIORITY}"
            )));
        }
        for (section, entries) in [
            ("page.scripts", &self.page.scripts),
            ("page.stylesheets", &self.page.stylesheets),
        ] {
            if let Some(bad) = entries
                .iter()
                .find(|e| e.priority.is_some_and(|p| p > MAX_PRIORITY))
            {
                return Err(ConfigError::Validation(format!(
                    "{section}: priority of {} must be 0-{MAX_PRIORITY}",
                    bad.href
                )));
            }
        }
        Ok(())
    }
}

/// Rendering profile settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Profile name, e.g. `html-5` or `xhtml-1.0-strict`.
    pub profile: String,
    pub charset: Option<String>,
    /// Serve XHTML as `text/html`.
    pub compat_mode: bool,
    /// Report deprecated markup through the log.
    pub debug: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            profile: "html-5".to_string(),
            charset: Some("utf-8".to_string()),
            compat_mode: false,
            debug: false,
        }
    }
}

impl RenderConfig {
    /// Build the render context described by this section.
    pub fn context(&self) -> Result<RenderContext, ContextError> {
        let mut ctx = RenderContext::from_profile(&self.profile)?
            .with_compat_mode(self.compat_mode)
            .with_debug(self.debug);
        ctx.set_charset(self.charset.clone());
        Ok(ctx)
    }
}

/// Chrome behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChromeConfig {
    pub title_separator: String,
    /// Emit one conditional comment per IE condition instead of one per file.
    pub group_ie_resources: bool,
    /// Wrap `<html>` in conditional comments carrying IE version classes.
    pub ie_class_ladder: bool,
    /// Priority given to scripts and stylesheets registered without one.
    pub default_priority: u8,
    /// Document language for `lang`/`xml:lang`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            title_separator: crate::chrome::DEFAULT_TITLE_SEPARATOR.to_string(),
            group_ie_resources: true,
            ie_class_ladder: false,
            default_priority: crate::chrome::resource::DEFAULT_PRIORITY,
            language: None,
        }
    }
}

/// A script or stylesheet entry under `[page]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceEntry {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    /// Media query; stylesheets only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

/// Head content shared by every page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    pub title: Vec<String>,
    pub scripts: Vec<ResourceEntry>,
    pub stylesheets: Vec<ResourceEntry>,
    /// `<meta name=… content=…>` pairs.
    pub metadata: IndexMap<String, String>,
    /// Favicon hrefs; the type comes from the extension.
    pub icons: Vec<String>,
}

impl PageConfig {
    /// Register this section's head content with `chrome`.
    pub fn apply(&self, chrome: &mut Chrome) -> Result<(), ChromeError> {
        if !self.title.is_empty() {
            chrome.set_title(self.title.iter().cloned());
        }
        for (name, content) in &self.metadata {
            chrome.add_meta(name, content);
        }
        for script in &self.scripts {
            chrome.add_script(&script.href, script.priority)?;
        }
        for sheet in &self.stylesheets {
            chrome.add_stylesheet(&sheet.href, sheet.media.as_deref(), sheet.priority)?;
        }
        for href in &self.icons {
            chrome.add_icon(href, None)?;
        }
        Ok(())
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so arrays
///   such as `page.scripts` are replaced rather than appended.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `pagesmith.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    load_raw_file(&config_path).map(Some)
}

/// Read an explicit config file as a raw TOML value.
pub fn load_raw_file(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `pagesmith.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Load config through a chain of directories, outermost first. Each
/// directory's file overrides the ones before it; missing files are skipped.
pub fn load_layered_config(dirs: &[&Path]) -> Result<SiteConfig, ConfigError> {
    let mut merged = stock_defaults_value();
    for dir in dirs {
        if let Some(overlay) = load_raw_config(dir)? {
            log::debug!("config: layering {}", dir.join(CONFIG_FILE).display());
            merged = merge_toml(merged, overlay);
        }
    }
    resolve_config(merged, None)
}

/// Returns a fully-commented stock `pagesmith.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Pagesmith Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Config files can be layered by directory:
#   site/pagesmith.toml               -> site (overrides stock defaults)
#   site/blog/pagesmith.toml          -> section (overrides site)
#   site/blog/archive/pagesmith.toml  -> page (overrides section)
#
# Each level only needs the keys it wants to override.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Rendering profile
# ---------------------------------------------------------------------------
[render]
# Doctype profile. One of:
#   html-4.01-strict, html-4.01-transitional, html-4.01-frameset, html-5,
#   xhtml-1.0-strict, xhtml-1.0-transitional, xhtml-1.0-frameset,
#   xhtml-1.1, xhtml-5, xml, css, js, json, text
profile = "html-5"

# Character set for the Content-Type header and charset meta tag.
charset = "utf-8"

# Serve XHTML profiles as text/html instead of application/xhtml+xml.
compat_mode = false

# Log deprecated elements and attributes (e.g. <center>, bgcolor) at warn level.
debug = false

# ---------------------------------------------------------------------------
# Page chrome
# ---------------------------------------------------------------------------
[chrome]
# Placed between title parts: "Post » Blog » Site".
title_separator = " » "

# Emit one conditional comment per IE condition (fix.ie.lte_8.js, ...)
# instead of wrapping each file separately.
group_ie_resources = true

# Wrap <html> in conditional comments adding ie6..ie9 classes.
ie_class_ladder = false

# Load-order priority for scripts and stylesheets added without one (0-100).
# Lower loads first.
default_priority = 50

# Document language for the lang / xml:lang attributes.
# language = "en"

# ---------------------------------------------------------------------------
# Head content added to every page
# ---------------------------------------------------------------------------
[page]
# Title parts, innermost first.
title = []

# Favicons; the type is inferred from the extension.
icons = []

# External scripts and stylesheets, e.g.:
#   [[page.scripts]]
#   href = "/js/app.js"
#   priority = 10
#
#   [[page.stylesheets]]
#   href = "/css/print.css"
#   media = "print"
scripts = []
stylesheets = []

# <meta name="..." content="..."> pairs.
[page.metadata]
"##
}
