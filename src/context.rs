//! Render contexts.
//!
//! A [`RenderContext`] describes the markup being produced: its language,
//! version, dialect and charset. Everything that has to emit bytes that
//! differ between HTML and XHTML (doctypes, self-closing tags, CDATA masks,
//! the `Content-Type` header) asks the context instead of hard-coding one
//! flavour.
//!
//! ## Profiles
//!
//! Most callers never build a context field by field. [`ContextType`] names
//! the common profiles and [`RenderContext::create`] turns one into a
//! concrete (language, version, dialect) triple:
//!
//! ```text
//! html-4.01-strict        → html  4.01 strict
//! html-5                  → html  5    none
//! xhtml-1.0-transitional  → xhtml 1.0  transitional
//! xhtml-1.1               → xhtml 1.1  none
//! ```
//!
//! ## Nesting
//!
//! Rendering an island of one language inside another (an SVG fragment in an
//! HTML page, a JSON blob in a script tag) pushes a context onto a
//! [`ContextStack`]. The stack is an ordinary value owned by the render pass,
//! never process-global state.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    #[error("Unknown render context type: {0}")]
    UnknownType(String),
    #[error("Unknown markup language: {0}")]
    UnknownLanguage(String),
    #[error("No doctype defined for {language} {version} ({dialect})")]
    NoDoctype {
        language: Language,
        version: f32,
        dialect: Dialect,
    },
    #[error("Invalid content type: {0:?}")]
    InvalidContentType(String),
}

/// Target markup (or non-markup) language of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Html,
    Xhtml,
    Xml,
    Css,
    Js,
    Json,
    Text,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Html => "html",
            Language::Xhtml => "xhtml",
            Language::Xml => "xml",
            Language::Css => "css",
            Language::Js => "js",
            Language::Json => "json",
            Language::Text => "text",
        }
    }

    /// Whether elements can be rendered in this language at all.
    pub fn is_markup(self) -> bool {
        matches!(self, Language::Html | Language::Xhtml | Language::Xml)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Language::Html),
            "xhtml" => Ok(Language::Xhtml),
            "xml" => Ok(Language::Xml),
            "css" => Ok(Language::Css),
            "js" | "javascript" => Ok(Language::Js),
            "json" => Ok(Language::Json),
            "text" | "plain" => Ok(Language::Text),
            _ => Err(ContextError::UnknownLanguage(s.to_string())),
        }
    }
}

/// Document type dialect. Only HTML 4.01 and XHTML 1.0 distinguish them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Strict,
    Transitional,
    Frameset,
    None,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Strict => "strict",
            Dialect::Transitional => "transitional",
            Dialect::Frameset => "frameset",
            Dialect::None => "none",
        })
    }
}

/// Named render profiles accepted by [`RenderContext::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextType {
    Html4Strict,
    Html4Transitional,
    Html4Frameset,
    Html5,
    Xhtml1Strict,
    Xhtml1Transitional,
    Xhtml1Frameset,
    Xhtml11,
    Xhtml5,
    Xml,
    Css,
    Js,
    Json,
    Text,
}

impl ContextType {
    pub const ALL: [ContextType; 14] = [
        ContextType::Html4Strict,
        ContextType::Html4Transitional,
        ContextType::Html4Frameset,
        ContextType::Html5,
        ContextType::Xhtml1Strict,
        ContextType::Xhtml1Transitional,
        ContextType::Xhtml1Frameset,
        ContextType::Xhtml11,
        ContextType::Xhtml5,
        ContextType::Xml,
        ContextType::Css,
        ContextType::Js,
        ContextType::Json,
        ContextType::Text,
    ];

    /// Profile name as used in config files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ContextType::Html4Strict => "html-4.01-strict",
            ContextType::Html4Transitional => "html-4.01-transitional",
            ContextType::Html4Frameset => "html-4.01-frameset",
            ContextType::Html5 => "html-5",
            ContextType::Xhtml1Strict => "xhtml-1.0-strict",
            ContextType::Xhtml1Transitional => "xhtml-1.0-transitional",
            ContextType::Xhtml1Frameset => "xhtml-1.0-frameset",
            ContextType::Xhtml11 => "xhtml-1.1",
            ContextType::Xhtml5 => "xhtml-5",
            ContextType::Xml => "xml",
            ContextType::Css => "css",
            ContextType::Js => "js",
            ContextType::Json => "json",
            ContextType::Text => "text",
        }
    }

    fn triple(self) -> (Language, f32, Dialect) {
        match self {
            ContextType::Html4Strict => (Language::Html, 4.01, Dialect::Strict),
            ContextType::Html4Transitional => (Language::Html, 4.01, Dialect::Transitional),
            ContextType::Html4Frameset => (Language::Html, 4.01, Dialect::Frameset),
            ContextType::Html5 => (Language::Html, 5.0, Dialect::None),
            ContextType::Xhtml1Strict => (Language::Xhtml, 1.0, Dialect::Strict),
            ContextType::Xhtml1Transitional => (Language::Xhtml, 1.0, Dialect::Transitional),
            ContextType::Xhtml1Frameset => (Language::Xhtml, 1.0, Dialect::Frameset),
            ContextType::Xhtml11 => (Language::Xhtml, 1.1, Dialect::None),
            ContextType::Xhtml5 => (Language::Xhtml, 5.0, Dialect::None),
            ContextType::Xml => (Language::Xml, 1.0, Dialect::None),
            ContextType::Css => (Language::Css, 2.1, Dialect::None),
            ContextType::Js => (Language::Js, 1.5, Dialect::None),
            ContextType::Json => (Language::Json, 1.0, Dialect::None),
            ContextType::Text => (Language::Text, 1.0, Dialect::None),
        }
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContextType {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ContextType::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| ContextError::UnknownType(s.to_string()))
    }
}

static CONTENT_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9][a-z0-9!#$&^_.+-]*/[a-z0-9][a-z0-9!#$&^_.+-]*$")
        .expect("content type pattern must compile")
});

/// Description of the markup being rendered.
#[derive(Debug, Clone)]
pub struct RenderContext {
    language: Language,
    version: f32,
    dialect: Dialect,
    charset: Option<String>,
    compat_mode: bool,
    debug: bool,
    content_type_override: Option<String>,
    content_type_cache: OnceCell<String>,
}

impl RenderContext {
    pub fn new(language: Language, version: f32, dialect: Dialect) -> Self {
        Self {
            language,
            version,
            dialect,
            charset: None,
            compat_mode: false,
            debug: false,
            content_type_override: None,
            content_type_cache: OnceCell::new(),
        }
    }

    /// Build a context from a named profile.
    pub fn create(kind: ContextType) -> Self {
        let (language, version, dialect) = kind.triple();
        Self::new(language, version, dialect)
    }

    /// Build a context from a profile name such as `"xhtml-1.0-strict"`.
    pub fn from_profile(name: &str) -> Result<Self, ContextError> {
        Ok(Self::create(name.parse()?))
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.set_charset(Some(charset.into()));
        self
    }

    pub fn with_compat_mode(mut self, compat: bool) -> Self {
        self.set_compat_mode(compat);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn version(&self) -> f32 {
        self.version
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn compat_mode(&self) -> bool {
        self.compat_mode
    }

    /// When set, deprecated elements and attributes are reported via `log`.
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
        self.content_type_cache = OnceCell::new();
    }

    pub fn set_version(&mut self, version: f32) {
        self.version = version;
    }

    pub fn set_dialect(&mut self, dialect: Dialect) {
        self.dialect = dialect;
    }

    pub fn set_charset(&mut self, charset: Option<String>) {
        self.charset = charset;
    }

    pub fn set_compat_mode(&mut self, compat: bool) {
        self.compat_mode = compat;
        self.content_type_cache = OnceCell::new();
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Versions are compared in hundredths so that `4.01` and `1.1` match
    /// exactly while `1.05` stays distinct from `1.0` and `1.1`.
    fn version_key(&self) -> u32 {
        (self.version * 100.0).round() as u32
    }

    pub fn is_xml_syntax(&self) -> bool {
        matches!(self.language, Language::Xhtml | Language::Xml)
    }

    /// Whether this is an HTML5-family document (HTML 5 or XHTML 5).
    pub fn is_html5(&self) -> bool {
        matches!(self.language, Language::Html | Language::Xhtml) && self.version_key() == 500
    }

    /// Return the doctype declaration for this context.
    ///
    /// Languages without doctypes return an empty string. HTML and XHTML
    /// versions or dialects with no published doctype are an error.
    pub fn doctype(&self) -> Result<&'static str, ContextError> {
        let doctype = match (self.language, self.version_key(), self.dialect) {
            (Language::Html, 401, Dialect::Strict) => {
                r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#
            }
            (Language::Html, 401, Dialect::Transitional) => {
                r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">"#
            }
            (Language::Html, 401, Dialect::Frameset) => {
                r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Frameset//EN" "http://www.w3.org/TR/html4/frameset.dtd">"#
            }
            (Language::Html | Language::Xhtml, 500, _) => "<!DOCTYPE html>",
            (Language::Xhtml, 100, Dialect::Strict) => {
                r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#
            }
            (Language::Xhtml, 100, Dialect::Transitional) => {
                r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#
            }
            (Language::Xhtml, 100, Dialect::Frameset) => {
                r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Frameset//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-frameset.dtd">"#
            }
            (Language::Xhtml, 110, Dialect::None) => {
                r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">"#
            }
            (Language::Html | Language::Xhtml, _, _) => {
                return Err(ContextError::NoDoctype {
                    language: self.language,
                    version: self.version,
                    dialect: self.dialect,
                });
            }
            (Language::Xml | Language::Css | Language::Js | Language::Json | Language::Text, _, _) => "",
        };
        Ok(doctype)
    }

    /// The `<?xml ...?>` prolog for XML-syntax contexts, empty otherwise.
    pub fn xml_declaration(&self) -> String {
        if !self.is_xml_syntax() {
            return String::new();
        }
        format!(
            r#"<?xml version="1.0" encoding="{}"?>"#,
            self.charset().unwrap_or("UTF-8")
        )
    }

    fn derive_content_type(&self) -> String {
        let mime = match self.language {
            Language::Html => "text/html",
            Language::Xhtml if self.compat_mode => "text/html",
            Language::Xhtml => "application/xhtml+xml",
            Language::Xml => "application/xml",
            Language::Css => "text/css",
            Language::Js => "application/javascript",
            Language::Json => "application/json",
            Language::Text => "text/plain",
        };
        mime.to_string()
    }

    /// MIME type to serve this context with.
    ///
    /// An explicit override wins; otherwise the type is derived from the
    /// language and compat mode once and cached.
    pub fn content_type(&self) -> &str {
        match &self.content_type_override {
            Some(mime) => mime,
            None => self.content_type_cache.get_or_init(|| self.derive_content_type()),
        }
    }

    /// Override the derived content type. `None` restores derivation.
    pub fn set_content_type(&mut self, mime: Option<&str>) -> Result<(), ContextError> {
        match mime {
            Some(mime) => {
                let mime = mime.trim();
                if !CONTENT_TYPE_RE.is_match(mime) {
                    return Err(ContextError::InvalidContentType(mime.to_string()));
                }
                self.content_type_override = Some(mime.to_ascii_lowercase());
            }
            None => {
                self.content_type_override = None;
                self.content_type_cache = OnceCell::new();
            }
        }
        Ok(())
    }

    /// `Content-Type` header value, including the charset when one is set.
    pub fn content_type_header(&self) -> String {
        match self.charset() {
            Some(charset) => format!("{}; charset={}", self.content_type(), charset),
            None => self.content_type().to_string(),
        }
    }
}

// The content type cache is derived state and takes no part in equality.
impl PartialEq for RenderContext {
    fn eq(&self, other: &Self) -> bool {
        self.language == other.language
            && self.version == other.version
            && self.dialect == other.dialect
            && self.charset == other.charset
            && self.compat_mode == other.compat_mode
            && self.debug == other.debug
            && self.content_type_override == other.content_type_override
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::create(ContextType::Html5).with_charset("utf-8")
    }
}

/// Stack of nested render contexts. The last pushed context is current.
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    contexts: Vec<RenderContext>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ctx: RenderContext) {
        log::debug!(
            "push render context {} {} (depth {})",
            ctx.language(),
            ctx.version(),
            self.contexts.len() + 1
        );
        self.contexts.push(ctx);
    }

    pub fn pop(&mut self) -> Option<RenderContext> {
        self.contexts.pop()
    }

    /// The current context, or `None` when nothing has been pushed.
    pub fn get(&self) -> Option<&RenderContext> {
        self.contexts.last()
    }

    pub fn get_mut(&mut self) -> Option<&mut RenderContext> {
        self.contexts.last_mut()
    }

    /// Replace the whole stack with a single context.
    pub fn set(&mut self, ctx: RenderContext) {
        self.contexts.clear();
        self.contexts.push(ctx);
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
