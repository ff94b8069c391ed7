//! Context-aware element rendering.
//!
//! Every element this crate emits goes through [`render_tag`]. The render
//! context decides the bytes: under XHTML and XML, void elements and
//! explicitly empty elements self-close (`<br />`); under HTML they never do
//! (`<br>`).
//!
//! ## Attributes
//!
//! [`Attributes`] keeps insertion order. Keys are lower-cased on insert.
//! Boolean values render in the XML-safe long form:
//!
//! ```text
//! ("checked", true)   →  checked="checked"
//! ("checked", false)  →  (omitted)
//! ("_internal", ..)   →  (omitted, underscore keys are private)
//! ```
//!
//! ## Content
//!
//! [`Content`] distinguishes three cases a plain `Option` cannot:
//!
//! - [`Content::Empty`]: the element has no content and should be closed
//!   immediately (self-closed in XML syntax).
//! - [`Content::Open`]: emit only the opening tag; the caller closes it.
//! - [`Content::Body`]: pre-rendered markup placed between the tags.
//!
//! ## Script and style masks
//!
//! Inline `script` and `style` bodies can be wrapped in a mask that hides
//! them from parsers that do not understand them. The mask is a fixed lookup
//! on (tag, CDATA-or-not), see [`content_mask`].

use crate::context::{Dialect, Language, RenderContext};
use crate::util::string::escape_html;
use indexmap::IndexMap;
use maud::{Markup, PreEscaped, Render};
use regex::Regex;
use std::fmt::Write;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TagError {
    #[error("Cannot render <{tag}> in a {language} context")]
    UnsupportedLanguage { tag: String, language: Language },
    #[error("Invalid element name: {0:?}")]
    InvalidName(String),
}

/// Elements that never have content.
pub const VOID_ELEMENTS: [&str; 11] = [
    "area", "base", "br", "col", "hr", "img", "input", "link", "meta", "param", "wbr",
];

const DEPRECATED_ELEMENTS: [&str; 10] = [
    "applet", "basefont", "center", "dir", "font", "isindex", "menu", "s", "strike", "u",
];

/// Presentational attributes dropped by the strict dialects, with the
/// elements they are deprecated on (`*` for all).
const DEPRECATED_ATTRIBUTES: [(&str, &[&str]); 12] = [
    ("align", &["*"]),
    ("alink", &["body"]),
    ("background", &["body"]),
    ("bgcolor", &["*"]),
    ("border", &["img", "object"]),
    ("clear", &["br"]),
    ("hspace", &["img", "object"]),
    ("language", &["script"]),
    ("link", &["body"]),
    ("nowrap", &["td", "th"]),
    ("valign", &["*"]),
    ("vspace", &["img", "object"]),
];

static TAG_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9]*(?:[:-][A-Za-z0-9]+)*$").expect("tag name pattern must compile")
});

/// An attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Text(value.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Flag(value)
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Text(value.to_string())
    }
}

/// Insertion-ordered element attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: IndexMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Attributes::insert`].
    pub fn with(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace an attribute. Replacing keeps the original position.
    pub fn insert(&mut self, key: &str, value: impl Into<AttrValue>) {
        self.entries.insert(key.to_ascii_lowercase(), value.into());
    }

    /// Insert only if the attribute is not already present.
    pub fn insert_default(&mut self, key: &str, value: impl Into<AttrValue>) {
        self.entries
            .entry(key.to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.entries.get(&key.to_ascii_lowercase())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(AttrValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.entries.shift_remove(&key.to_ascii_lowercase())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn merge(&mut self, other: &Attributes) {
        for (key, value) in &other.entries {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Append a class name to the `class` attribute.
    pub fn add_class(&mut self, class: &str) {
        let merged = match self.get_str("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.insert("class", merged);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render as ` key="value"` pairs, each preceded by a space.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            if key.starts_with('_') {
                continue;
            }
            match value {
                AttrValue::Flag(false) => {}
                AttrValue::Flag(true) => {
                    let _ = write!(out, r#" {key}="{key}""#);
                }
                AttrValue::Text(text) => {
                    let _ = write!(out, r#" {key}="{}""#, escape_html(text));
                }
            }
        }
        out
    }
}

impl<K: AsRef<str>, V: Into<AttrValue>, const N: usize> From<[(K, V); N]> for Attributes {
    fn from(pairs: [(K, V); N]) -> Self {
        let mut attrs = Attributes::new();
        for (key, value) in pairs {
            attrs.insert(key.as_ref(), value);
        }
        attrs
    }
}

/// Element content.
#[derive(Debug, Clone)]
pub enum Content {
    Empty,
    Open,
    Body(Markup),
}

impl Content {
    /// Wrap anything maud can render. `&str` and `String` are escaped,
    /// `Markup` is used as-is.
    pub fn body(content: impl Render) -> Self {
        Content::Body(content.render())
    }
}

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Deprecation advisories for an element, empty when the context's dialect
/// still allows presentational markup.
pub fn deprecation_warnings(ctx: &RenderContext, name: &str, attrs: &Attributes) -> Vec<String> {
    if matches!(ctx.dialect(), Dialect::Transitional | Dialect::Frameset) {
        return Vec::new();
    }
    let mut warnings = Vec::new();
    if DEPRECATED_ELEMENTS.contains(&name) {
        warnings.push(format!("<{name}> is deprecated"));
    }
    for (attr, elements) in DEPRECATED_ATTRIBUTES {
        if attrs.contains(attr) && (elements.contains(&"*") || elements.contains(&name)) {
            warnings.push(format!("attribute {attr:?} on <{name}> is deprecated"));
        }
    }
    warnings
}

/// Render an element for the given context.
pub fn render_tag(
    ctx: &RenderContext,
    name: &str,
    attrs: &Attributes,
    content: Content,
) -> Result<Markup, TagError> {
    let name = name.to_ascii_lowercase();
    if !TAG_NAME_RE.is_match(&name) {
        return Err(TagError::InvalidName(name));
    }
    if !ctx.language().is_markup() {
        return Err(TagError::UnsupportedLanguage {
            tag: name,
            language: ctx.language(),
        });
    }
    if ctx.debug() {
        for warning in deprecation_warnings(ctx, &name, attrs) {
            log::warn!("{warning}");
        }
    }

    let void = is_void_element(&name);
    let mut out = format!("<{}{}", name, attrs.render());
    if ctx.is_xml_syntax() && (void || matches!(content, Content::Empty)) {
        out.push_str(" />");
        return Ok(PreEscaped(out));
    }
    out.push('>');
    if void {
        return Ok(PreEscaped(out));
    }
    match content {
        Content::Open => {}
        Content::Empty => {
            let _ = write!(out, "</{name}>");
        }
        Content::Body(body) => {
            let _ = write!(out, "{}</{name}>", body.into_string());
        }
    }
    Ok(PreEscaped(out))
}

/// Opening and closing tokens used to hide `script`/`style` content.
///
/// XML-syntax contexts get a CDATA section commented out in the language
/// of the element; HTML contexts get an SGML comment.
pub fn content_mask(tag: &str, ctx: &RenderContext) -> Option<(&'static str, &'static str)> {
    match (tag, ctx.is_xml_syntax()) {
        ("script", true) => Some(("//<![CDATA[", "//]]>")),
        ("style", true) => Some(("/*<![CDATA[*/", "/*]]>*/")),
        ("script", false) => Some(("<!--", "//-->")),
        ("style", false) => Some(("<!--", "-->")),
        _ => None,
    }
}

fn masked_body(tag: &str, ctx: &RenderContext, body: &str, mask: bool) -> Markup {
    match content_mask(tag, ctx).filter(|_| mask) {
        Some((open, close)) => PreEscaped(format!("\n{open}\n{body}\n{close}\n")),
        None => PreEscaped(body.to_string()),
    }
}

pub fn a(
    ctx: &RenderContext,
    href: &str,
    content: impl Render,
    extra: &Attributes,
) -> Result<Markup, TagError> {
    let mut attrs = Attributes::new().with("href", href);
    attrs.merge(extra);
    render_tag(ctx, "a", &attrs, Content::body(content))
}

pub fn img(
    ctx: &RenderContext,
    src: &str,
    alt: &str,
    extra: &Attributes,
) -> Result<Markup, TagError> {
    let mut attrs = Attributes::new().with("src", src).with("alt", alt);
    attrs.merge(extra);
    render_tag(ctx, "img", &attrs, Content::Empty)
}

pub fn br(ctx: &RenderContext, extra: &Attributes) -> Result<Markup, TagError> {
    render_tag(ctx, "br", extra, Content::Empty)
}

pub fn hr(ctx: &RenderContext, extra: &Attributes) -> Result<Markup, TagError> {
    render_tag(ctx, "hr", extra, Content::Empty)
}

pub fn link(
    ctx: &RenderContext,
    rel: &str,
    href: &str,
    mime: Option<&str>,
    extra: &Attributes,
) -> Result<Markup, TagError> {
    let mut attrs = Attributes::new().with("rel", rel).with("href", href);
    if let Some(mime) = mime {
        attrs.insert("type", mime);
    }
    attrs.merge(extra);
    render_tag(ctx, "link", &attrs, Content::Empty)
}

/// External script: `<script type="text/javascript" src="…"></script>`.
pub fn script(ctx: &RenderContext, src: &str, extra: &Attributes) -> Result<Markup, TagError> {
    let mut attrs = Attributes::new()
        .with("type", "text/javascript")
        .with("src", src);
    attrs.merge(extra);
    // Never self-close a script, browsers ignore the slash
    render_tag(ctx, "script", &attrs, Content::Body(PreEscaped(String::new())))
}

/// Inline script body, optionally masked.
pub fn inline_script(
    ctx: &RenderContext,
    code: &str,
    mask: bool,
    extra: &Attributes,
) -> Result<Markup, TagError> {
    let mut attrs = Attributes::new().with("type", "text/javascript");
    attrs.merge(extra);
    let body = masked_body("script", ctx, code, mask);
    render_tag(ctx, "script", &attrs, Content::Body(body))
}

/// Inline stylesheet, optionally masked.
pub fn style(
    ctx: &RenderContext,
    css: &str,
    mask: bool,
    extra: &Attributes,
) -> Result<Markup, TagError> {
    let mut attrs = Attributes::new().with("type", "text/css");
    attrs.merge(extra);
    let body = masked_body("style", ctx, css, mask);
    render_tag(ctx, "style", &attrs, Content::Body(body))
}

pub fn meta(
    ctx: &RenderContext,
    name: &str,
    content: &str,
    extra: &Attributes,
) -> Result<Markup, TagError> {
    let mut attrs = Attributes::new().with("name", name).with("content", content);
    attrs.merge(extra);
    render_tag(ctx, "meta", &attrs, Content::Empty)
}

pub fn meta_http_equiv(
    ctx: &RenderContext,
    header: &str,
    content: &str,
) -> Result<Markup, TagError> {
    let attrs = Attributes::new()
        .with("http-equiv", header)
        .with("content", content);
    render_tag(ctx, "meta", &attrs, Content::Empty)
}

/// Charset declaration: `<meta charset>` for HTML5, the `http-equiv`
/// `Content-Type` form for everything older.
pub fn meta_charset(ctx: &RenderContext, charset: &str) -> Result<Markup, TagError> {
    if ctx.is_html5() {
        let attrs = Attributes::new().with("charset", charset);
        return render_tag(ctx, "meta", &attrs, Content::Empty);
    }
    let value = format!("{}; charset={}", ctx.content_type(), charset);
    meta_http_equiv(ctx, "Content-Type", &value)
}

pub fn input(
    ctx: &RenderContext,
    kind: &str,
    name: &str,
    value: Option<&str>,
    extra: &Attributes,
) -> Result<Markup, TagError> {
    let mut attrs = Attributes::new().with("type", kind).with("name", name);
    if let Some(value) = value {
        attrs.insert("value", value);
    }
    attrs.merge(extra);
    render_tag(ctx, "input", &attrs, Content::Empty)
}

pub fn label(
    ctx: &RenderContext,
    for_id: &str,
    text: impl Render,
    extra: &Attributes,
) -> Result<Markup, TagError> {
    let mut attrs = Attributes::new().with("for", for_id);
    attrs.merge(extra);
    render_tag(ctx, "label", &attrs, Content::body(text))
}

/// An SGML comment. Double dashes inside the text are broken up so the
/// comment cannot end early.
pub fn comment(text: &str) -> Markup {
    let mut safe = text.to_string();
    while safe.contains("--") {
        safe = safe.replace("--", "- -");
    }
    PreEscaped(format!("<!-- {safe} -->"))
}

/// Wrap markup in an Internet Explorer conditional comment.
///
/// The downlevel-revealed form keeps the content visible to every browser
/// that is not IE, which is what `!IE` expressions need.
pub fn ie_conditional_comment(expr: &str, content: &str, downlevel_revealed: bool) -> Markup {
    if downlevel_revealed {
        PreEscaped(format!("<!--[if {expr}]><!-->{content}<!--<![endif]-->"))
    } else {
        PreEscaped(format!("<!--[if {expr}]>{content}<![endif]-->"))
    }
}
