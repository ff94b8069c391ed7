//! Page chrome: everything around the body of a page.
//!
//! [`Chrome`] collects what ends up in the response head and the document
//! `<head>` while a page is being put together, then emits it in a fixed
//! order once the page is rendered:
//!
//! ```text
//! 1. HTTP status and headers       (response_head)
//! 2. XML declaration and doctype
//! 3. <html> and <head>              (optionally inside the IE class ladder)
//! 4. <meta>                         (charset first)
//! 5. <title>
//! 6. <link>
//! 7. stylesheets                    (priority order, IE groups)
//! 8. external scripts               (priority order, IE groups)
//! 9. favicons
//! 10. </head>
//! ```
//!
//! A `Chrome` belongs to one render pass. Nothing is process-global: build
//! one per request (or reuse one after [`Chrome::clear`]).
//!
//! ## Example
//!
//! ```rust
//! use pagesmith::chrome::Chrome;
//! use pagesmith::context::{ContextType, RenderContext};
//!
//! let ctx = RenderContext::create(ContextType::Html5).with_charset("utf-8");
//! let mut chrome = Chrome::new();
//! chrome.set_title(["Shop", "Basket"]);
//! chrome.add_stylesheet("/css/site.css", None, None).unwrap();
//! chrome.add_script("/js/app.js", Some(10)).unwrap();
//! let head = chrome.render_head(&ctx).unwrap();
//! assert!(head.contains("<title>Shop &raquo; Basket</title>"));
//! ```

pub mod icon;
pub mod resource;

use crate::config::ChromeConfig;
use crate::context::{ContextError, Language, RenderContext};
use crate::tag::{self, Attributes, Content, TagError};
use crate::util::string::escape_html;
use indexmap::IndexMap;
use maud::Markup;
use resource::{DEFAULT_PRIORITY, MAX_PRIORITY, Resource, ResourceGroup};
use thiserror::Error;

pub use resource::IeCondition;

pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Separator placed between title parts unless configured otherwise.
pub const DEFAULT_TITLE_SEPARATOR: &str = " » ";

/// Class ladder emitted around `<html>` when enabled: one conditional
/// comment per legacy IE version plus the revealed tag for everyone else.
const IE_CLASS_LADDER: [(&str, &str); 4] = [
    ("lt IE 7", "ie ie6 lte9 lte8 lte7"),
    ("IE 7", "ie ie7 lte9 lte8 lte7"),
    ("IE 8", "ie ie8 lte9 lte8"),
    ("IE 9", "ie ie9 lte9"),
];

#[derive(Error, Debug)]
pub enum ChromeError {
    #[error("Priority {0} out of range (0-100)")]
    InvalidPriority(u8),
    #[error("Invalid HTTP response code: {0}")]
    InvalidResponseCode(u16),
    #[error("Cannot determine icon type for {0:?}")]
    UnknownIconType(String),
    #[error("Render context error: {0}")]
    Context(#[from] ContextError),
    #[error("Tag error: {0}")]
    Tag(#[from] TagError),
}

/// A `<link>` that is neither a stylesheet nor an icon.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkEntry {
    pub rel: String,
    pub href: String,
    pub attrs: Attributes,
}

/// Status line and headers to send before the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHead {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl ResponseHead {
    /// `HTTP/1.1 200 OK`
    pub fn status_line(&self) -> String {
        format!("HTTP/1.1 {} {}", self.status, reason_phrase(self.status))
    }
}

/// Everything produced by a full chrome render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedHead {
    pub response: ResponseHead,
    pub markup: String,
}

/// Canonical reason phrase for common status codes.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        410 => "Gone",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}

#[derive(Debug, Clone)]
pub struct Chrome {
    language: Option<String>,
    title_parts: Vec<String>,
    title_separator: String,
    meta_named: IndexMap<String, String>,
    meta_http_equiv: IndexMap<String, String>,
    links: Vec<LinkEntry>,
    scripts: IndexMap<String, Resource>,
    stylesheets: IndexMap<String, Resource>,
    alternate_stylesheets: IndexMap<String, Resource>,
    icons: IndexMap<String, String>,
    namespaces: IndexMap<String, String>,
    headers: IndexMap<String, String>,
    response_code: u16,
    body_attrs: Attributes,
    group_ie_resources: bool,
    ie_class_ladder: bool,
    default_priority: u8,
}

impl Default for Chrome {
    fn default() -> Self {
        Self {
            language: None,
            title_parts: Vec::new(),
            title_separator: DEFAULT_TITLE_SEPARATOR.to_string(),
            meta_named: IndexMap::new(),
            meta_http_equiv: IndexMap::new(),
            links: Vec::new(),
            scripts: IndexMap::new(),
            stylesheets: IndexMap::new(),
            alternate_stylesheets: IndexMap::new(),
            icons: IndexMap::new(),
            namespaces: IndexMap::new(),
            headers: IndexMap::new(),
            response_code: 200,
            body_attrs: Attributes::new(),
            group_ie_resources: true,
            ie_class_ladder: false,
            default_priority: DEFAULT_PRIORITY,
        }
    }
}

fn check_priority(priority: u8) -> Result<u8, ChromeError> {
    if priority > MAX_PRIORITY {
        return Err(ChromeError::InvalidPriority(priority));
    }
    Ok(priority)
}

/// Escape a title fragment. The guillemets used as separators are written
/// as named entities so the title survives any charset.
fn escape_title(text: &str) -> String {
    escape_html(text)
        .replace('»', "&raquo;")
        .replace('«', "&laquo;")
}

impl Chrome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ChromeConfig) -> Self {
        Self {
            language: config.language.clone(),
            title_separator: config.title_separator.clone(),
            group_ie_resources: config.group_ie_resources,
            ie_class_ladder: config.ie_class_ladder,
            default_priority: config.default_priority.min(MAX_PRIORITY),
            ..Self::default()
        }
    }

    /// Reset every registry. Options (separator, grouping) are kept.
    pub fn clear(&mut self) {
        self.clear_title();
        self.clear_meta();
        self.clear_links();
        self.clear_scripts();
        self.clear_stylesheets();
        self.clear_icons();
        self.clear_namespaces();
        self.clear_headers();
        self.body_attrs = Attributes::new();
        self.response_code = 200;
    }

    // ------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------

    pub fn set_language(&mut self, language: Option<&str>) {
        self.language = language.map(str::to_string);
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn set_group_ie_resources(&mut self, group: bool) {
        self.group_ie_resources = group;
    }

    pub fn group_ie_resources(&self) -> bool {
        self.group_ie_resources
    }

    pub fn set_ie_class_ladder(&mut self, enabled: bool) {
        self.ie_class_ladder = enabled;
    }

    pub fn body_attrs_mut(&mut self) -> &mut Attributes {
        &mut self.body_attrs
    }

    // ------------------------------------------------------------------
    // Title
    // ------------------------------------------------------------------

    pub fn set_title<I, S>(&mut self, parts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.title_parts = parts.into_iter().map(Into::into).collect();
    }

    pub fn add_title(&mut self, part: impl Into<String>) {
        self.title_parts.push(part.into());
    }

    pub fn prepend_title(&mut self, part: impl Into<String>) {
        self.title_parts.insert(0, part.into());
    }

    pub fn clear_title(&mut self) {
        self.title_parts.clear();
    }

    pub fn title_parts(&self) -> &[String] {
        &self.title_parts
    }

    pub fn set_title_separator(&mut self, separator: impl Into<String>) {
        self.title_separator = separator.into();
    }

    pub fn title_separator(&self) -> &str {
        &self.title_separator
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    /// `<meta name="…" content="…">`
    pub fn add_meta(&mut self, name: &str, content: &str) {
        self.meta_named.insert(name.to_string(), content.to_string());
    }

    pub fn remove_meta(&mut self, name: &str) -> Option<String> {
        self.meta_named.shift_remove(name)
    }

    /// `<meta http-equiv="…" content="…">`
    pub fn add_http_equiv(&mut self, header: &str, content: &str) {
        self.meta_http_equiv
            .insert(header.to_string(), content.to_string());
    }

    pub fn remove_http_equiv(&mut self, header: &str) -> Option<String> {
        self.meta_http_equiv.shift_remove(header)
    }

    pub fn clear_meta(&mut self) {
        self.meta_named.clear();
        self.meta_http_equiv.clear();
    }

    pub fn meta(&self) -> &IndexMap<String, String> {
        &self.meta_named
    }

    pub fn http_equiv(&self) -> &IndexMap<String, String> {
        &self.meta_http_equiv
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    /// Add a `<link>`. A link with the same rel and href replaces the
    /// earlier one in place.
    pub fn add_link(&mut self, rel: &str, href: &str, attrs: Attributes) {
        let entry = LinkEntry {
            rel: rel.to_string(),
            href: href.to_string(),
            attrs,
        };
        match self
            .links
            .iter_mut()
            .find(|l| l.rel == entry.rel && l.href == entry.href)
        {
            Some(existing) => *existing = entry,
            None => self.links.push(entry),
        }
    }

    pub fn remove_link(&mut self, href: &str) {
        self.links.retain(|l| l.href != href);
    }

    pub fn clear_links(&mut self) {
        self.links.clear();
    }

    pub fn links(&self) -> &[LinkEntry] {
        &self.links
    }

    // ------------------------------------------------------------------
    // Scripts and stylesheets
    // ------------------------------------------------------------------

    fn resource(&self, href: &str, priority: Option<u8>, attrs: Attributes) -> Result<Resource, ChromeError> {
        let priority = check_priority(priority.unwrap_or(self.default_priority))?;
        Ok(Resource {
            href: href.to_string(),
            priority,
            attrs,
        })
    }

    /// Register an external script. Re-adding an href updates it in place.
    pub fn add_script(&mut self, href: &str, priority: Option<u8>) -> Result<(), ChromeError> {
        self.add_script_with(href, priority, Attributes::new())
    }

    pub fn add_script_with(
        &mut self,
        href: &str,
        priority: Option<u8>,
        attrs: Attributes,
    ) -> Result<(), ChromeError> {
        let resource = self.resource(href, priority, attrs)?;
        log::debug!("chrome: script {} (priority {})", href, resource.priority);
        self.scripts.insert(href.to_string(), resource);
        Ok(())
    }

    pub fn remove_script(&mut self, href: &str) -> bool {
        self.scripts.shift_remove(href).is_some()
    }

    pub fn clear_scripts(&mut self) {
        self.scripts.clear();
    }

    /// Scripts in load order.
    pub fn scripts(&self) -> Vec<&Resource> {
        resource::sort_by_priority(self.scripts.values())
    }

    /// Register a stylesheet, optionally restricted to a media query.
    pub fn add_stylesheet(
        &mut self,
        href: &str,
        media: Option<&str>,
        priority: Option<u8>,
    ) -> Result<(), ChromeError> {
        let mut attrs = Attributes::new();
        if let Some(media) = media {
            attrs.insert("media", media);
        }
        let resource = self.resource(href, priority, attrs)?;
        log::debug!("chrome: stylesheet {} (priority {})", href, resource.priority);
        self.stylesheets.insert(href.to_string(), resource);
        Ok(())
    }

    /// Register a titled alternate stylesheet.
    pub fn add_alternate_stylesheet(
        &mut self,
        href: &str,
        title: &str,
        media: Option<&str>,
        priority: Option<u8>,
    ) -> Result<(), ChromeError> {
        let mut attrs = Attributes::new().with("title", title);
        if let Some(media) = media {
            attrs.insert("media", media);
        }
        let resource = self.resource(href, priority, attrs)?;
        self.alternate_stylesheets.insert(href.to_string(), resource);
        Ok(())
    }

    pub fn remove_stylesheet(&mut self, href: &str) -> bool {
        let main = self.stylesheets.shift_remove(href).is_some();
        let alternate = self.alternate_stylesheets.shift_remove(href).is_some();
        main || alternate
    }

    pub fn clear_stylesheets(&mut self) {
        self.stylesheets.clear();
        self.alternate_stylesheets.clear();
    }

    /// Stylesheets in load order.
    pub fn stylesheets(&self) -> Vec<&Resource> {
        resource::sort_by_priority(self.stylesheets.values())
    }

    pub fn alternate_stylesheets(&self) -> Vec<&Resource> {
        resource::sort_by_priority(self.alternate_stylesheets.values())
    }

    // ------------------------------------------------------------------
    // Icons, namespaces, headers
    // ------------------------------------------------------------------

    /// Register a favicon. The type is inferred from the extension when not
    /// given; one icon is kept per type.
    pub fn add_icon(&mut self, href: &str, mime: Option<&str>) -> Result<(), ChromeError> {
        let mime = match mime {
            Some(mime) => icon::normalize_mime(mime),
            None => icon::mime_from_href(href)
                .ok_or_else(|| ChromeError::UnknownIconType(href.to_string()))?
                .to_string(),
        };
        self.icons.insert(mime, href.to_string());
        Ok(())
    }

    pub fn remove_icon(&mut self, mime: &str) -> Option<String> {
        self.icons.shift_remove(&icon::normalize_mime(mime))
    }

    pub fn clear_icons(&mut self) {
        self.icons.clear();
    }

    pub fn icons(&self) -> &IndexMap<String, String> {
        &self.icons
    }

    /// Declare an XML namespace on the root element (XML syntax only).
    pub fn add_namespace(&mut self, prefix: &str, uri: &str) {
        self.namespaces.insert(prefix.to_string(), uri.to_string());
    }

    pub fn remove_namespace(&mut self, prefix: &str) -> Option<String> {
        self.namespaces.shift_remove(prefix)
    }

    pub fn clear_namespaces(&mut self) {
        self.namespaces.clear();
    }

    pub fn namespaces(&self) -> &IndexMap<String, String> {
        &self.namespaces
    }

    /// Add an HTTP response header. `Content-Type` is derived from the
    /// render context and cannot be set here.
    pub fn add_header(&mut self, name: &str, value: &str) {
        if name.eq_ignore_ascii_case("content-type") {
            log::warn!("ignoring Content-Type header; set it on the render context");
            return;
        }
        // Header names are case-insensitive; an existing entry keeps its spelling and slot
        match self.header_key(name) {
            Some(existing) => {
                self.headers.insert(existing, value.to_string());
            }
            None => {
                self.headers.insert(name.to_string(), value.to_string());
            }
        }
    }

    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        let key = self.header_key(name)?;
        self.headers.shift_remove(&key)
    }

    fn header_key(&self, name: &str) -> Option<String> {
        self.headers
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    pub fn set_response_code(&mut self, code: u16) -> Result<(), ChromeError> {
        if !(100..=599).contains(&code) {
            return Err(ChromeError::InvalidResponseCode(code));
        }
        self.response_code = code;
        Ok(())
    }

    pub fn response_code(&self) -> u16 {
        self.response_code
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Status and headers. `Content-Type` comes first.
    pub fn response_head(&self, ctx: &RenderContext) -> ResponseHead {
        let mut headers = vec![("Content-Type".to_string(), ctx.content_type_header())];
        headers.extend(
            self.headers
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );
        ResponseHead {
            status: self.response_code,
            headers,
        }
    }

    /// XML declaration (XML-syntax documents not served as `text/html`)
    /// followed by the doctype.
    pub fn render_preamble(&self, ctx: &RenderContext) -> Result<String, ChromeError> {
        let mut lines = Vec::new();
        if ctx.is_xml_syntax() && ctx.content_type() != "text/html" {
            lines.push(ctx.xml_declaration());
        }
        let doctype = ctx.doctype()?;
        if !doctype.is_empty() {
            lines.push(doctype.to_string());
        }
        Ok(lines.join("\n"))
    }

    fn html_attrs(&self, ctx: &RenderContext) -> Attributes {
        let mut attrs = Attributes::new();
        if ctx.language() == Language::Xhtml {
            attrs.insert("xmlns", XHTML_NAMESPACE);
        }
        if ctx.is_xml_syntax() {
            for (prefix, uri) in &self.namespaces {
                attrs.insert(&format!("xmlns:{prefix}"), uri.as_str());
            }
        }
        if let Some(lang) = &self.language {
            if ctx.is_xml_syntax() {
                attrs.insert("xml:lang", lang.as_str());
            }
            // XHTML 1.1 dropped the plain lang attribute
            let xhtml11 = ctx.language() == Language::Xhtml && ctx.version() > 1.0 && !ctx.is_html5();
            if !xhtml11 {
                attrs.insert("lang", lang.as_str());
            }
        }
        attrs
    }

    /// Opening `<html>` tag, optionally inside the IE class ladder.
    pub fn render_html_open(&self, ctx: &RenderContext) -> Result<String, ChromeError> {
        let attrs = self.html_attrs(ctx);
        let plain = tag::render_tag(ctx, "html", &attrs, Content::Open)?.into_string();
        if !self.ie_class_ladder {
            return Ok(plain);
        }
        let mut lines = Vec::new();
        for (expr, classes) in IE_CLASS_LADDER {
            let mut classed = attrs.clone();
            classed.add_class(classes);
            let open = tag::render_tag(ctx, "html", &classed, Content::Open)?;
            lines.push(tag::ie_conditional_comment(expr, &open.into_string(), false).into_string());
        }
        lines.push(tag::ie_conditional_comment("(gt IE 9)|!(IE)", &plain, true).into_string());
        Ok(lines.join("\n"))
    }

    /// Meta tags: the charset declaration first, then http-equiv, then named.
    pub fn render_meta(&self, ctx: &RenderContext) -> Result<Vec<Markup>, ChromeError> {
        let mut out = Vec::new();
        if let Some(charset) = ctx.charset() {
            out.push(tag::meta_charset(ctx, charset)?);
        }
        for (header, content) in &self.meta_http_equiv {
            out.push(tag::meta_http_equiv(ctx, header, content)?);
        }
        for (name, content) in &self.meta_named {
            out.push(tag::meta(ctx, name, content, &Attributes::new())?);
        }
        Ok(out)
    }

    /// `<title>` with the parts joined by the separator.
    pub fn render_title(&self, ctx: &RenderContext) -> Result<Markup, ChromeError> {
        let separator = escape_title(&self.title_separator);
        let text = self
            .title_parts
            .iter()
            .map(|part| escape_title(part))
            .collect::<Vec<_>>()
            .join(&separator);
        Ok(tag::render_tag(
            ctx,
            "title",
            &Attributes::new(),
            Content::Body(maud::PreEscaped(text)),
        )?)
    }

    pub fn render_links(&self, ctx: &RenderContext) -> Result<Vec<Markup>, ChromeError> {
        self.links
            .iter()
            .map(|l| tag::link(ctx, &l.rel, &l.href, None, &l.attrs).map_err(ChromeError::from))
            .collect()
    }

    fn groups<'a>(&self, sorted: &[&'a Resource]) -> Vec<ResourceGroup<'a>> {
        if self.group_ie_resources {
            resource::group_resources(sorted)
        } else {
            resource::ungrouped(sorted)
        }
    }

    fn render_groups(
        groups: &[ResourceGroup<'_>],
        mut render: impl FnMut(&Resource) -> Result<Markup, TagError>,
    ) -> Result<Vec<Markup>, ChromeError> {
        let mut out = Vec::new();
        for group in groups {
            let rendered = group
                .resources
                .iter()
                .map(|r| render(*r).map(Markup::into_string))
                .collect::<Result<Vec<_>, _>>()?;
            match group.condition {
                None => out.extend(rendered.into_iter().map(maud::PreEscaped)),
                Some(condition) => out.push(tag::ie_conditional_comment(
                    &condition.expression(),
                    &rendered.join("\n"),
                    false,
                )),
            }
        }
        Ok(out)
    }

    pub fn render_stylesheets(&self, ctx: &RenderContext) -> Result<Vec<Markup>, ChromeError> {
        let main = self.stylesheets();
        let mut out = Self::render_groups(&self.groups(&main), |r| {
            tag::link(ctx, "stylesheet", &r.href, Some("text/css"), &r.attrs)
        })?;
        let alternate = self.alternate_stylesheets();
        out.extend(Self::render_groups(&self.groups(&alternate), |r| {
            tag::link(ctx, "alternate stylesheet", &r.href, Some("text/css"), &r.attrs)
        })?);
        Ok(out)
    }

    pub fn render_scripts(&self, ctx: &RenderContext) -> Result<Vec<Markup>, ChromeError> {
        let sorted = self.scripts();
        Self::render_groups(&self.groups(&sorted), |r| tag::script(ctx, &r.href, &r.attrs))
    }

    pub fn render_icons(&self, ctx: &RenderContext) -> Result<Vec<Markup>, ChromeError> {
        Ok(icon::render_icons(ctx, &self.icons)?)
    }

    /// Render everything from the preamble down to `</head>`.
    pub fn render_head(&self, ctx: &RenderContext) -> Result<String, ChromeError> {
        let mut lines = Vec::new();
        let preamble = self.render_preamble(ctx)?;
        if !preamble.is_empty() {
            lines.push(preamble);
        }
        lines.push(self.render_html_open(ctx)?);
        lines.push("<head>".to_string());

        let mut head: Vec<Markup> = self.render_meta(ctx)?;
        head.push(self.render_title(ctx)?);
        head.extend(self.render_links(ctx)?);
        head.extend(self.render_stylesheets(ctx)?);
        head.extend(self.render_scripts(ctx)?);
        head.extend(self.render_icons(ctx)?);
        lines.extend(head.into_iter().map(Markup::into_string));

        lines.push("</head>".to_string());
        Ok(lines.join("\n"))
    }

    /// Response head and document head together.
    pub fn render(&self, ctx: &RenderContext) -> Result<RenderedHead, ChromeError> {
        Ok(RenderedHead {
            response: self.response_head(ctx),
            markup: self.render_head(ctx)?,
        })
    }

    pub fn render_body_open(&self, ctx: &RenderContext) -> Result<String, ChromeError> {
        Ok(tag::render_tag(ctx, "body", &self.body_attrs, Content::Open)?.into_string())
    }

    pub fn render_foot(&self) -> &'static str {
        "</body>\n</html>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextType;

    fn html5() -> RenderContext {
        RenderContext::create(ContextType::Html5)
    }

    fn strings(markup: Vec<Markup>) -> Vec<String> {
        markup.into_iter().map(Markup::into_string).collect()
    }

    #[test]
    fn title_uses_default_separator() {
        let mut chrome = Chrome::new();
        chrome.set_title(["Jerity", "test", "title"]);
        let out = chrome.render_title(&html5()).unwrap().into_string();
        assert_eq!(out, "<title>Jerity &raquo; test &raquo; title</title>");
    }

    #[test]
    fn title_parts_are_escaped() {
        let mut chrome = Chrome::new();
        chrome.set_title(["A & B"]);
        chrome.prepend_title("<Site>");
        chrome.set_title_separator(" | ");
        let out = chrome.render_title(&html5()).unwrap().into_string();
        assert_eq!(out, "<title>&lt;Site&gt; | A &amp; B</title>");
    }

    #[test]
    fn scripts_sorted_by_priority() {
        let mut chrome = Chrome::new();
        chrome.add_script("/fifty.js", Some(50)).unwrap();
        chrome.add_script("/five.js", Some(5)).unwrap();
        chrome.add_script("/fifteen.js", Some(15)).unwrap();
        let hrefs: Vec<&str> = chrome.scripts().iter().map(|r| r.href.as_str()).collect();
        assert_eq!(hrefs, ["/five.js", "/fifteen.js", "/fifty.js"]);
    }

    #[test]
    fn stylesheets_sorted_by_priority_with_stable_ties() {
        let mut chrome = Chrome::new();
        chrome.add_stylesheet("/a.css", None, Some(50)).unwrap();
        chrome.add_stylesheet("/b.css", None, Some(5)).unwrap();
        chrome.add_stylesheet("/c.css", None, Some(15)).unwrap();
        chrome.add_stylesheet("/d.css", None, Some(5)).unwrap();
        let hrefs: Vec<&str> = chrome.stylesheets().iter().map(|r| r.href.as_str()).collect();
        assert_eq!(hrefs, ["/b.css", "/d.css", "/c.css", "/a.css"]);
    }

    #[test]
    fn priority_out_of_range_is_error() {
        let mut chrome = Chrome::new();
        assert!(matches!(
            chrome.add_script("/x.js", Some(101)),
            Err(ChromeError::InvalidPriority(101))
        ));
        assert!(chrome.scripts().is_empty());
    }

    #[test]
    fn ie_scripts_are_wrapped_when_grouped() {
        let mut chrome = Chrome::new();
        chrome.add_script("/js/foo.ie.lte_8.js", None).unwrap();
        chrome.add_script("/js/bar.js", None).unwrap();
        let out = strings(chrome.render_scripts(&html5()).unwrap());
        assert_eq!(
            out,
            [
                r#"<script type="text/javascript" src="/js/bar.js"></script>"#,
                r#"<!--[if lte IE 8]><script type="text/javascript" src="/js/foo.ie.lte_8.js"></script><![endif]-->"#,
            ]
        );
    }

    #[test]
    fn ie_scripts_wrapped_individually_when_not_grouped() {
        let mut chrome = Chrome::new();
        chrome.set_group_ie_resources(false);
        chrome.add_script("/a.ie.js", Some(10)).unwrap();
        chrome.add_script("/b.js", Some(20)).unwrap();
        chrome.add_script("/c.ie.js", Some(30)).unwrap();
        let out = strings(chrome.render_scripts(&html5()).unwrap());
        assert_eq!(out.len(), 3);
        assert!(out[0].starts_with("<!--[if IE]>"));
        assert!(out[1].starts_with("<script"));
        assert!(out[2].starts_with("<!--[if IE]>"));
    }

    #[test]
    fn grouped_resources_share_one_comment() {
        let mut chrome = Chrome::new();
        chrome.add_stylesheet("/a.ie.css", None, None).unwrap();
        chrome.add_stylesheet("/b.ie.css", None, None).unwrap();
        let out = strings(chrome.render_stylesheets(&html5()).unwrap());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].matches("<link").count(), 2);
    }

    #[test]
    fn stylesheet_media_and_alternates() {
        let mut chrome = Chrome::new();
        chrome.add_stylesheet("/print.css", Some("print"), None).unwrap();
        chrome
            .add_alternate_stylesheet("/big.css", "Large text", None, None)
            .unwrap();
        let out = strings(chrome.render_stylesheets(&html5()).unwrap());
        assert_eq!(
            out,
            [
                r#"<link rel="stylesheet" href="/print.css" type="text/css" media="print">"#,
                r#"<link rel="alternate stylesheet" href="/big.css" type="text/css" title="Large text">"#,
            ]
        );
    }

    #[test]
    fn meta_charset_first() {
        let mut chrome = Chrome::new();
        chrome.add_meta("description", "A page");
        chrome.add_http_equiv("X-UA-Compatible", "IE=edge");
        let ctx = html5().with_charset("utf-8");
        let out = strings(chrome.render_meta(&ctx).unwrap());
        assert_eq!(
            out,
            [
                r#"<meta charset="utf-8">"#,
                r#"<meta http-equiv="X-UA-Compatible" content="IE=edge">"#,
                r#"<meta name="description" content="A page">"#,
            ]
        );
    }

    #[test]
    fn header_names_match_case_insensitively() {
        let mut chrome = Chrome::new();
        chrome.add_header("X-Foo", "1");
        chrome.add_header("Vary", "Accept");
        chrome.add_header("x-foo", "2");
        let head = chrome.response_head(&html5());
        assert_eq!(
            head.headers[1..],
            [
                ("X-Foo".to_string(), "2".to_string()),
                ("Vary".to_string(), "Accept".to_string()),
            ]
        );
        assert_eq!(chrome.remove_header("X-FOO"), Some("2".to_string()));
        assert_eq!(chrome.response_head(&html5()).headers.len(), 2);
    }

    #[test]
    fn response_head_puts_content_type_first() {
        let mut chrome = Chrome::new();
        chrome.add_header("X-Frame-Options", "DENY");
        chrome.add_header("content-type", "text/plain");
        chrome.set_response_code(404).unwrap();
        let head = chrome.response_head(&html5().with_charset("utf-8"));
        assert_eq!(head.status, 404);
        assert_eq!(head.status_line(), "HTTP/1.1 404 Not Found");
        assert_eq!(
            head.headers,
            [
                ("Content-Type".to_string(), "text/html; charset=utf-8".to_string()),
                ("X-Frame-Options".to_string(), "DENY".to_string()),
            ]
        );
    }

    #[test]
    fn invalid_response_code() {
        let mut chrome = Chrome::new();
        assert!(matches!(
            chrome.set_response_code(99),
            Err(ChromeError::InvalidResponseCode(99))
        ));
        assert_eq!(chrome.response_code(), 200);
    }

    #[test]
    fn xhtml_root_carries_namespaces_and_lang() {
        let mut chrome = Chrome::new();
        chrome.set_language(Some("en"));
        chrome.add_namespace("svg", "http://www.w3.org/2000/svg");
        let ctx = RenderContext::create(ContextType::Xhtml1Strict);
        assert_eq!(
            chrome.render_html_open(&ctx).unwrap(),
            r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:svg="http://www.w3.org/2000/svg" xml:lang="en" lang="en">"#
        );

        let ctx = RenderContext::create(ContextType::Xhtml11);
        assert!(!chrome.render_html_open(&ctx).unwrap().contains(" lang="));

        assert_eq!(chrome.render_html_open(&html5()).unwrap(), r#"<html lang="en">"#);
    }

    #[test]
    fn ie_class_ladder() {
        let mut chrome = Chrome::new();
        chrome.set_ie_class_ladder(true);
        let out = chrome.render_html_open(&html5()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            r#"<!--[if lt IE 7]><html class="ie ie6 lte9 lte8 lte7"><![endif]-->"#
        );
        assert_eq!(lines[4], "<!--[if (gt IE 9)|!(IE)]><!--><html><!--<![endif]-->");
    }

    #[test]
    fn preamble_for_xhtml_includes_xml_declaration() {
        let chrome = Chrome::new();
        let ctx = RenderContext::create(ContextType::Xhtml11);
        let preamble = chrome.render_preamble(&ctx).unwrap();
        assert!(preamble.starts_with("<?xml version=\"1.0\""));
        assert!(preamble.ends_with("xhtml11.dtd\">"));

        let compat = RenderContext::create(ContextType::Xhtml1Strict).with_compat_mode(true);
        assert!(chrome.render_preamble(&compat).unwrap().starts_with("<!DOCTYPE"));
    }

    #[test]
    fn head_phases_in_order() {
        let mut chrome = Chrome::new();
        chrome.set_title(["Home"]);
        chrome.add_link("canonical", "https://example.com/", Attributes::new());
        chrome.add_stylesheet("/s.css", None, None).unwrap();
        chrome.add_script("/a.js", None).unwrap();
        chrome.add_icon("/favicon.ico", None).unwrap();
        let head = chrome.render_head(&html5().with_charset("utf-8")).unwrap();

        let order = [
            "<!DOCTYPE html>",
            "<html>",
            "<head>",
            "<meta charset",
            "<title>",
            r#"rel="canonical""#,
            r#"rel="stylesheet""#,
            "<script",
            r#"rel="shortcut icon""#,
            "</head>",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| head.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{head}");
    }

    #[test]
    fn unknown_icon_type_is_error() {
        let mut chrome = Chrome::new();
        assert!(matches!(
            chrome.add_icon("/icon", None),
            Err(ChromeError::UnknownIconType(_))
        ));
        chrome.add_icon("/icon", Some("image/vnd.microsoft.icon")).unwrap();
        assert_eq!(chrome.icons().get(icon::ICO).map(String::as_str), Some("/icon"));
    }

    #[test]
    fn clear_resets_registries() {
        let mut chrome = Chrome::new();
        chrome.set_title(["x"]);
        chrome.add_script("/a.js", None).unwrap();
        chrome.add_meta("k", "v");
        chrome.add_icon("/i.png", None).unwrap();
        chrome.clear();
        assert!(chrome.title_parts().is_empty());
        assert!(chrome.scripts().is_empty());
        assert!(chrome.meta().is_empty());
        assert!(chrome.icons().is_empty());
    }

    #[test]
    fn re_adding_script_updates_in_place() {
        let mut chrome = Chrome::new();
        chrome.add_script("/a.js", Some(10)).unwrap();
        chrome.add_script("/b.js", Some(10)).unwrap();
        chrome.add_script("/a.js", Some(10)).unwrap();
        let hrefs: Vec<&str> = chrome.scripts().iter().map(|r| r.href.as_str()).collect();
        assert_eq!(hrefs, ["/a.js", "/b.js"]);
    }

    #[test]
    fn body_and_foot() {
        let mut chrome = Chrome::new();
        chrome.body_attrs_mut().add_class("home");
        assert_eq!(chrome.render_body_open(&html5()).unwrap(), r#"<body class="home">"#);
        assert_eq!(chrome.render_foot(), "</body>\n</html>");
    }
}
