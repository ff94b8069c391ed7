//! Page content: things that render to markup for a context.
//!
//! Everything placed in a page body implements [`Renderable`]. Leaf types
//! wrap text ([`TextContent`]), trusted markup ([`RawContent`]) or Markdown
//! ([`MarkdownContent`]). [`Container`], [`Columns`] and [`Layout`] arrange
//! other renderables.

use crate::chrome::ChromeError;
use crate::config::ConfigError;
use crate::context::{ContextError, RenderContext};
use crate::tag::{self, Attributes, Content, TagError};
use crate::template::{Params, Template, TemplateError, TemplateRegistry};
use crate::util::number::compare;
use crate::util::url::UrlError;
use indexmap::IndexMap;
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Render context error: {0}")]
    Context(#[from] ContextError),
    #[error("Tag error: {0}")]
    Tag(#[from] TagError),
    #[error("Chrome error: {0}")]
    Chrome(#[from] ChromeError),
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),
    #[error("URL error: {0}")]
    Url(#[from] UrlError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Layout error: {0}")]
    Layout(String),
}

pub trait Renderable {
    fn render(&self, ctx: &RenderContext) -> Result<Markup, RenderError>;
}

impl Renderable for Markup {
    fn render(&self, _ctx: &RenderContext) -> Result<Markup, RenderError> {
        Ok(self.clone())
    }
}

impl<T: Renderable + ?Sized> Renderable for Box<T> {
    fn render(&self, ctx: &RenderContext) -> Result<Markup, RenderError> {
        (**self).render(ctx)
    }
}

/// Plain text, escaped on output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContent(pub String);

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl Renderable for TextContent {
    fn render(&self, _ctx: &RenderContext) -> Result<Markup, RenderError> {
        Ok(html! { (self.0) })
    }
}

/// Markup inserted verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent(pub String);

impl RawContent {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }
}

impl Renderable for RawContent {
    fn render(&self, _ctx: &RenderContext) -> Result<Markup, RenderError> {
        Ok(PreEscaped(self.0.clone()))
    }
}

/// CommonMark source converted to HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownContent(pub String);

impl MarkdownContent {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }
}

impl Renderable for MarkdownContent {
    fn render(&self, _ctx: &RenderContext) -> Result<Markup, RenderError> {
        let parser = Parser::new(&self.0);
        let mut body_html = String::new();
        md_html::push_html(&mut body_html, parser);
        Ok(PreEscaped(body_html.trim_end().to_string()))
    }
}

/// Ordered children, optionally wrapped in an element.
#[derive(Default)]
pub struct Container {
    tag: Option<(String, Attributes)>,
    children: Vec<Box<dyn Renderable>>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// A container rendered inside `<name attrs…>`.
    pub fn wrapped(name: &str, attrs: Attributes) -> Self {
        Self {
            tag: Some((name.to_string(), attrs)),
            children: Vec::new(),
        }
    }

    pub fn push(&mut self, child: impl Renderable + 'static) -> &mut Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn with(mut self, child: impl Renderable + 'static) -> Self {
        self.push(child);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

fn render_children(ctx: &RenderContext, children: &[Box<dyn Renderable>]) -> Result<String, RenderError> {
    let mut out = String::new();
    for child in children {
        out.push_str(&child.render(ctx)?.into_string());
    }
    Ok(out)
}

impl Renderable for Container {
    fn render(&self, ctx: &RenderContext) -> Result<Markup, RenderError> {
        let inner = PreEscaped(render_children(ctx, &self.children)?);
        match &self.tag {
            None => Ok(inner),
            Some((name, attrs)) => Ok(tag::render_tag(ctx, name, attrs, Content::Body(inner))?),
        }
    }
}

/// One column of a [`Columns`] block.
#[derive(Default)]
pub struct Column {
    /// Percentage of the row, if fixed.
    pub width: Option<f64>,
    children: Vec<Box<dyn Renderable>>,
}

impl Column {
    pub fn new(width: Option<f64>) -> Self {
        Self {
            width,
            children: Vec::new(),
        }
    }

    pub fn with(mut self, child: impl Renderable + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }
}

/// Side-by-side columns:
///
/// ```html
/// <div class="columns columns-2">
///   <div class="column column-1" style="width: 60%">…</div>
///   <div class="column column-2">…</div>
/// </div>
/// ```
///
/// Fixed widths must add up to at most 100%.
#[derive(Default)]
pub struct Columns {
    columns: Vec<Column>,
}

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn push(&mut self, column: Column) -> &mut Self {
        self.columns.push(column);
        self
    }

    pub fn total_width(&self) -> f64 {
        self.columns.iter().filter_map(|c| c.width).sum()
    }

    fn check_widths(&self) -> Result<(), RenderError> {
        if let Some(bad) = self
            .columns
            .iter()
            .filter_map(|c| c.width)
            .find(|w| !w.is_finite() || *w < 0.0)
        {
            return Err(RenderError::Layout(format!("invalid column width {bad}")));
        }
        let total = self.total_width();
        if compare(total, 100.0, 1e-6) == Ordering::Greater {
            return Err(RenderError::Layout(format!(
                "column widths add up to {total}%, more than 100%"
            )));
        }
        Ok(())
    }
}

impl Renderable for Columns {
    fn render(&self, ctx: &RenderContext) -> Result<Markup, RenderError> {
        self.check_widths()?;
        let mut inner = Vec::with_capacity(self.columns.len());
        for (i, column) in self.columns.iter().enumerate() {
            let mut attrs = Attributes::new().with("class", format!("column column-{}", i + 1));
            if let Some(width) = column.width {
                attrs.insert("style", format!("width: {width}%"));
            }
            let body = PreEscaped(render_children(ctx, &column.children)?);
            inner.push(tag::render_tag(ctx, "div", &attrs, Content::Body(body))?.into_string());
        }
        let attrs = Attributes::new().with("class", format!("columns columns-{}", self.columns.len()));
        Ok(tag::render_tag(ctx, "div", &attrs, Content::Body(PreEscaped(inner.join("\n"))))?)
    }
}

/// Named regions rendered through a template.
///
/// Each region's markup becomes a template parameter of the same name,
/// alongside any extra parameters set with [`Layout::set_param`].
pub struct Layout {
    template: Template,
    regions: IndexMap<String, Vec<Box<dyn Renderable>>>,
    params: Params,
}

impl Layout {
    pub fn new(template: Template) -> Self {
        Self {
            template,
            regions: IndexMap::new(),
            params: Params::new(),
        }
    }

    /// A layout using the registry's template `name`.
    pub fn from_registry(registry: &TemplateRegistry, name: &str) -> Result<Self, TemplateError> {
        Ok(Self::new(registry.resolve(name)?.clone()))
    }

    pub fn template_name(&self) -> &str {
        self.template.name()
    }

    /// Append a renderable to `region`.
    pub fn add(&mut self, region: &str, child: impl Renderable + 'static) -> &mut Self {
        self.regions
            .entry(region.to_string())
            .or_default()
            .push(Box::new(child));
        self
    }

    pub fn clear_region(&mut self, region: &str) {
        self.regions.shift_remove(region);
    }

    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn set_param(&mut self, key: &str, value: Value) -> &mut Self {
        self.params.insert(key.to_string(), value);
        self
    }
}

impl Renderable for Layout {
    fn render(&self, ctx: &RenderContext) -> Result<Markup, RenderError> {
        let mut params = self.params.clone();
        for (name, children) in &self.regions {
            params.insert(name.clone(), Value::String(render_children(ctx, children)?));
        }
        self.template.render(ctx, &params)
    }
}
