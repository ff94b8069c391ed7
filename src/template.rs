//! Named templates and the page/site templates built on them.
//!
//! A template is a render function plus default parameters, registered
//! under a slash-separated name (`default`, `layout/sidebar`). Parameters
//! are a JSON object; values given at render time replace the defaults key
//! by key.
//!
//! Parameters that carry already-rendered markup (layout regions, page
//! content) are plain strings and are inserted without escaping. Everything
//! else should go through [`param_text`], which escapes.

use crate::chrome::Chrome;
use crate::config::SiteConfig;
use crate::content::RenderError;
use crate::context::RenderContext;
use crate::tag::{self, Attributes, Content};
use crate::util::string::escape_html;
use indexmap::IndexMap;
use maud::{Markup, PreEscaped};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub type Params = Map<String, Value>;

type RenderFn = dyn Fn(&RenderContext, &Params) -> Result<Markup, RenderError> + Send + Sync;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("Template not found: {0:?}")]
    NotFound(String),
    #[error("Invalid template name: {0:?}")]
    InvalidName(String),
    #[error("Template {template:?} requires parameter {param:?}")]
    MissingParam { template: String, param: String },
}

/// Check a template name: non-empty `/`-separated segments, no `..`, no
/// leading slash, no backslashes.
pub fn validate_name(name: &str) -> Result<(), TemplateError> {
    let invalid = name.starts_with('/')
        || name.contains('\\')
        || name.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if invalid {
        return Err(TemplateError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct Template {
    name: String,
    render_fn: Arc<RenderFn>,
    defaults: Params,
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.name)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Template {
    pub fn new<F>(name: &str, render_fn: F, defaults: Params) -> Result<Self, TemplateError>
    where
        F: Fn(&RenderContext, &Params) -> Result<Markup, RenderError> + Send + Sync + 'static,
    {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            render_fn: Arc::new(render_fn),
            defaults,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn defaults(&self) -> &Params {
        &self.defaults
    }

    /// Defaults with `params` laid over them.
    pub fn merged_params(&self, params: &Params) -> Params {
        let mut merged = self.defaults.clone();
        for (key, value) in params {
            merged.insert(key.clone(), value.clone());
        }
        merged
    }

    pub fn render(&self, ctx: &RenderContext, params: &Params) -> Result<Markup, RenderError> {
        (self.render_fn)(ctx, &self.merged_params(params))
    }
}

/// Templates by name.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: IndexMap<String, Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a template.
    pub fn register<F>(&mut self, name: &str, render_fn: F, defaults: Params) -> Result<(), TemplateError>
    where
        F: Fn(&RenderContext, &Params) -> Result<Markup, RenderError> + Send + Sync + 'static,
    {
        let template = Template::new(name, render_fn, defaults)?;
        log::debug!("template: registered {name}");
        self.templates.insert(name.to_string(), template);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<&Template, TemplateError> {
        validate_name(name)?;
        log::debug!("template: resolving {name}");
        self.templates
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    pub fn remove(&mut self, name: &str) -> Option<Template> {
        self.templates.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// A markup parameter, inserted as-is. Missing or null is empty.
pub fn param_markup(params: &Params, key: &str) -> Markup {
    match params.get(key) {
        Some(Value::String(s)) => PreEscaped(s.clone()),
        Some(Value::Null) | None => PreEscaped(String::new()),
        Some(other) => PreEscaped(escape_html(&other.to_string())),
    }
}

/// A text parameter, escaped.
pub fn param_text(params: &Params, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(escape_html(s)),
        other => Some(escape_html(&other.to_string())),
    }
}

/// Like [`param_markup`] but the key must be present.
pub fn require_markup(template: &str, params: &Params, key: &str) -> Result<Markup, TemplateError> {
    if !params.contains_key(key) {
        return Err(TemplateError::MissingParam {
            template: template.to_string(),
            param: key.to_string(),
        });
    }
    Ok(param_markup(params, key))
}

fn region(ctx: &RenderContext, id: &str, body: Markup) -> Result<Markup, RenderError> {
    let attrs = Attributes::new().with("id", id);
    Ok(tag::render_tag(ctx, "div", &attrs, Content::Body(body))?)
}

/// `<div id="content">` around the `content` parameter.
fn default_template(ctx: &RenderContext, params: &Params) -> Result<Markup, RenderError> {
    region(ctx, "content", require_markup("default", params, "content")?)
}

/// Main column plus sidebar. `sidebar_first` puts the sidebar before the
/// main region in source order.
fn sidebar_template(ctx: &RenderContext, params: &Params) -> Result<Markup, RenderError> {
    let main = region(ctx, "main", require_markup("layout/sidebar", params, "main")?)?;
    let sidebar = region(ctx, "sidebar", param_markup(params, "sidebar"))?;
    let first = params
        .get("sidebar_first")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let body = if first {
        format!("{}\n{}", sidebar.into_string(), main.into_string())
    } else {
        format!("{}\n{}", main.into_string(), sidebar.into_string())
    };
    region(ctx, "layout", PreEscaped(body))
}

/// Header, main and footer stacked vertically. Empty regions are skipped.
fn stacked_template(ctx: &RenderContext, params: &Params) -> Result<Markup, RenderError> {
    let mut parts = Vec::new();
    for id in ["header", "main", "footer"] {
        let body = param_markup(params, id);
        if id == "main" || !body.0.is_empty() {
            parts.push(region(ctx, id, body)?.into_string());
        }
    }
    Ok(PreEscaped(parts.join("\n")))
}

/// A full document: chrome head, a body template, chrome foot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTemplate {
    body_template: String,
}

impl PageTemplate {
    pub fn new(body_template: &str) -> Result<Self, TemplateError> {
        validate_name(body_template)?;
        Ok(Self {
            body_template: body_template.to_string(),
        })
    }

    pub fn body_template(&self) -> &str {
        &self.body_template
    }

    pub fn render(
        &self,
        ctx: &RenderContext,
        chrome: &Chrome,
        registry: &TemplateRegistry,
        params: &Params,
    ) -> Result<String, RenderError> {
        let body = registry.resolve(&self.body_template)?.render(ctx, params)?;
        let mut out = chrome.render_head(ctx)?;
        out.push('\n');
        out.push_str(&chrome.render_body_open(ctx)?);
        out.push('\n');
        out.push_str(&body.into_string());
        out.push('\n');
        out.push_str(chrome.render_foot());
        out.push('\n');
        Ok(out)
    }
}

/// Names of the templates every [`SiteTemplate`] starts with.
pub const BUILTIN_TEMPLATES: [&str; 3] = ["default", "layout/sidebar", "layout/stacked"];

/// A registry preloaded with the built-in templates, plus the site's
/// render profile and shared head content.
#[derive(Debug, Clone)]
pub struct SiteTemplate {
    config: SiteConfig,
    registry: TemplateRegistry,
}

impl SiteTemplate {
    pub fn new(config: SiteConfig) -> Self {
        let mut registry = TemplateRegistry::new();
        let builtins: [(&str, fn(&RenderContext, &Params) -> Result<Markup, RenderError>); 3] = [
            ("default", default_template),
            ("layout/sidebar", sidebar_template),
            ("layout/stacked", stacked_template),
        ];
        for (name, render_fn) in builtins {
            registry
                .templates
                .insert(name.to_string(), Template {
                    name: name.to_string(),
                    render_fn: Arc::new(render_fn),
                    defaults: Params::new(),
                });
        }
        Self { config, registry }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.registry
    }

    /// The default render context for pages of this site.
    pub fn context(&self) -> Result<RenderContext, RenderError> {
        Ok(self.config.render.context()?)
    }

    /// A fresh chrome carrying the site's head content.
    pub fn chrome(&self) -> Result<Chrome, RenderError> {
        let mut chrome = Chrome::from_config(&self.config.chrome);
        self.config.page.apply(&mut chrome)?;
        Ok(chrome)
    }

    /// Render a full page through the body template `template`.
    pub fn render_page(
        &self,
        ctx: &RenderContext,
        chrome: &Chrome,
        template: &str,
        params: &Params,
    ) -> Result<String, RenderError> {
        PageTemplate::new(template)?.render(ctx, chrome, &self.registry, params)
    }
}
