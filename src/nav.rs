//! Navigation menus with current-page highlighting.
//!
//! The item that best matches the current URL gets `class="current"` on its
//! `<li>`; every ancestor of it gets `class="current-parent"`.
//!
//! ## Scoring
//!
//! Item URLs are resolved against the current URL, so `/blog` and
//! `?page=2` work as item links. Then:
//!
//! - different scheme, host or port: no match
//! - same path: path length + 1000
//! - item path is a prefix of the current path ending on a segment
//!   boundary (`/blog` for `/blog/post`, not `/blo`): path length
//! - each item query pair also present in the current URL: +1
//! - an item query pair missing or different in the current URL: no match
//!
//! The highest score wins. On a tie the item that comes first in document
//! order wins.

use crate::content::{RenderError, Renderable};
use crate::context::RenderContext;
use crate::tag::{self, Attributes, Content};
use crate::util::url::{Url, UrlError};
use maud::{Markup, PreEscaped};

const EXACT_MATCH_BONUS: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub label: String,
    pub url: String,
    pub children: Vec<NavItem>,
    /// Extra attributes for the item's `<a>`.
    pub attrs: Attributes,
}

impl NavItem {
    pub fn new(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
            children: Vec::new(),
            attrs: Attributes::new(),
        }
    }

    pub fn with_child(mut self, child: NavItem) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }
}

fn trim_path(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// How well `item` matches `current`; `None` for no match.
pub fn match_score(item: &Url, current: &Url) -> Option<usize> {
    if item.scheme() != current.scheme() || item.host() != current.host() || item.port() != current.port() {
        return None;
    }
    let item_path = trim_path(item.path());
    let current_path = trim_path(current.path());
    let mut score = if item_path == current_path {
        item_path.len() + EXACT_MATCH_BONUS
    } else if item_path == "/" {
        1
    } else if current_path
        .strip_prefix(item_path)
        .is_some_and(|rest| rest.starts_with('/'))
    {
        item_path.len()
    } else {
        return None;
    };
    for (key, value) in item.query() {
        if current.query_value(key) != Some(value) {
            return None;
        }
        score += 1;
    }
    Some(score)
}

/// A tree of [`NavItem`]s rendered as nested lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationMenu {
    items: Vec<NavItem>,
    attrs: Attributes,
    current: Option<Url>,
}

impl NavigationMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes for the outer `<ul>`.
    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn with_item(mut self, item: NavItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn push(&mut self, item: NavItem) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    /// Set the URL used for highlighting when rendered as a [`Renderable`].
    pub fn set_current(&mut self, current: Option<Url>) {
        self.current = current;
    }

    /// Index path (top level first) of the best matching item.
    pub fn best_match(&self, current: &Url) -> Result<Option<Vec<usize>>, UrlError> {
        let mut best: Option<(usize, Vec<usize>)> = None;
        let mut trail = Vec::new();
        best_in(&self.items, current, &mut trail, &mut best)?;
        Ok(best.map(|(_, path)| path))
    }

    /// Render with highlighting for `current`, or none without one.
    pub fn render_for(&self, ctx: &RenderContext, current: Option<&Url>) -> Result<Markup, RenderError> {
        let matched = match current {
            Some(url) => self.best_match(url)?,
            None => None,
        };
        let mut trail = Vec::new();
        render_list(ctx, &self.items, &self.attrs, matched.as_deref(), &mut trail)
    }
}

impl Renderable for NavigationMenu {
    fn render(&self, ctx: &RenderContext) -> Result<Markup, RenderError> {
        self.render_for(ctx, self.current.as_ref())
    }
}

fn best_in(
    items: &[NavItem],
    current: &Url,
    trail: &mut Vec<usize>,
    best: &mut Option<(usize, Vec<usize>)>,
) -> Result<(), UrlError> {
    for (i, item) in items.iter().enumerate() {
        trail.push(i);
        let url = Url::parse(&item.url, Some(current))?;
        if let Some(score) = match_score(&url, current) {
            // Strictly greater keeps the earlier item on ties
            if best.as_ref().is_none_or(|(top, _)| score > *top) {
                *best = Some((score, trail.clone()));
            }
        }
        best_in(&item.children, current, trail, best)?;
        trail.pop();
    }
    Ok(())
}

fn render_list(
    ctx: &RenderContext,
    items: &[NavItem],
    attrs: &Attributes,
    matched: Option<&[usize]>,
    trail: &mut Vec<usize>,
) -> Result<Markup, RenderError> {
    let mut lis = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        trail.push(i);
        let mut li_attrs = Attributes::new();
        if let Some(matched) = matched {
            if matched == trail.as_slice() {
                li_attrs.add_class("current");
            } else if matched.starts_with(trail.as_slice()) {
                li_attrs.add_class("current-parent");
            }
        }
        let mut body = tag::a(ctx, &item.url, item.label.as_str(), &item.attrs)?.into_string();
        if !item.children.is_empty() {
            let nested = render_list(ctx, &item.children, &Attributes::new(), matched, trail)?;
            body.push_str(&nested.into_string());
        }
        lis.push(tag::render_tag(ctx, "li", &li_attrs, Content::Body(PreEscaped(body)))?.into_string());
        trail.pop();
    }
    Ok(tag::render_tag(ctx, "ul", attrs, Content::Body(PreEscaped(lis.join("\n"))))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextType;

    fn url(s: &str) -> Url {
        Url::parse(s, None).unwrap()
    }

    fn score(item: &str, current: &str) -> Option<usize> {
        let current = url(current);
        match_score(&Url::parse(item, Some(&current)).unwrap(), &current)
    }

    fn menu() -> NavigationMenu {
        NavigationMenu::new()
            .with_item(NavItem::new("Home", "/"))
            .with_item(
                NavItem::new("Blog", "/blog")
                    .with_child(NavItem::new("2024", "/blog/2024"))
                    .with_child(NavItem::new("Drafts", "/blog?drafts=1")),
            )
            .with_item(NavItem::new("About", "/about"))
    }

    #[test]
    fn exact_path_scores_highest() {
        assert_eq!(score("/blog", "http://h/blog"), Some(5 + 1000));
        assert_eq!(score("/blog/", "http://h/blog"), Some(5 + 1000));
        assert_eq!(score("/blog", "http://h/blog/post"), Some(5));
        assert_eq!(score("/", "http://h/blog"), Some(1));
    }

    #[test]
    fn prefix_must_end_on_segment_boundary() {
        assert_eq!(score("/blo", "http://h/blog"), None);
    }

    #[test]
    fn origin_mismatch_never_matches() {
        assert_eq!(score("https://h/blog", "http://h/blog"), None);
        assert_eq!(score("http://other/blog", "http://h/blog"), None);
    }

    #[test]
    fn query_pairs_add_or_disqualify() {
        assert_eq!(score("/list?tag=a", "http://h/list?tag=a&page=2"), Some(5 + 1000 + 1));
        assert_eq!(score("/list?tag=b", "http://h/list?tag=a"), None);
        assert_eq!(score("/list?tag=a", "http://h/list"), None);
    }

    #[test]
    fn best_match_finds_deepest_exact() {
        let m = menu();
        assert_eq!(m.best_match(&url("http://h/blog/2024/05")).unwrap(), Some(vec![1, 0]));
        assert_eq!(m.best_match(&url("http://h/blog")).unwrap(), Some(vec![1]));
        assert_eq!(m.best_match(&url("http://h/blog?drafts=1")).unwrap(), Some(vec![1, 1]));
        assert_eq!(m.best_match(&url("http://h/contact")).unwrap(), Some(vec![0]));
        assert_eq!(m.best_match(&url("http://elsewhere.org/x")).unwrap(), Some(vec![0]));
    }

    #[test]
    fn ties_keep_first_item() {
        let m = NavigationMenu::new()
            .with_item(NavItem::new("One", "/same"))
            .with_item(NavItem::new("Two", "/same"));
        assert_eq!(m.best_match(&url("http://h/same")).unwrap(), Some(vec![0]));
    }

    #[test]
    fn renders_nested_list_with_classes() {
        let ctx = RenderContext::create(ContextType::Html5);
        let m = menu().with_attrs(Attributes::new().with("class", "nav"));
        let html = m
            .render_for(&ctx, Some(&url("http://h/blog/2024")))
            .unwrap()
            .into_string();
        assert!(html.starts_with(r#"<ul class="nav"><li><a href="/">Home</a></li>"#));
        assert!(html.contains(r#"<li class="current-parent"><a href="/blog">Blog</a><ul>"#));
        assert!(html.contains(r#"<li class="current"><a href="/blog/2024">2024</a></li>"#));
        assert_eq!(html.matches("current").count(), 2);
    }

    #[test]
    fn renders_without_current() {
        let ctx = RenderContext::create(ContextType::Html5);
        let html = menu().render(&ctx).unwrap().into_string();
        assert!(!html.contains("current"));
        assert!(html.contains(r#"<a href="/blog?drafts=1">Drafts</a>"#));
    }

    #[test]
    fn labels_are_escaped() {
        let ctx = RenderContext::create(ContextType::Html5);
        let m = NavigationMenu::new().with_item(NavItem::new("Q&A", "/qa"));
        let html = m.render(&ctx).unwrap().into_string();
        assert!(html.contains(">Q&amp;A</a>"));
    }

    #[test]
    fn bad_item_url_is_an_error() {
        let ctx = RenderContext::create(ContextType::Html5);
        let m = NavigationMenu::new().with_item(NavItem::new("Bad", "http://"));
        assert!(matches!(
            m.render_for(&ctx, Some(&url("http://h/"))),
            Err(RenderError::Url(_))
        ));
    }
}
