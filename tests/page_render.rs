//! End-to-end page assembly through the public API: config → chrome →
//! content tree → full document.

use pagesmith::chrome::Chrome;
use pagesmith::config::{self, SiteConfig};
use pagesmith::content::{
    Column, Columns, Container, Layout, MarkdownContent, RenderError, Renderable, TextContent,
};
use pagesmith::context::{ContextType, RenderContext};
use pagesmith::nav::{NavItem, NavigationMenu};
use pagesmith::tag::Attributes;
use pagesmith::template::{Params, SiteTemplate};
use pagesmith::util::url::Url;
use std::fs;

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("missing {needle} in:\n{haystack}"))
}

#[test]
fn html5_page_from_layered_config() {
    let site = tempfile::TempDir::new().unwrap();
    let blog = site.path().join("blog");
    fs::create_dir_all(&blog).unwrap();
    fs::write(
        site.path().join(config::CONFIG_FILE),
        r#"
[page]
title = ["Example"]
icons = ["/favicon.ico"]

[[page.stylesheets]]
href = "/css/site.css"
priority = 10

[[page.scripts]]
href = "/js/app.js"
"#,
    )
    .unwrap();
    fs::write(
        blog.join(config::CONFIG_FILE),
        r#"
[chrome]
language = "en"

[[page.stylesheets]]
href = "/css/fix.ie.lte_8.css"
"#,
    )
    .unwrap();

    let cfg = config::load_layered_config(&[site.path(), blog.as_path()]).unwrap();
    let site = SiteTemplate::new(cfg);
    let ctx = site.context().unwrap();
    let mut chrome = site.chrome().unwrap();
    chrome.prepend_title("Hello");

    let mut params = Params::new();
    params.insert("content".into(), "<p>Body</p>".into());
    let page = site.render_page(&ctx, &chrome, "default", &params).unwrap();

    assert!(page.starts_with("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n"));
    assert!(page.contains(r#"<meta charset="utf-8">"#));
    assert!(page.contains("<title>Hello &raquo; Example</title>"));
    // Arrays are replaced by the inner layer, not appended
    assert!(!page.contains("/css/site.css"));
    assert!(page.contains(
        r#"<!--[if lte IE 8]><link rel="stylesheet" href="/css/fix.ie.lte_8.css" type="text/css"><![endif]-->"#
    ));
    assert!(page.contains(r#"<script type="text/javascript" src="/js/app.js"></script>"#));
    assert!(position(&page, "</head>") < position(&page, "<body>"));
    assert!(page.contains(r#"<div id="content"><p>Body</p></div>"#));
    assert!(page.ends_with("</body>\n</html>\n"));
}

#[test]
fn xhtml_page_uses_xml_syntax() {
    let mut cfg = SiteConfig::default();
    cfg.render.profile = "xhtml-1.0-strict".into();
    let site = SiteTemplate::new(cfg);
    let ctx = site.context().unwrap();
    let mut chrome = site.chrome().unwrap();
    chrome.set_title(["Doc"]);
    chrome.add_stylesheet("/s.css", None, None).unwrap();

    let head = chrome.render(&ctx).unwrap();
    assert_eq!(
        head.response.headers[0],
        (
            "Content-Type".to_string(),
            "application/xhtml+xml; charset=utf-8".to_string()
        )
    );
    let markup = head.markup;
    assert!(markup.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
    assert!(markup.contains("XHTML 1.0 Strict"));
    assert!(markup.contains(r#"<html xmlns="http://www.w3.org/1999/xhtml">"#));
    assert!(markup.contains(r#"<link rel="stylesheet" href="/s.css" type="text/css" />"#));
}

#[test]
fn compat_mode_serves_xhtml_as_html() {
    let ctx = RenderContext::create(ContextType::Xhtml1Strict)
        .with_charset("utf-8")
        .with_compat_mode(true);
    let chrome = Chrome::new();
    let head = chrome.render(&ctx).unwrap();
    assert_eq!(head.response.headers[0].1, "text/html; charset=utf-8");
    assert!(!head.markup.contains("<?xml"));
    assert!(head.markup.starts_with("<!DOCTYPE html PUBLIC"));
}

#[test]
fn sidebar_layout_with_menu_and_columns() {
    let site = SiteTemplate::new(SiteConfig::default());
    let ctx = site.context().unwrap();

    let mut menu = NavigationMenu::new()
        .with_attrs(Attributes::new().with("class", "nav"))
        .with_item(NavItem::new("Home", "/"))
        .with_item(NavItem::new("Docs", "/docs"));
    menu.set_current(Some(Url::parse("http://example.com/docs/intro", None).unwrap()));

    let columns = Columns::new()
        .with(Column::new(Some(60.0)).with(MarkdownContent::new("# Intro")))
        .with(Column::new(Some(40.0)).with(TextContent::new("a < b")));

    let mut layout = Layout::from_registry(site.registry(), "layout/sidebar").unwrap();
    layout.add("main", columns);
    layout.add("sidebar", menu);
    let body = layout.render(&ctx).unwrap().into_string();

    assert!(body.starts_with(r#"<div id="layout">"#));
    assert!(position(&body, r#"<div id="main">"#) < position(&body, r#"<div id="sidebar">"#));
    assert!(body.contains(r#"<div class="columns columns-2">"#));
    assert!(body.contains(r#"<div class="column column-1" style="width: 60%"><h1>Intro</h1></div>"#));
    assert!(body.contains("a &lt; b"));
    assert!(body.contains(r#"<li class="current"><a href="/docs">Docs</a></li>"#));
}

#[test]
fn overfull_columns_fail_the_page() {
    let ctx = RenderContext::default();
    let columns = Columns::new()
        .with(Column::new(Some(70.0)))
        .with(Column::new(Some(40.0)));
    let wrapper = Container::wrapped("section", Attributes::new()).with(columns);
    assert!(matches!(wrapper.render(&ctx), Err(RenderError::Layout(_))));
}

#[test]
fn unknown_body_template_is_reported() {
    let site = SiteTemplate::new(SiteConfig::default());
    let ctx = site.context().unwrap();
    let chrome = site.chrome().unwrap();
    let err = site
        .render_page(&ctx, &chrome, "layout/missing", &Params::new())
        .unwrap_err();
    assert!(matches!(err, RenderError::Template(_)));
}
