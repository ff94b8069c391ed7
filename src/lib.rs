//! # Pagesmith
//!
//! Server-side assembly of HTML and XHTML pages. A page is rendered against a
//! [`context::RenderContext`] that decides the doctype, the content type and
//! whether XML syntax rules apply, and a [`chrome::Chrome`] that collects
//! everything going into `<head>` while the page is built.
//!
//! # Rendering Flow
//!
//! ```text
//! 1. Configure   pagesmith.toml   →  SiteConfig     (profile, chrome defaults)
//! 2. Collect     handlers         →  Chrome         (title, meta, scripts, css)
//! 3. Compose     content tree     →  Markup         (layouts, columns, menus)
//! 4. Emit        PageTemplate     →  String         (head + body + foot)
//! ```
//!
//! Nothing is process-global: a chrome and a context are ordinary values
//! owned by the request that builds the page.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`context`] | Render profiles, doctypes, content types, the context stack |
//! | [`tag`] | Single-element renderer: void elements, boolean attributes, CDATA masks |
//! | [`chrome`] | Head aggregator: priority sorting, IE conditional groups, favicon fallback |
//! | [`content`] | The `Renderable` trait, text/markdown leaves, containers, columns, layouts |
//! | [`template`] | Named body templates, the page template, built-in layouts |
//! | [`nav`] | Navigation menus with best-match highlighting |
//! | [`config`] | `pagesmith.toml` loading, layering and validation |
//! | [`util`] | URLs, inflection, byte sizes, nested-array helpers, string helpers |
//! | [`output`] | CLI report formatting |
//!
//! # Design Decisions
//!
//! ## Maud for Markup
//!
//! Fragments are [`maud::Markup`]: escaped by default, with
//! [`maud::PreEscaped`] marking the places where already-rendered HTML is
//! spliced in. Element rendering itself goes through [`tag::render_tag`]
//! because the same element must come out differently in HTML 4 and XHTML
//! (`<br>` versus `<br />`, `checked` versus `checked="checked"`).
//!
//! ## Priorities, Then Conditions
//!
//! Scripts and stylesheets are sorted by a 0-100 priority (stable, so equal
//! priorities keep registration order). Files named like `fix.ie.lte_8.css`
//! are then pulled out into one conditional-comment block per condition, so
//! a page with ten IE fixes emits a handful of `<!--[if ...]>` blocks rather
//! than ten.
//!
//! ## Config Layering
//!
//! `pagesmith.toml` files layer outermost first over the stock defaults, the
//! same way a site root and a section directory would:
//!
//! ```text
//! site/pagesmith.toml          ← root (overrides stock defaults)
//! site/blog/pagesmith.toml     ← section (overrides root)
//! ```

pub mod chrome;
pub mod config;
pub mod content;
pub mod context;
pub mod nav;
pub mod output;
pub mod tag;
pub mod template;
pub mod util;
