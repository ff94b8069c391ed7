//! Favicon selection.
//!
//! Icons are registered per MIME type. Modern browsers pick from
//! `rel="icon"` links; old Internet Explorer only understands
//! `rel="shortcut icon"` with `type="image/x-icon"`. When no ICO has been
//! registered, the preferred icon is repeated in that form inside an IE-only
//! conditional comment.

use crate::context::RenderContext;
use crate::tag::{self, Attributes, TagError};
use indexmap::IndexMap;
use maud::Markup;

pub const ICO: &str = "image/x-icon";

/// Preference order when choosing the definitive icon.
pub const ICON_PREFERENCE: [&str; 4] = [ICO, "image/png", "image/gif", "image/jpeg"];

/// Canonical MIME type for an icon type name, folding common aliases.
pub fn normalize_mime(mime: &str) -> String {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/vnd.microsoft.icon" | "image/ico" | "image/icon" => ICO.to_string(),
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        other => other.to_string(),
    }
}

/// Infer an icon MIME type from the file extension of `href`.
pub fn mime_from_href(href: &str) -> Option<&'static str> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    let ext = path.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "ico" => Some(ICO),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

fn preference_rank(mime: &str) -> usize {
    ICON_PREFERENCE
        .iter()
        .position(|m| *m == mime)
        .unwrap_or(ICON_PREFERENCE.len())
}

/// Registered icons in preference order. Types outside the preference list
/// follow in registration order.
pub fn ordered(icons: &IndexMap<String, String>) -> Vec<(&str, &str)> {
    let mut ordered: Vec<(&str, &str)> = icons
        .iter()
        .map(|(mime, href)| (mime.as_str(), href.as_str()))
        .collect();
    ordered.sort_by_key(|(mime, _)| preference_rank(mime));
    ordered
}

/// Render the favicon links for the given registry (MIME type → href).
pub fn render_icons(
    ctx: &RenderContext,
    icons: &IndexMap<String, String>,
) -> Result<Vec<Markup>, TagError> {
    let ordered = ordered(icons);
    let mut out = Vec::with_capacity(ordered.len() + 1);
    for (mime, href) in &ordered {
        let rel = if *mime == ICO { "shortcut icon" } else { "icon" };
        out.push(tag::link(ctx, rel, href, Some(*mime), &Attributes::new())?);
    }
    if let Some((_, href)) = ordered.first().filter(|(mime, _)| *mime != ICO) {
        let fallback = tag::link(ctx, "shortcut icon", href, Some(ICO), &Attributes::new())?;
        out.push(tag::ie_conditional_comment(
            "IE",
            &fallback.into_string(),
            false,
        ));
    }
    Ok(out)
}
