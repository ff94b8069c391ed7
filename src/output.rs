//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Plan
//!
//! The load plan shows what the head will contain, in emission order, with
//! IE conditional groups as indented blocks:
//!
//! ```text
//! Profile: html-5 (text/html; charset=utf-8)
//! Title: Post » Blog
//!
//! Stylesheets
//! 001 /css/site.css [10]
//! 002 /css/print.css [50] media=print
//!     [if lte IE 8]
//!     001 /css/fix.ie.lte_8.css [50]
//!
//! Scripts
//! 001 /js/app.js [50]
//!
//! Icons
//! 001 /favicon.ico (image/x-icon)
//! ```
//!
//! ## Doctype
//!
//! ```text
//! Profile:      xhtml-1.0-strict
//! Doctype:      <!DOCTYPE html PUBLIC ...>
//! Content-Type: application/xhtml+xml
//! XML syntax:   yes
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::chrome::icon;
use crate::chrome::resource::{self, Resource, ResourceGroup};
use crate::chrome::{Chrome, ResponseHead};
use crate::context::{ContextError, ContextType, RenderContext};
use crate::tag::AttrValue;
use crate::util::number::{BytePrefix, format_bytes};
use crate::util::string::truncate;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// One resource line: position, href, priority, then any attributes.
///
/// ```text
/// 002 /css/print.css [50] media=print
/// ```
fn resource_line(depth: usize, index: usize, resource: &Resource) -> String {
    let mut line = format!(
        "{}{} {} [{}]",
        indent(depth),
        format_index(index),
        resource.href,
        resource.priority
    );
    for (key, value) in resource.attrs.iter() {
        match value {
            AttrValue::Text(text) => line.push_str(&format!(" {key}={text}")),
            AttrValue::Flag(true) => line.push_str(&format!(" {key}")),
            AttrValue::Flag(false) => {}
        }
    }
    line
}

fn group_lines(groups: &[ResourceGroup<'_>]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut position = 0;
    for group in groups {
        match group.condition {
            None => {
                for resource in &group.resources {
                    position += 1;
                    lines.push(resource_line(0, position, resource));
                }
            }
            Some(condition) => {
                lines.push(format!("{}[if {}]", indent(1), condition.expression()));
                for (i, resource) in group.resources.iter().enumerate() {
                    lines.push(resource_line(1, i + 1, resource));
                }
            }
        }
    }
    lines
}

fn section(lines: &mut Vec<String>, title: &str, body: Vec<String>) {
    if body.is_empty() {
        return;
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(title.to_string());
    lines.extend(body);
}

// ============================================================================
// Plan
// ============================================================================

/// Format the head load plan for a chrome: title, then stylesheets, scripts
/// and icons in the order they will be emitted.
pub fn format_plan(chrome: &Chrome, ctx: &RenderContext) -> Vec<String> {
    let mut lines = vec![format!("Profile: {}", profile_summary(ctx))];
    if !chrome.title_parts().is_empty() {
        lines.push(format!(
            "Title: {}",
            truncate(&chrome.title_parts().join(chrome.title_separator()), 72, "...")
        ));
    }

    let grouped = |sorted: Vec<&Resource>| -> Vec<String> {
        let groups = if chrome.group_ie_resources() {
            resource::group_resources(&sorted)
        } else {
            resource::ungrouped(&sorted)
        };
        group_lines(&groups)
    };

    let mut stylesheets = grouped(chrome.stylesheets());
    let alternates = grouped(chrome.alternate_stylesheets());
    if !alternates.is_empty() {
        stylesheets.push(format!("{}alternate", indent(1)));
        stylesheets.extend(alternates.into_iter().map(|l| format!("{}{l}", indent(1))));
    }
    section(&mut lines, "Stylesheets", stylesheets);
    section(&mut lines, "Scripts", grouped(chrome.scripts()));

    let icons = icon::ordered(chrome.icons())
        .into_iter()
        .enumerate()
        .map(|(i, (mime, href))| format!("{} {} ({})", format_index(i + 1), href, mime))
        .collect();
    section(&mut lines, "Icons", icons);
    lines
}

/// Print the load plan to stdout.
pub fn print_plan(chrome: &Chrome, ctx: &RenderContext) {
    for line in format_plan(chrome, ctx) {
        println!("{}", line);
    }
}

// ============================================================================
// Response head
// ============================================================================

/// Status line followed by `Name: value` header lines.
pub fn format_response_head(head: &ResponseHead) -> Vec<String> {
    let mut lines = vec![head.status_line()];
    lines.extend(
        head.headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}")),
    );
    lines
}

/// Print the response head, a blank line, then the document head.
pub fn print_rendered_head(head: &ResponseHead, markup: &str) {
    for line in format_response_head(head) {
        println!("{}", line);
    }
    println!();
    println!("{}", markup);
}

// ============================================================================
// Doctype
// ============================================================================

fn profile_summary(ctx: &RenderContext) -> String {
    let name = ContextType::ALL
        .into_iter()
        .find(|t| {
            let profile = RenderContext::create(*t);
            profile.language() == ctx.language()
                && profile.version() == ctx.version()
                && profile.dialect() == ctx.dialect()
        })
        .map(ContextType::name)
        .unwrap_or("custom");
    format!("{name} ({})", ctx.content_type_header())
}

/// Profile facts for the `doctype` command.
pub fn format_doctype(kind: ContextType, ctx: &RenderContext) -> Result<Vec<String>, ContextError> {
    let doctype = ctx.doctype()?;
    let mut lines = vec![
        format!("Profile:      {}", kind.name()),
        format!(
            "Doctype:      {}",
            if doctype.is_empty() { "(none)" } else { doctype }
        ),
        format!("Content-Type: {}", ctx.content_type_header()),
        format!("XML syntax:   {}", if ctx.is_xml_syntax() { "yes" } else { "no" }),
    ];
    let declaration = ctx.xml_declaration();
    if !declaration.is_empty() {
        lines.push(format!("Declaration:  {declaration}"));
    }
    Ok(lines)
}

pub fn print_doctype(kind: ContextType, ctx: &RenderContext) -> Result<(), ContextError> {
    for line in format_doctype(kind, ctx)? {
        println!("{}", line);
    }
    Ok(())
}

// ============================================================================
// Bytes
// ============================================================================

/// A byte count in both unit families.
///
/// ```text
/// 8388608 bytes
///     8.00 MiB
///     8.39 MB
/// ```
pub fn format_bytes_report(bytes: u64, precision: usize) -> Vec<String> {
    vec![
        format!("{bytes} bytes"),
        format!("{}{}", indent(1), format_bytes(bytes, BytePrefix::Binary, precision)),
        format!("{}{}", indent(1), format_bytes(bytes, BytePrefix::Decimal, precision)),
    ]
}

pub fn print_bytes_report(bytes: u64, precision: usize) {
    for line in format_bytes_report(bytes, precision) {
        println!("{}", line);
    }
}
