//! Script and stylesheet resources: priority ordering and legacy Internet
//! Explorer grouping.
//!
//! ## Priority
//!
//! Each resource carries a priority between 0 and 100 (default 50). Lower
//! priorities load first. The sort is stable, so resources with the same
//! priority keep the order they were added in.
//!
//! ## IE conditional groups
//!
//! Filenames can carry a browser constraint:
//!
//! ```text
//! fixes.ie.js          → <!--[if IE]>
//! fixes.ie.lt_7.js     → <!--[if lt IE 7]>
//! fixes.ie.lte_8.css   → <!--[if lte IE 8]>
//! fixes.ie.gte_9.js    → <!--[if gte IE 9]>
//! fixes.ie.eq_7.css    → <!--[if IE 7]>
//! ```
//!
//! With grouping enabled, resources are bucketed and each distinct condition
//! is emitted once, wrapping every resource that shares it:
//!
//! 1. unconditional resources
//! 2. any-IE
//! 3. `lt`/`lte`, highest version first
//! 4. `gt`/`gte`, lowest version first
//! 5. exact versions, lowest first
//!
//! This is a compatibility mode for browsers long out of support. The
//! bucketing is kept generic over [`IeCondition`] so nothing else in the
//! crate depends on IE semantics.

use crate::tag::Attributes;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const DEFAULT_PRIORITY: u8 = 50;
pub const MAX_PRIORITY: u8 = 100;

static IE_RESOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.ie(?:\.(lt|lte|gt|gte|eq)_(\d+))?\.(?:js|css)$")
        .expect("IE resource pattern must compile")
});

/// Browser constraint encoded in a resource filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IeCondition {
    Any,
    Lt(u32),
    Lte(u32),
    Gt(u32),
    Gte(u32),
    Eq(u32),
}

impl IeCondition {
    /// Infer the condition from a URL or path. Query strings and fragments
    /// are ignored.
    pub fn from_href(href: &str) -> Option<Self> {
        let path = href.split(['?', '#']).next().unwrap_or(href);
        let caps = IE_RESOURCE_RE.captures(path)?;
        let (Some(op), Some(version)) = (caps.get(1), caps.get(2)) else {
            return Some(IeCondition::Any);
        };
        let version: u32 = version.as_str().parse().ok()?;
        let condition = match op.as_str().to_ascii_lowercase().as_str() {
            "lt" => IeCondition::Lt(version),
            "lte" => IeCondition::Lte(version),
            "gt" => IeCondition::Gt(version),
            "gte" => IeCondition::Gte(version),
            _ => IeCondition::Eq(version),
        };
        Some(condition)
    }

    /// Conditional comment expression, e.g. `lte IE 8`.
    pub fn expression(&self) -> String {
        match self {
            IeCondition::Any => "IE".to_string(),
            IeCondition::Lt(v) => format!("lt IE {v}"),
            IeCondition::Lte(v) => format!("lte IE {v}"),
            IeCondition::Gt(v) => format!("gt IE {v}"),
            IeCondition::Gte(v) => format!("gte IE {v}"),
            IeCondition::Eq(v) => format!("IE {v}"),
        }
    }

    /// (bucket, order within bucket). Inclusive comparisons sort ahead of
    /// strict ones at the same version.
    fn sort_key(&self) -> (u8, i64, u8) {
        match *self {
            IeCondition::Any => (1, 0, 0),
            IeCondition::Lte(v) => (2, -i64::from(v), 0),
            IeCondition::Lt(v) => (2, -i64::from(v), 1),
            IeCondition::Gte(v) => (3, i64::from(v), 0),
            IeCondition::Gt(v) => (3, i64::from(v), 1),
            IeCondition::Eq(v) => (4, i64::from(v), 0),
        }
    }
}

impl fmt::Display for IeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}

/// A script or stylesheet registered with the chrome.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub href: String,
    pub priority: u8,
    pub attrs: Attributes,
}

impl Resource {
    pub fn condition(&self) -> Option<IeCondition> {
        IeCondition::from_href(&self.href)
    }
}

/// Stable sort by ascending priority.
pub fn sort_by_priority<'a>(resources: impl IntoIterator<Item = &'a Resource>) -> Vec<&'a Resource> {
    let mut sorted: Vec<&Resource> = resources.into_iter().collect();
    sorted.sort_by_key(|r| r.priority);
    sorted
}

/// Resources that share one emission wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceGroup<'a> {
    pub condition: Option<IeCondition>,
    pub resources: Vec<&'a Resource>,
}

/// Bucket priority-sorted resources by IE condition.
///
/// Priority order is preserved inside each group.
pub fn group_resources<'a>(sorted: &[&'a Resource]) -> Vec<ResourceGroup<'a>> {
    let mut groups: Vec<ResourceGroup<'a>> = Vec::new();
    for &resource in sorted {
        let condition = resource.condition();
        match groups.iter_mut().find(|g| g.condition == condition) {
            Some(group) => group.resources.push(resource),
            None => groups.push(ResourceGroup {
                condition,
                resources: vec![resource],
            }),
        }
    }
    // None sorts first, then buckets in the documented order
    groups.sort_by_key(|g| match g.condition {
        None => (0, 0, 0),
        Some(c) => c.sort_key(),
    });
    groups
}

/// One group per resource, keeping priority order. Used when grouping is
/// disabled: conditional resources are still wrapped, just individually.
pub fn ungrouped<'a>(sorted: &[&'a Resource]) -> Vec<ResourceGroup<'a>> {
    sorted
        .iter()
        .map(|resource| ResourceGroup {
            condition: resource.condition(),
            resources: vec![*resource],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(href: &str, priority: u8) -> Resource {
        Resource {
            href: href.to_string(),
            priority,
            attrs: Attributes::new(),
        }
    }

    fn hrefs(resources: &[&Resource]) -> Vec<String> {
        resources.iter().map(|r| r.href.clone()).collect()
    }

    #[test]
    fn conditions_from_filenames() {
        assert_eq!(IeCondition::from_href("/js/app.js"), None);
        assert_eq!(IeCondition::from_href("/js/fix.ie.js"), Some(IeCondition::Any));
        assert_eq!(
            IeCondition::from_href("/js/fix.ie.lte_8.js"),
            Some(IeCondition::Lte(8))
        );
        assert_eq!(
            IeCondition::from_href("/css/fix.ie.eq_7.css?v=3"),
            Some(IeCondition::Eq(7))
        );
        assert_eq!(IeCondition::from_href("/css/movie.css"), None);
        assert_eq!(IeCondition::from_href("/js/fix.ie.lte_8.png"), None);
    }

    #[test]
    fn expressions() {
        assert_eq!(IeCondition::Any.expression(), "IE");
        assert_eq!(IeCondition::Lt(7).expression(), "lt IE 7");
        assert_eq!(IeCondition::Gte(9).expression(), "gte IE 9");
        assert_eq!(IeCondition::Eq(8).expression(), "IE 8");
    }

    #[test]
    fn priority_sort_is_stable() {
        let a = res("a.js", 50);
        let b = res("b.js", 5);
        let c = res("c.js", 15);
        let d = res("d.js", 5);
        let sorted = sort_by_priority([&a, &b, &c, &d]);
        assert_eq!(hrefs(&sorted), ["b.js", "d.js", "c.js", "a.js"]);
    }

    #[test]
    fn grouping_orders_buckets() {
        let items = [
            res("eq7.ie.eq_7.js", 50),
            res("gt6.ie.gt_6.js", 50),
            res("lt7.ie.lt_7.js", 50),
            res("plain.js", 50),
            res("lte8.ie.lte_8.js", 50),
            res("any.ie.js", 50),
            res("gte9.ie.gte_9.js", 50),
            res("other.js", 50),
        ];
        let sorted = sort_by_priority(&items);
        let groups = group_resources(&sorted);
        let conditions: Vec<Option<IeCondition>> = groups.iter().map(|g| g.condition).collect();
        assert_eq!(
            conditions,
            [
                None,
                Some(IeCondition::Any),
                Some(IeCondition::Lte(8)),
                Some(IeCondition::Lt(7)),
                Some(IeCondition::Gt(6)),
                Some(IeCondition::Gte(9)),
                Some(IeCondition::Eq(7)),
            ]
        );
        assert_eq!(hrefs(&groups[0].resources), ["plain.js", "other.js"]);
    }

    #[test]
    fn same_condition_shares_a_group() {
        let items = [res("a.ie.lte_8.js", 20), res("b.ie.lte_8.js", 10)];
        let sorted = sort_by_priority(&items);
        let groups = group_resources(&sorted);
        assert_eq!(groups.len(), 1);
        assert_eq!(hrefs(&groups[0].resources), ["b.ie.lte_8.js", "a.ie.lte_8.js"]);
    }

    #[test]
    fn ungrouped_keeps_priority_order() {
        let items = [res("a.ie.js", 10), res("b.js", 20), res("c.ie.js", 30)];
        let sorted = sort_by_priority(&items);
        let groups = ungrouped(&sorted);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].condition, Some(IeCondition::Any));
        assert_eq!(groups[1].condition, None);
    }
}
