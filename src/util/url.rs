//! URLs with shorthand forms resolved against a current URL.
//!
//! Absolute strings (`https://example.com/a?b=1`) parse on their own. The
//! shorthands only make sense relative to the page being rendered, so they
//! start from a clone of the caller's current URL:
//!
//! | input        | result                                       |
//! |--------------|----------------------------------------------|
//! | `#top`       | current URL with the fragment replaced       |
//! | `?page=2`    | current URL with the query replaced          |
//! | `&page=2`    | current URL with `page` set in its query     |
//! | `/a/b?q#f`   | current origin with path, query and fragment |
//! | `//host/x`   | current scheme, everything else from input   |
//!
//! Repeated query keys and keys written `key[]` collect into lists, which
//! render back as repeated `key[]=value` pairs.

use crate::util::arrays::collapse_keys;
use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;
use url::form_urlencoded;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UrlError {
    #[error("malformed URL {0:?}: {1}")]
    Malformed(String, String),
}

/// A query value: a single string or the values of a repeated key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Scalar(String),
    List(Vec<String>),
}

impl QueryValue {
    /// Values in order; a scalar yields one.
    pub fn values(&self) -> Vec<&str> {
        match self {
            QueryValue::Scalar(v) => vec![v.as_str()],
            QueryValue::List(vs) => vs.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    scheme: Option<String>,
    user: Option<String>,
    pass: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    /// `//` follows the scheme even without a host (`file:///tmp`).
    authority: bool,
    path: String,
    query: IndexMap<String, QueryValue>,
    fragment: Option<String>,
}

impl Url {
    /// Parse `input`, resolving shorthand forms against `current`.
    ///
    /// Without a current URL the shorthands resolve against an empty one.
    pub fn parse(input: &str, current: Option<&Url>) -> Result<Url, UrlError> {
        let input = input.trim();
        let base = || current.cloned().unwrap_or_default();
        if let Some(fragment) = input.strip_prefix('#') {
            let mut url = base();
            url.set_fragment(Some(fragment));
            return Ok(url);
        }
        if let Some(query) = input.strip_prefix('?') {
            let mut url = base();
            url.set_query_string(query);
            return Ok(url);
        }
        if let Some(pairs) = input.strip_prefix('&') {
            let mut url = base();
            for (key, value) in form_urlencoded::parse(pairs.as_bytes()) {
                url.add_query(&key, &value);
            }
            return Ok(url);
        }
        if input.starts_with("//") {
            let scheme = current
                .and_then(|c| c.scheme.clone())
                .unwrap_or_else(|| "http".to_string());
            return Self::parse_absolute(&format!("{scheme}:{input}"));
        }
        if input.starts_with('/') {
            let mut url = base();
            let (rest, fragment) = split_once_opt(input, '#');
            let (path, query) = split_once_opt(rest, '?');
            url.path = path.to_string();
            url.set_query_string(query.unwrap_or(""));
            url.fragment = fragment.map(str::to_string);
            return Ok(url);
        }
        Self::parse_absolute(input)
    }

    fn parse_absolute(input: &str) -> Result<Url, UrlError> {
        let parsed = url::Url::parse(input)
            .map_err(|e| UrlError::Malformed(input.to_string(), e.to_string()))?;
        let mut url = Url {
            scheme: Some(parsed.scheme().to_string()),
            user: Some(parsed.username().to_string()).filter(|u| !u.is_empty()),
            pass: parsed.password().map(str::to_string),
            host: parsed.host_str().map(str::to_string),
            port: parsed.port(),
            authority: parsed.has_authority(),
            path: parsed.path().to_string(),
            query: IndexMap::new(),
            fragment: parsed.fragment().map(str::to_string),
        };
        url.set_query_string(parsed.query().unwrap_or(""));
        Ok(url)
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn set_scheme(&mut self, scheme: Option<&str>) {
        self.scheme = scheme.map(str::to_ascii_lowercase);
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn set_user(&mut self, user: Option<&str>) {
        self.user = user.map(str::to_string);
    }

    pub fn pass(&self) -> Option<&str> {
        self.pass.as_deref()
    }

    pub fn set_pass(&mut self, pass: Option<&str>) {
        self.pass = pass.map(str::to_string);
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn set_host(&mut self, host: Option<&str>) {
        self.host = host.map(str::to_ascii_lowercase);
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn set_port(&mut self, port: Option<u16>) {
        self.port = port;
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: &str) {
        self.path = path.to_string();
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn set_fragment(&mut self, fragment: Option<&str>) {
        self.fragment = fragment.map(str::to_string);
    }

    pub fn query(&self) -> &IndexMap<String, QueryValue> {
        &self.query
    }

    pub fn query_value(&self, key: &str) -> Option<&QueryValue> {
        self.query.get(key)
    }

    /// Replace the whole query with the parsed contents of `query`.
    pub fn set_query_string(&mut self, query: &str) {
        self.query.clear();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if let Some(list_key) = key.strip_suffix("[]") {
                self.push_query(list_key, &value);
            } else if self.query.contains_key(&*key) {
                self.push_query(&key, &value);
            } else {
                self.query
                    .insert(key.into_owned(), QueryValue::Scalar(value.into_owned()));
            }
        }
    }

    /// Set `key` to `value`. A `key[]` name appends to that key's list.
    pub fn add_query(&mut self, key: &str, value: &str) {
        match key.strip_suffix("[]") {
            Some(list_key) => self.push_query(list_key, value),
            None => {
                self.query
                    .insert(key.to_string(), QueryValue::Scalar(value.to_string()));
            }
        }
    }

    fn push_query(&mut self, key: &str, value: &str) {
        let entry = self
            .query
            .entry(key.to_string())
            .or_insert_with(|| QueryValue::List(Vec::new()));
        if let QueryValue::Scalar(existing) = entry {
            let first = std::mem::take(existing);
            *entry = QueryValue::List(vec![first]);
        }
        if let QueryValue::List(values) = entry {
            values.push(value.to_string());
        }
    }

    /// Merge a nested JSON object into the query, e.g. `{"f": {"tag": "x"}}`
    /// adds `f[tag]=x`.
    pub fn extend_query(&mut self, params: &serde_json::Value) {
        for (key, value) in collapse_keys(params) {
            self.add_query(&key, &value);
        }
    }

    pub fn remove_query(&mut self, key: &str) -> Option<QueryValue> {
        self.query.shift_remove(key)
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Encoded query string without the leading `?`.
    pub fn query_string(&self) -> String {
        let mut pairs = Vec::new();
        for (key, value) in &self.query {
            let key = encode(key);
            match value {
                QueryValue::Scalar(v) => pairs.push(format!("{key}={}", encode(v))),
                QueryValue::List(vs) => {
                    pairs.extend(vs.iter().map(|v| format!("{key}[]={}", encode(v))))
                }
            }
        }
        pairs.join("&")
    }

    /// Path, query and fragment.
    pub fn path_and_rest(&self) -> String {
        let mut out = if self.path.is_empty() {
            "/".to_string()
        } else {
            self.path.clone()
        };
        out.push_str(&self.query_and_fragment());
        out
    }

    fn query_and_fragment(&self) -> String {
        let mut out = String::new();
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&self.query_string());
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }

    /// True when scheme, credentials, host and port all match.
    pub fn same_origin(&self, other: &Url) -> bool {
        self.scheme == other.scheme
            && self.user == other.user
            && self.pass == other.pass
            && self.host == other.host
            && self.port == other.port
    }

    /// The shortest string that resolves to this URL from `current`.
    ///
    /// Different origins get the absolute form. Otherwise the path, query
    /// and fragment. With `minimal`, a URL that only differs from `current`
    /// in query or fragment drops the path as well.
    pub fn relative(&self, current: &Url, minimal: bool) -> String {
        if !self.same_origin(current) {
            return self.to_string();
        }
        if minimal && self.path == current.path {
            let same_query = self.query == current.query;
            match &self.fragment {
                Some(fragment) if same_query => return format!("#{fragment}"),
                _ if !same_query && !self.query.is_empty() => {
                    return self.query_and_fragment();
                }
                _ => {}
            }
        }
        self.path_and_rest()
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}:")?;
        }
        if self.host.is_none() && !self.authority {
            // Path-only (`mailto:me@example.com`) or a bare reference
            f.write_str(&self.path)?;
            return f.write_str(&self.query_and_fragment());
        }
        f.write_str("//")?;
        if let Some(user) = &self.user {
            f.write_str(user)?;
            if let Some(pass) = &self.pass {
                write!(f, ":{pass}")?;
            }
            f.write_str("@")?;
        }
        if let Some(host) = &self.host {
            f.write_str(host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        f.write_str(&self.path_and_rest())
    }
}

impl std::str::FromStr for Url {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s, None)
    }
}

fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

fn split_once_opt(s: &str, sep: char) -> (&str, Option<&str>) {
    match s.split_once(sep) {
        Some((head, tail)) => (head, Some(tail)),
        None => (s, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> Url {
        Url::parse("http://example.com/a/b?x=1", None).unwrap()
    }

    #[test]
    fn parses_absolute_components() {
        let url = Url::parse("https://bob:pw@Example.com:8443/p/q?a=1&b=two#frag", None).unwrap();
        assert_eq!(url.scheme(), Some("https"));
        assert_eq!(url.user(), Some("bob"));
        assert_eq!(url.pass(), Some("pw"));
        assert_eq!(url.host(), Some("example.com"));
        assert_eq!(url.port(), Some(8443));
        assert_eq!(url.path(), "/p/q");
        assert_eq!(url.query_value("b"), Some(&QueryValue::Scalar("two".into())));
        assert_eq!(url.fragment(), Some("frag"));
        assert_eq!(url.to_string(), "https://bob:pw@example.com:8443/p/q?a=1&b=two#frag");
    }

    #[test]
    fn schemes_without_host_keep_their_scheme() {
        for input in [
            "mailto:me@example.com",
            "file:///tmp/x.html",
            "urn:isbn:0451450523",
            "data:text/plain,hello",
        ] {
            let url = Url::parse(input, None).unwrap();
            assert_eq!(url.to_string(), input);
        }
    }

    #[test]
    fn host_less_url_relative_to_http_page_is_absolute() {
        let mail = Url::parse("mailto:me@example.com?subject=hi", None).unwrap();
        assert_eq!(mail.relative(&current(), true), "mailto:me@example.com?subject=hi");
    }

    #[test]
    fn default_port_is_dropped() {
        let url = Url::parse("http://example.com:80/", None).unwrap();
        assert_eq!(url.port(), None);
        assert_eq!(url.to_string(), "http://example.com/");
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(
            Url::parse("not a url", None),
            Err(UrlError::Malformed(..))
        ));
        assert!(Url::parse("http://", None).is_err());
    }

    #[test]
    fn fragment_shorthand_keeps_current() {
        let cur = current();
        let url = Url::parse("#top", Some(&cur)).unwrap();
        assert_eq!(url.to_string(), "http://example.com/a/b?x=1#top");
        // current is untouched
        assert_eq!(cur.fragment(), None);
    }

    #[test]
    fn query_shorthand_replaces_query() {
        let url = Url::parse("?page=2", Some(&current())).unwrap();
        assert_eq!(url.to_string(), "http://example.com/a/b?page=2");
    }

    #[test]
    fn ampersand_shorthand_appends() {
        let url = Url::parse("&page=2&x=5", Some(&current())).unwrap();
        assert_eq!(url.query_string(), "x=5&page=2");
    }

    #[test]
    fn path_shorthand_replaces_path_query_fragment() {
        let url = Url::parse("/c/d?y=2#f", Some(&current())).unwrap();
        assert_eq!(url.to_string(), "http://example.com/c/d?y=2#f");
        let bare = Url::parse("/c", Some(&current())).unwrap();
        assert_eq!(bare.to_string(), "http://example.com/c");
    }

    #[test]
    fn scheme_relative_uses_current_scheme() {
        let cur = Url::parse("https://example.com/", None).unwrap();
        let url = Url::parse("//cdn.example.net/app.js", Some(&cur)).unwrap();
        assert_eq!(url.to_string(), "https://cdn.example.net/app.js");
    }

    #[test]
    fn repeated_keys_become_lists() {
        let url = Url::parse("http://h/?tag=a&tag=b&ids[]=1&ids[]=2", None).unwrap();
        assert_eq!(
            url.query_value("tag"),
            Some(&QueryValue::List(vec!["a".into(), "b".into()]))
        );
        assert_eq!(url.query_value("ids").unwrap().values(), ["1", "2"]);
        assert_eq!(url.query_string(), "tag[]=a&tag[]=b&ids[]=1&ids[]=2");
    }

    #[test]
    fn query_values_are_encoded() {
        let mut url = Url::default();
        url.set_path("/search");
        url.add_query("q", "a b&c");
        assert_eq!(url.to_string(), "/search?q=a+b%26c");
        url.remove_query("q");
        assert_eq!(url.to_string(), "/search");
    }

    #[test]
    fn extends_query_from_nested_params() {
        let mut url = Url::parse("/list", None).unwrap();
        url.extend_query(&serde_json::json!({"filter": {"tag": "rust"}, "ids": [1, 2]}));
        assert_eq!(url.query_string(), "filter%5Btag%5D=rust&ids[]=1&ids[]=2");
    }

    #[test]
    fn relative_same_origin_drops_origin() {
        let cur = current();
        let url = Url::parse("http://example.com/a/b?x=1", None).unwrap();
        assert_eq!(url.relative(&cur, false), "/a/b?x=1");
    }

    #[test]
    fn relative_other_host_stays_absolute() {
        let cur = Url::parse("http://other.org/a/b?x=1", None).unwrap();
        let url = Url::parse("http://example.com/a/b?x=1", None).unwrap();
        assert_eq!(url.relative(&cur, false), "http://example.com/a/b?x=1");
    }

    #[test]
    fn relative_minimal() {
        let cur = current();
        let frag = Url::parse("#top", Some(&cur)).unwrap();
        assert_eq!(frag.relative(&cur, true), "#top");
        let page = Url::parse("?x=2", Some(&cur)).unwrap();
        assert_eq!(page.relative(&cur, true), "?x=2");
        assert_eq!(page.relative(&cur, false), "/a/b?x=2");
        let other = Url::parse("/z", Some(&cur)).unwrap();
        assert_eq!(other.relative(&cur, true), "/z");
    }
}
