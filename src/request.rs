//! Incoming HTTP request type.

use std::borrow::Cow;
use std::collections::HashMap;

use bytes::Bytes;
use http::request::Parts;
use http::{HeaderMap, Method};

/// An incoming HTTP request with its body fully read.
///
/// The server collects the body before any middleware runs, so every
/// pipeline stage sees the same immutable view.
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(parts: Parts, body: Bytes) -> Self {
        Self { parts, body, params: HashMap::new() }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn query(&self) -> Option<&str> { self.parts.uri.query() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the first value of a query-string parameter, decoded.
    ///
    /// Keys and values are percent-decoded (`+` reads as a space), so
    /// `?feed=comments%2Drss2` yields `Some("comments-rss2")` and a bare
    /// `?withcomments` yields `Some("")`.
    pub fn query_param(&self, key: &str) -> Option<Cow<'_, str>> {
        query_param(self.query()?, key)
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/posts/{slug}`, `req.param("slug")` on `/posts/hello`
    /// returns `Some("hello")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::new(parts, body)
    }
}

pub(crate) fn query_param<'q>(query: &'q str, key: &str) -> Option<Cow<'q, str>> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> Request {
        Request::from(http::Request::get(uri).body(Bytes::new()).unwrap())
    }

    #[test]
    fn query_params_first_wins() {
        let req = get("/?feed=comments-rss2&p=7&p=8&withcomments");
        assert_eq!(req.query_param("feed").as_deref(), Some("comments-rss2"));
        assert_eq!(req.query_param("p").as_deref(), Some("7"));
        assert_eq!(req.query_param("withcomments").as_deref(), Some(""));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn query_keys_and_values_are_percent_decoded() {
        let req = get("/?f%65ed=comments%2Drss2&rest_route=%2Fwp%2Fv2%2Fcomments&s=a+b");
        assert_eq!(req.query_param("feed").as_deref(), Some("comments-rss2"));
        assert_eq!(req.query_param("rest_route").as_deref(), Some("/wp/v2/comments"));
        assert_eq!(req.query_param("s").as_deref(), Some("a b"));
    }

    #[test]
    fn no_query_string() {
        let req = get("/comments/feed/");
        assert_eq!(req.query(), None);
        assert_eq!(req.query_param("feed"), None);
        assert_eq!(req.path(), "/comments/feed/");
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::from(
            http::Request::get("/")
                .header("X-Requested-With", "XMLHttpRequest")
                .body(Bytes::new())
                .unwrap(),
        );
        assert_eq!(req.header("x-requested-with"), Some("XMLHttpRequest"));
    }
}
