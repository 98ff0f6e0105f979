//! Exemption contexts: admin, async and API traffic.

use crate::request::Request;

pub const DEFAULT_ADMIN_PREFIXES: &[&str] = &["/wp-admin"];
pub const DEFAULT_ASYNC_PATHS: &[&str] = &["/wp-admin/admin-ajax.php", "/wp-cron.php"];
pub const DEFAULT_API_PREFIXES: &[&str] = &["/wp-json", "/xmlrpc.php"];

/// Paths where a `rest_route` query dispatches into the REST API.
const REST_ENTRY_POINTS: &[&str] = &["/", "/index.php"];

/// Which exemption contexts a request falls into.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Contexts {
    pub admin: bool,
    pub background: bool,
    pub api: bool,
}

/// Classifies requests into exemption contexts by where they are routed.
///
/// Only the path (and `rest_route` on the REST entry points) counts; headers
/// are client-controlled and never exempt a request. Prefixes match whole
/// path segments: `/wp-admin` covers `/wp-admin` and `/wp-admin/edit.php`
/// but not `/wp-administrator`.
#[derive(Clone, Debug)]
pub struct ContextClassifier {
    admin_prefixes: Vec<String>,
    async_paths: Vec<String>,
    api_prefixes: Vec<String>,
}

impl ContextClassifier {
    pub fn new(
        admin_prefixes: Vec<String>,
        async_paths: Vec<String>,
        api_prefixes: Vec<String>,
    ) -> Self {
        Self { admin_prefixes, async_paths, api_prefixes }
    }

    pub fn classify(&self, req: &Request) -> Contexts {
        let path = req.path();
        Contexts {
            admin: self.admin_prefixes.iter().any(|p| under(path, p)),
            background: self.async_paths.iter().any(|p| path == p.as_str()),
            api: self.api_prefixes.iter().any(|p| under(path, p))
                || (REST_ENTRY_POINTS.contains(&path) && req.query_param("rest_route").is_some()),
        }
    }
}

impl Default for ContextClassifier {
    fn default() -> Self {
        Self::new(owned(DEFAULT_ADMIN_PREFIXES), owned(DEFAULT_ASYNC_PATHS), owned(DEFAULT_API_PREFIXES))
    }
}

pub(crate) fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

/// `path` equals `prefix` or continues it at a `/` boundary.
pub(crate) fn under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn classify(req: http::request::Builder) -> Contexts {
        ContextClassifier::default().classify(&Request::from(req.body(Bytes::new()).unwrap()))
    }

    #[test]
    fn plain_page_has_no_context() {
        assert_eq!(classify(http::Request::get("/comments/feed/")), Contexts::default());
    }

    #[test]
    fn admin_prefix_is_segment_aware() {
        assert!(classify(http::Request::get("/wp-admin")).admin);
        assert!(classify(http::Request::get("/wp-admin/edit-comments.php")).admin);
        assert!(!classify(http::Request::get("/wp-administrator/feed")).admin);
    }

    #[test]
    fn async_by_path_only() {
        let ajax = classify(http::Request::post("/wp-admin/admin-ajax.php"));
        assert!(ajax.background && ajax.admin);
        assert!(classify(http::Request::get("/wp-cron.php")).background);
        assert!(!classify(
            http::Request::get("/comments/feed/").header("X-Requested-With", "xmlhttprequest")
        ).background);
    }

    #[test]
    fn api_by_prefix_or_rest_entry_point() {
        assert!(classify(http::Request::get("/wp-json/wp/v2/posts")).api);
        assert!(classify(http::Request::post("/xmlrpc.php")).api);
        assert!(classify(http::Request::get("/?rest_route=/wp/v2/posts")).api);
        assert!(classify(http::Request::get("/index.php?rest_route=/wp/v2/posts")).api);
        assert!(!classify(http::Request::get("/hello-world/feed/?rest_route=x")).api);
        assert!(!classify(http::Request::get("/wp-jsonp")).api);
    }

    #[test]
    fn under_ignores_trailing_slash_on_prefix() {
        assert!(under("/admin/x", "/admin/"));
        assert!(under("/admin", "/admin/"));
        assert!(!under("/adminx", "/admin"));
    }
}
