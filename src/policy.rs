//! Request disposition for comment feeds.
//!
//! [`decide`] is the whole policy: a pure function from the request's
//! classification and the operator's [`PolicyConfig`] to a [`Disposition`].
//! It performs no I/O and keeps no state, so it is safe to call from any
//! number of connection tasks at once.
//!
//! ```rust
//! use hush::policy::{decide, Disposition, DispositionRequest, PolicyConfig};
//! use hush::StatusCode;
//!
//! let config = PolicyConfig::new("https://example.com/").unwrap();
//! let req = DispositionRequest::comment_feed();
//!
//! assert_eq!(decide(&req, &config), Disposition::NotFound { status: StatusCode::NOT_FOUND });
//! ```

use http::{StatusCode, Uri};

use crate::error::Error;

/// Status used when no code is configured.
pub const DEFAULT_STATUS: u16 = 404;

/// Signals gathered for one inbound request.
///
/// Built by [`CommentShield`](crate::middleware::CommentShield) from the
/// route and context classifiers; nothing mutates it afterwards.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DispositionRequest {
    pub is_comment_feed_route: bool,
    pub is_admin_context: bool,
    pub is_async_context: bool,
    pub is_api_context: bool,
}

impl DispositionRequest {
    /// A comment-feed request with no exemption flags set.
    pub fn comment_feed() -> Self {
        Self { is_comment_feed_route: true, ..Self::default() }
    }

    /// Admin, background and machine-API traffic is never intercepted.
    pub fn is_exempt(&self) -> bool {
        self.is_admin_context || self.is_async_context || self.is_api_context
    }
}

/// What to do with a request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// Forward the client. `target` is never empty; `status` is one of
    /// 301, 302, 307 or 308.
    Redirect { target: String, status: StatusCode },
    /// Answer with 404 or 410 and nothing else.
    NotFound { status: StatusCode },
    /// Not ours: let the request continue.
    PassThrough,
}

/// Operator settings read by [`decide`].
///
/// The redirect target is checked against the site's own host and the
/// allow-list. A target that fails the check is treated as empty, so the
/// redirect lands on the site root instead of an arbitrary host.
#[derive(Clone, Debug)]
pub struct PolicyConfig {
    status_code: u16,
    redirect_url: String,
    site_root: String,
    site_host: String,
    allowed_hosts: Vec<String>,
}

impl PolicyConfig {
    /// Policy with the default status (`404`) for a site rooted at `site_root`.
    ///
    /// `site_root` must be an absolute `http` or `https` URL; it is the
    /// fallback redirect target and defines which host counts as same-site.
    pub fn new(site_root: &str) -> Result<Self, Error> {
        let site_host = absolute_host(site_root)
            .ok_or_else(|| Error::Config(format!("site root `{site_root}` is not an absolute http(s) URL")))?;
        Ok(Self {
            status_code: DEFAULT_STATUS,
            redirect_url: String::new(),
            site_root: site_root.to_owned(),
            site_host,
            allowed_hosts: Vec::new(),
        })
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = code;
        self
    }

    /// Adds a host that redirect targets may point at besides the site's own.
    pub fn allow_host(mut self, host: &str) -> Self {
        self.allowed_hosts.push(host.to_ascii_lowercase());
        self
    }

    /// Sets the redirect target. An off-site target is kept but never used;
    /// see [`ignores_redirect_url`](Self::ignores_redirect_url).
    pub fn redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = url.into();
        self
    }

    /// True when the policy redirects but the configured target is off-site
    /// and will be replaced by the site root.
    pub fn ignores_redirect_url(&self) -> bool {
        !matches!(self.status_code, 404 | 410)
            && !self.redirect_url.is_empty()
            && !self.is_safe_target(&self.redirect_url)
    }

    pub fn site_root(&self) -> &str { &self.site_root }

    /// The redirect target `decide` will emit: the configured URL when it is
    /// set and same-site (or allow-listed), the site root otherwise.
    pub fn redirect_target(&self) -> &str {
        if self.redirect_url.is_empty() || !self.is_safe_target(&self.redirect_url) {
            &self.site_root
        } else {
            &self.redirect_url
        }
    }

    fn is_safe_target(&self, url: &str) -> bool {
        if url.starts_with('/') {
            // `//host` and `/\host` are read by browsers as another origin.
            return !url.starts_with("//") && !url.starts_with("/\\") && url.parse::<Uri>().is_ok();
        }
        match absolute_host(url) {
            Some(host) => host == self.site_host || self.allowed_hosts.contains(&host),
            None => false,
        }
    }
}

/// Lowercased host of an absolute `http(s)` URL.
fn absolute_host(url: &str) -> Option<String> {
    let uri: Uri = url.parse().ok()?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        _ => return None,
    }
    uri.host().filter(|h| !h.is_empty()).map(str::to_ascii_lowercase)
}

/// Decides the disposition of one request.
///
/// First match wins:
/// 1. not a comment feed → pass through
/// 2. admin, async or API context → pass through
/// 3. configured 404 / 410 → not found with that status
/// 4. anything else redirects; codes other than 301, 302, 307 and 308
///    become 301
pub fn decide(req: &DispositionRequest, config: &PolicyConfig) -> Disposition {
    if !req.is_comment_feed_route || req.is_exempt() {
        return Disposition::PassThrough;
    }

    match config.status_code {
        404 => Disposition::NotFound { status: StatusCode::NOT_FOUND },
        410 => Disposition::NotFound { status: StatusCode::GONE },
        code => Disposition::Redirect {
            target: config.redirect_target().to_owned(),
            status: redirect_status(code),
        },
    }
}

fn redirect_status(code: u16) -> StatusCode {
    match code {
        302 => StatusCode::FOUND,
        307 => StatusCode::TEMPORARY_REDIRECT,
        308 => StatusCode::PERMANENT_REDIRECT,
        _ => StatusCode::MOVED_PERMANENTLY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "https://example.com/";

    fn config(code: u16, url: &str) -> PolicyConfig {
        PolicyConfig::new(ROOT).unwrap().status_code(code).redirect_url(url)
    }

    fn redirect(target: &str, status: StatusCode) -> Disposition {
        Disposition::Redirect { target: target.to_owned(), status }
    }

    #[test]
    fn non_feed_passes_through() {
        let req = DispositionRequest { is_admin_context: true, ..Default::default() };
        assert_eq!(decide(&req, &config(302, ROOT)), Disposition::PassThrough);
        assert_eq!(decide(&DispositionRequest::default(), &config(404, "")), Disposition::PassThrough);
    }

    #[test]
    fn each_exemption_passes_through() {
        let exempt = [
            DispositionRequest { is_admin_context: true, ..DispositionRequest::comment_feed() },
            DispositionRequest { is_async_context: true, ..DispositionRequest::comment_feed() },
            DispositionRequest { is_api_context: true, ..DispositionRequest::comment_feed() },
        ];
        for req in exempt {
            assert_eq!(decide(&req, &config(404, "")), Disposition::PassThrough);
        }
    }

    #[test]
    fn not_found_codes() {
        let req = DispositionRequest::comment_feed();
        assert_eq!(decide(&req, &config(404, "")), Disposition::NotFound { status: StatusCode::NOT_FOUND });
        assert_eq!(decide(&req, &config(410, "")), Disposition::NotFound { status: StatusCode::GONE });
    }

    #[test]
    fn default_status_is_404() {
        let cfg = PolicyConfig::new(ROOT).unwrap();
        assert_eq!(
            decide(&DispositionRequest::comment_feed(), &cfg),
            Disposition::NotFound { status: StatusCode::NOT_FOUND },
        );
    }

    #[test]
    fn redirect_codes_are_kept() {
        let req = DispositionRequest::comment_feed();
        for (code, status) in [
            (301, StatusCode::MOVED_PERMANENTLY),
            (302, StatusCode::FOUND),
            (307, StatusCode::TEMPORARY_REDIRECT),
            (308, StatusCode::PERMANENT_REDIRECT),
        ] {
            assert_eq!(decide(&req, &config(code, ROOT)), redirect(ROOT, status));
        }
    }

    #[test]
    fn invalid_codes_clamp_to_301() {
        let req = DispositionRequest::comment_feed();
        for code in [0, 200, 300, 303, 304, 399, 500, 999] {
            assert_eq!(decide(&req, &config(code, ROOT)), redirect(ROOT, StatusCode::MOVED_PERMANENTLY));
        }
    }

    #[test]
    fn empty_target_falls_back_to_site_root() {
        let cfg = PolicyConfig::new("https://blog.example.org/").unwrap().status_code(301);
        assert_eq!(
            decide(&DispositionRequest::comment_feed(), &cfg),
            redirect("https://blog.example.org/", StatusCode::MOVED_PERMANENTLY),
        );
    }

    #[test]
    fn same_site_targets_are_kept() {
        let req = DispositionRequest::comment_feed();
        for target in ["https://EXAMPLE.com/goodbye", "http://example.com:8080/x", "/no-comments"] {
            assert_eq!(decide(&req, &config(302, target)), redirect(target, StatusCode::FOUND));
        }
    }

    #[test]
    fn off_site_targets_fall_back_to_site_root() {
        let req = DispositionRequest::comment_feed();
        for target in ["https://evil.test/", "//evil.test/", "/\\evil.test", "javascript:alert(1)", "not a url"] {
            assert_eq!(decide(&req, &config(302, target)), redirect(ROOT, StatusCode::FOUND), "{target}");
        }
    }

    #[test]
    fn allow_listed_host_is_kept() {
        let cfg = PolicyConfig::new(ROOT)
            .unwrap()
            .status_code(307)
            .allow_host("News.Example.net")
            .redirect_url("https://news.example.net/archive");
        assert_eq!(
            decide(&DispositionRequest::comment_feed(), &cfg),
            redirect("https://news.example.net/archive", StatusCode::TEMPORARY_REDIRECT),
        );
    }

    #[test]
    fn off_site_target_is_only_ignored_when_redirecting() {
        assert!(config(302, "https://evil.test/").ignores_redirect_url());
        assert!(!config(404, "https://evil.test/").ignores_redirect_url());
        assert!(!config(410, "https://evil.test/").ignores_redirect_url());
        assert!(!config(302, "").ignores_redirect_url());
        assert!(!config(302, "/closed").ignores_redirect_url());

        // Builder order does not matter.
        let cfg = PolicyConfig::new(ROOT)
            .unwrap()
            .redirect_url("https://news.example.net/")
            .status_code(301)
            .allow_host("news.example.net");
        assert!(!cfg.ignores_redirect_url());
    }

    #[test]
    fn site_root_must_be_absolute_http() {
        assert!(matches!(PolicyConfig::new(""), Err(Error::Config(_))));
        assert!(matches!(PolicyConfig::new("/"), Err(Error::Config(_))));
        assert!(matches!(PolicyConfig::new("ftp://example.com/"), Err(Error::Config(_))));
    }
}
