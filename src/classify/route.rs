//! Comment-feed route matching.

use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::request::query_param;

/// Path patterns recognised as comment feeds out of the box.
///
/// The sitewide comments feed and the per-post feed, each with an optional
/// format segment (`/comments/feed/atom/`, `/hello-world/feed/rss2/`).
pub const DEFAULT_COMMENT_FEEDS: &[&str] = &[
    "/comments/feed",
    "/comments/feed/{format}",
    "/{slug}/feed",
    "/{slug}/feed/{format}",
];

/// Decides whether a request targets a comment feed.
///
/// Paths are matched against a radix tree of patterns; the query string is
/// checked for the `?feed=` forms that select comments.
pub struct RouteClassifier {
    tree: MatchitRouter<()>,
}

impl RouteClassifier {
    /// A classifier with no path patterns; only query-string feeds match.
    pub fn empty() -> Self {
        Self { tree: MatchitRouter::new() }
    }

    /// Builds a classifier from `{param}`-style patterns.
    pub fn from_patterns<S: AsRef<str>>(patterns: impl IntoIterator<Item = S>) -> Result<Self, Error> {
        patterns.into_iter().try_fold(Self::empty(), |classifier, p| classifier.route(p.as_ref()))
    }

    /// Adds one pattern. A trailing slash is ignored.
    pub fn route(mut self, pattern: &str) -> Result<Self, Error> {
        self.tree
            .insert(normalize(pattern), ())
            .map_err(|source| Error::Route { pattern: pattern.to_owned(), source })?;
        Ok(self)
    }

    pub fn is_comment_feed(&self, path: &str, query: Option<&str>) -> bool {
        self.tree.at(normalize(path)).is_ok() || query.is_some_and(is_comment_feed_query)
    }
}

impl Default for RouteClassifier {
    fn default() -> Self {
        Self::from_patterns(DEFAULT_COMMENT_FEEDS)
            .unwrap_or_else(|e| panic!("default comment feed routes: {e}"))
    }
}

fn normalize(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

/// `?feed=comments-rss2`, or any feed scoped to a single item
/// (`?p=12&feed=rss2`, `?page_id=3&feed=atom`, `?feed=rss2&withcomments=1`).
fn is_comment_feed_query(query: &str) -> bool {
    let Some(feed) = query_param(query, "feed") else {
        return false;
    };
    feed.starts_with("comments-")
        || query_param(query, "withcomments").as_deref() == Some("1")
        || query_param(query, "p").is_some()
        || query_param(query, "page_id").is_some()
}
