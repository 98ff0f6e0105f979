//! Comment-feed interception.

use tracing::debug;

use crate::classify::{ContextClassifier, RouteClassifier};
use crate::middleware::Middleware;
use crate::policy::{self, Disposition, DispositionRequest, PolicyConfig};
use crate::request::Request;
use crate::response::Response;

const NO_CACHE: &str = "no-cache, must-revalidate, max-age=0, no-store, private";
const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Answers comment-feed requests with a 404/410 or a redirect.
///
/// ```rust
/// use hush::middleware::CommentShield;
/// use hush::policy::PolicyConfig;
/// use hush::Router;
///
/// let policy = PolicyConfig::new("https://example.com/").unwrap().status_code(410);
/// let app = Router::new().layer(CommentShield::new(policy));
/// ```
pub struct CommentShield {
    routes: RouteClassifier,
    contexts: ContextClassifier,
    policy: PolicyConfig,
}

impl CommentShield {
    /// Shield with the default route and context classifiers.
    pub fn new(policy: PolicyConfig) -> Self {
        Self::with_classifiers(RouteClassifier::default(), ContextClassifier::default(), policy)
    }

    pub fn with_classifiers(
        routes: RouteClassifier,
        contexts: ContextClassifier,
        policy: PolicyConfig,
    ) -> Self {
        Self { routes, contexts, policy }
    }

    pub fn classify(&self, req: &Request) -> DispositionRequest {
        let contexts = self.contexts.classify(req);
        DispositionRequest {
            is_comment_feed_route: self.routes.is_comment_feed(req.path(), req.query()),
            is_admin_context: contexts.admin,
            is_async_context: contexts.background,
            is_api_context: contexts.api,
        }
    }
}

impl Middleware for CommentShield {
    fn on_request(&self, req: &Request) -> Option<Response> {
        let classified = self.classify(req);
        let disposition = policy::decide(&classified, &self.policy);
        if disposition != Disposition::PassThrough {
            debug!(path = req.path(), ?disposition, "comment feed intercepted");
        } else if classified.is_comment_feed_route {
            debug!(path = req.path(), ?classified, "comment feed exempt");
        }
        respond(disposition)
    }
}

/// Turns a disposition into the response that ends the request.
///
/// Not-found responses carry cache-suppression headers so intermediaries do
/// not keep serving the old feed. `PassThrough` yields `None`.
pub fn respond(disposition: Disposition) -> Option<Response> {
    match disposition {
        Disposition::Redirect { target, status } => Some(Response::redirect(&target, status)),
        Disposition::NotFound { status } => Some(
            Response::builder()
                .status(status)
                .header("cache-control", NO_CACHE)
                .header("expires", EXPIRED)
                .header("pragma", "no-cache")
                .no_body(),
        ),
        Disposition::PassThrough => None,
    }
}
