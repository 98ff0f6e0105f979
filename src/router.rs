//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Middleware layers wrap
//! the lookup; see [`crate::middleware`].

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each [`Router::on`] and [`Router::layer`] call returns `self` so
/// registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    layers: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), layers: Vec::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use hush::{Method, Request, Response, Router};
    /// # async fn home(_: Request) -> Response { Response::text("") }
    /// # async fn post(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET, "/",       home)
    ///     .on(Method::GET, "/{slug}", post);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Append a middleware layer. Layers run in the order they are added.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Runs one request through the whole pipeline: request hooks, route
    /// lookup (or `404`), then response hooks.
    pub async fn handle(&self, mut req: Request) -> Response {
        let intercepted = self.layers.iter().find_map(|layer| layer.on_request(&req));

        let mut response = match intercepted {
            Some(res) => res,
            None => match self.lookup(req.method(), req.path()) {
                Some((handler, params)) => {
                    req.params = params;
                    handler.call(req).await
                }
                None => {
                    debug!(method = %req.method(), path = req.path(), "no route");
                    Response::status(StatusCode::NOT_FOUND)
                }
            },
        };

        for layer in &self.layers {
            layer.on_response(&mut response);
        }
        response
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}
