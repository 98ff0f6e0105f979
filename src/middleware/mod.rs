//! Middleware layer.
//!
//! A middleware sees every request before routing and every response after
//! it. It can answer a request itself ([`Middleware::on_request`] returns
//! `Some`) or adjust whatever response goes out
//! ([`Middleware::on_response`]).
//!
//! Layers run in registration order. Response hooks run on every response,
//! including ones produced by another layer's short-circuit, so a stripping
//! stage like [`PingbackHeader`] holds across the whole site.
//!
//! Built-in middleware:
//! - [`CommentShield`]: 404s or redirects comment feeds
//! - [`PingbackHeader`], [`CommentSubmission`], [`RestComments`],
//!   [`XmlRpcMethods`]: close the remaining comment surfaces

mod shield;
mod surfaces;

pub use shield::{CommentShield, respond};
pub use surfaces::{CommentSubmission, PingbackHeader, RestComments, XmlRpcMethods};

use crate::request::Request;
use crate::response::Response;

/// A request pipeline stage.
///
/// Stages are shared across connection tasks, so they hold no per-request
/// state. Both hooks default to doing nothing.
pub trait Middleware: Send + Sync + 'static {
    /// Answer the request here, skipping routing and later layers.
    fn on_request(&self, _req: &Request) -> Option<Response> {
        None
    }

    /// Adjust an outgoing response.
    fn on_response(&self, _res: &mut Response) {}
}
