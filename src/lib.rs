//! # hush
//!
//! A minimal HTTP framework for sites that have switched comments off.
//!
//! ## The contract
//!
//! Comments live on more than the comment form. Feeds list them, a REST
//! collection serves them, XML-RPC accepts them, a response header
//! advertises pingbacks. hush closes all of those at the HTTP edge, before
//! your handlers run:
//!
//! - **Comment feeds**: answered `404` / `410`, or redirected, per
//!   [`policy::decide`]
//! - **Comment submission**: `403`
//! - **REST comment routes**: `404 rest_no_route`
//! - **XML-RPC comment and pingback methods**: "method does not exist" fault
//! - **`x-pingback` header**: stripped from every response
//!
//! Admin, background and API traffic is never intercepted by the feed
//! policy.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use hush::{Method, Request, Response, Router, Server};
//! use hush::middleware::{CommentShield, PingbackHeader};
//! use hush::policy::PolicyConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hush::Error> {
//!     let policy = PolicyConfig::new("https://example.com/")?.status_code(410);
//!
//!     let app = Router::new()
//!         .on(Method::GET, "/{slug}", post)
//!         .layer(CommentShield::new(policy))
//!         .layer(PingbackHeader);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn post(req: Request) -> Response {
//!     let slug = req.param("slug").unwrap_or("unknown");
//!     Response::text(format!("post {slug}"))
//! }
//! ```
//!
//! Or drive everything from a YAML file with [`config::load_from_file`] and
//! [`config::Config::apply`].

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod classify;
pub mod config;
pub mod middleware;
pub mod policy;

pub use error::Error;
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
