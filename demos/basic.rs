//! A small blog with comments switched off.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!   HUSH_CONFIG=hush.yaml RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/hello-world
//!   curl -i http://localhost:3000/hello-world/feed/        # 404, no-cache
//!   curl -i http://localhost:3000/?feed=comments-rss2      # 404
//!   curl -i http://localhost:3000/feed                     # posts feed, 200
//!   curl -i -X POST http://localhost:3000/wp-comments-post.php -d 'comment=hi'

use hush::{Method, Request, Response, Router, Server, config};
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_CONFIG: &str = r#"
version: 1
listen: "127.0.0.1:3000"
site:
  root_url: "http://localhost:3000/"
"#;

#[tokio::main]
async fn main() -> Result<(), hush::Error> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = match std::env::var("HUSH_CONFIG") {
        Ok(path) => config::load_from_file(&path)?,
        Err(_) => config::load_from_str(DEFAULT_CONFIG)?,
    };

    let app = cfg.apply(
        Router::new()
            .on(Method::GET, "/",       home)
            .on(Method::GET, "/feed",   posts_feed)
            .on(Method::GET, "/{slug}", post),
    )?;

    Server::bind(&cfg.listen)?.serve(app).await
}

// GET /
async fn home(_req: Request) -> Response {
    Response::text("hello-world\n")
}

// GET /feed: the posts feed stays up; only comment feeds are closed.
async fn posts_feed(_req: Request) -> Response {
    Response::builder()
        .bytes(hush::ContentType::Xml, b"<rss version=\"2.0\"><channel/></rss>".to_vec())
}

// GET /{slug}: the pingback header is stripped on the way out.
async fn post(req: Request) -> Response {
    let slug = req.param("slug").unwrap_or("unknown");
    Response::builder()
        .header("x-pingback", "http://localhost:3000/xmlrpc.php")
        .text(format!("post: {slug}\n"))
}
