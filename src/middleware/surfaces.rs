//! Stages that close the remaining comment surfaces.
//!
//! Each stage is independent of the others and of [`CommentShield`]; install
//! any subset in any order.
//!
//! [`CommentShield`]: super::CommentShield

use http::{Method, StatusCode};
use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::classify::context::under;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::{ContentType, Response};

/// Removes the `x-pingback` header from every response.
pub struct PingbackHeader;

impl Middleware for PingbackHeader {
    fn on_response(&self, res: &mut Response) {
        res.remove_header("x-pingback");
    }
}

// ── Comment submission ────────────────────────────────────────────────────────

/// Refuses the comment form's submission endpoint with `403`.
pub struct CommentSubmission {
    path: String,
}

impl CommentSubmission {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for CommentSubmission {
    fn default() -> Self { Self::new("/wp-comments-post.php") }
}

impl Middleware for CommentSubmission {
    fn on_request(&self, req: &Request) -> Option<Response> {
        if req.path() != self.path {
            return None;
        }
        debug!(method = %req.method(), "comment submission refused");
        Some(
            Response::builder()
                .status(StatusCode::FORBIDDEN)
                .text("Sorry, comments are closed for this item."),
        )
    }
}

// ── REST ──────────────────────────────────────────────────────────────────────

const REST_NO_ROUTE: &str = r#"{"code":"rest_no_route","message":"No route was found matching the URL and request method.","data":{"status":404}}"#;

/// Answers the REST comment routes as if they were never registered.
///
/// Both the pretty-permalink form (`/wp-json/wp/v2/comments/7`) and the
/// query form (`/?rest_route=/wp/v2/comments`) are covered.
pub struct RestComments {
    prefix: String,
    rest_route: String,
}

impl RestComments {
    /// `api_root` is the REST mount point (`/wp-json`); `route` the comments
    /// collection below it (`/wp/v2/comments`).
    pub fn new(api_root: &str, route: &str) -> Self {
        Self {
            prefix: format!("{}{route}", api_root.trim_end_matches('/')),
            rest_route: route.to_owned(),
        }
    }
}

impl Default for RestComments {
    fn default() -> Self { Self::new("/wp-json", "/wp/v2/comments") }
}

impl Middleware for RestComments {
    fn on_request(&self, req: &Request) -> Option<Response> {
        let hit = under(req.path(), &self.prefix)
            || req.query_param("rest_route").is_some_and(|r| under(&r, &self.rest_route));
        if !hit {
            return None;
        }
        debug!(path = req.path(), "rest comment route removed");
        Some(
            Response::builder()
                .status(StatusCode::NOT_FOUND)
                .json(REST_NO_ROUTE.as_bytes().to_vec()),
        )
    }
}

// ── XML-RPC ───────────────────────────────────────────────────────────────────

/// Comment and pingback methods removed from the XML-RPC endpoint.
pub const BLOCKED_XMLRPC_METHODS: &[&str] = &[
    "pingback.extensions.getPingbacks",
    "pingback.ping",
    "wp.deleteComment",
    "wp.editComment",
    "wp.getComment",
    "wp.getCommentCount",
    "wp.getCommentStatusList",
    "wp.getComments",
    "wp.newComment",
];

/// Strips comment and pingback methods from an XML-RPC endpoint.
///
/// A call to a blocked method gets the same fault the endpoint returns for
/// an unknown method (`-32601`); every other call passes through untouched.
pub struct XmlRpcMethods {
    endpoint: String,
}

impl XmlRpcMethods {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into() }
    }
}

impl Default for XmlRpcMethods {
    fn default() -> Self { Self::new("/xmlrpc.php") }
}

impl Middleware for XmlRpcMethods {
    fn on_request(&self, req: &Request) -> Option<Response> {
        if req.method() != Method::POST || req.path() != self.endpoint {
            return None;
        }
        let name = method_name(req.body())?;
        let blocked = BLOCKED_XMLRPC_METHODS.iter().copied().find(|m| *m == name.as_str())?;
        debug!(method = blocked, "xml-rpc method removed");
        Some(Response::builder().bytes(ContentType::Xml, fault(blocked).into_bytes()))
    }
}

/// The trimmed `<methodName>` of an XML-RPC call, if the body has one.
///
/// Entities and CDATA are resolved and comments skipped, so the name is the
/// one the endpoint itself would dispatch on. Malformed XML yields `None`.
fn method_name(body: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();
    let mut name: Option<String> = None;
    loop {
        match reader.read_event_into(&mut buf).ok()? {
            Event::Start(e) if e.local_name().as_ref() == b"methodName" => name = Some(String::new()),
            Event::Text(t) => {
                if let Some(name) = name.as_mut() {
                    name.push_str(&t.unescape().ok()?);
                }
            }
            Event::CData(c) => {
                if let Some(name) = name.as_mut() {
                    name.push_str(std::str::from_utf8(&c).ok()?);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"methodName" => {
                return name.map(|n| n.trim().to_owned());
            }
            Event::Eof => return None,
            _ => {}
        }
        buf.clear();
    }
}

fn fault(method: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n\
         <methodResponse><fault><value><struct>\
         <member><name>faultCode</name><value><int>-32601</int></value></member>\
         <member><name>faultString</name><value><string>server error. requested method {method} does not exist.</string></value></member>\
         </struct></value></fault></methodResponse>\n"
    )
}
