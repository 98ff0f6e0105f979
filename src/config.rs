//! Operator configuration (strict YAML).
//!
//! Every section rejects unknown keys, so a typo fails at startup instead of
//! silently leaving a surface open.
//!
//! ```yaml
//! version: 1
//! listen: "0.0.0.0:3000"
//! site:
//!   root_url: "https://example.com/"
//!   allowed_redirect_hosts: ["news.example.net"]
//! disposition:
//!   status_code: 302
//!   redirect_url: "https://example.com/comments-closed"
//! surfaces:
//!   xmlrpc_methods: false
//! ```

use std::fs;
use std::net::SocketAddr;

use serde::Deserialize;
use tracing::warn;

use crate::classify::context::{self, ContextClassifier};
use crate::classify::route::{self, RouteClassifier};
use crate::error::Error;
use crate::middleware::{CommentShield, CommentSubmission, PingbackHeader, RestComments, XmlRpcMethods};
use crate::policy::{self, PolicyConfig};
use crate::router::Router;

pub fn load_from_file(path: &str) -> Result<Config, Error> {
    let s = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("read {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<Config, Error> {
    let cfg: Config = serde_yaml::from_str(s)
        .map_err(|e| Error::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub version: u32,

    #[serde(default = "default_listen")]
    pub listen: String,

    pub site: SiteSection,

    #[serde(default)]
    pub disposition: DispositionSection,

    #[serde(default)]
    pub routes: RoutesSection,

    #[serde(default)]
    pub context: ContextSection,

    #[serde(default)]
    pub surfaces: SurfacesSection,
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        if self.version != 1 {
            return Err(Error::Config(format!("unsupported version {}", self.version)));
        }
        self.listen.parse::<SocketAddr>()
            .map_err(|e| Error::Config(format!("listen `{}`: {e}", self.listen)))?;
        PolicyConfig::new(&self.site.root_url)?;
        RouteClassifier::from_patterns(&self.routes.comment_feeds)?;
        self.context.validate()?;
        Ok(())
    }

    /// The disposition policy. An off-site or empty redirect URL is not an
    /// error here; the policy falls back to the site root.
    pub fn policy(&self) -> Result<PolicyConfig, Error> {
        let mut policy = PolicyConfig::new(&self.site.root_url)?;
        for host in &self.site.allowed_redirect_hosts {
            policy = policy.allow_host(host);
        }
        let policy = policy
            .status_code(self.disposition.status_code)
            .redirect_url(self.disposition.redirect_url.as_str());
        if policy.ignores_redirect_url() {
            warn!(
                target_url = %self.disposition.redirect_url,
                "redirect target is off-site, falling back to site root"
            );
        }
        Ok(policy)
    }

    pub fn shield(&self) -> Result<CommentShield, Error> {
        Ok(CommentShield::with_classifiers(
            RouteClassifier::from_patterns(&self.routes.comment_feeds)?,
            ContextClassifier::new(
                self.context.admin_prefixes.clone(),
                self.context.async_paths.clone(),
                self.context.api_prefixes.clone(),
            ),
            self.policy()?,
        ))
    }

    /// Installs the shield and every enabled surface stage on `router`.
    pub fn apply(&self, router: Router) -> Result<Router, Error> {
        let mut router = router.layer(self.shield()?);
        let surfaces = &self.surfaces;
        if surfaces.pingback_header {
            router = router.layer(PingbackHeader);
        }
        if surfaces.comment_submission {
            router = router.layer(CommentSubmission::default());
        }
        if surfaces.rest_comments {
            router = router.layer(RestComments::default());
        }
        if surfaces.xmlrpc_methods {
            router = router.layer(XmlRpcMethods::default());
        }
        Ok(router)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    pub root_url: String,

    #[serde(default)]
    pub allowed_redirect_hosts: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispositionSection {
    #[serde(default = "default_status_code")]
    pub status_code: u16,

    #[serde(default)]
    pub redirect_url: String,
}

impl Default for DispositionSection {
    fn default() -> Self {
        Self { status_code: default_status_code(), redirect_url: String::new() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesSection {
    #[serde(default = "default_comment_feeds")]
    pub comment_feeds: Vec<String>,
}

impl Default for RoutesSection {
    fn default() -> Self {
        Self { comment_feeds: default_comment_feeds() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContextSection {
    #[serde(default = "default_admin_prefixes")]
    pub admin_prefixes: Vec<String>,

    #[serde(default = "default_async_paths")]
    pub async_paths: Vec<String>,

    #[serde(default = "default_api_prefixes")]
    pub api_prefixes: Vec<String>,
}

impl Default for ContextSection {
    fn default() -> Self {
        Self {
            admin_prefixes: default_admin_prefixes(),
            async_paths: default_async_paths(),
            api_prefixes: default_api_prefixes(),
        }
    }
}

impl ContextSection {
    pub fn validate(&self) -> Result<(), Error> {
        let all = self.admin_prefixes.iter()
            .chain(&self.async_paths)
            .chain(&self.api_prefixes);
        for path in all {
            if !path.starts_with('/') {
                return Err(Error::Config(format!("context path `{path}` must start with '/'")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfacesSection {
    #[serde(default = "enabled")]
    pub pingback_header: bool,

    #[serde(default = "enabled")]
    pub comment_submission: bool,

    #[serde(default = "enabled")]
    pub rest_comments: bool,

    #[serde(default = "enabled")]
    pub xmlrpc_methods: bool,
}

impl Default for SurfacesSection {
    fn default() -> Self {
        Self {
            pingback_header: true,
            comment_submission: true,
            rest_comments: true,
            xmlrpc_methods: true,
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_status_code() -> u16 {
    policy::DEFAULT_STATUS
}
fn default_comment_feeds() -> Vec<String> {
    context::owned(route::DEFAULT_COMMENT_FEEDS)
}
fn default_admin_prefixes() -> Vec<String> {
    context::owned(context::DEFAULT_ADMIN_PREFIXES)
}
fn default_async_paths() -> Vec<String> {
    context::owned(context::DEFAULT_ASYNC_PATHS)
}
fn default_api_prefixes() -> Vec<String> {
    context::owned(context::DEFAULT_API_PREFIXES)
}
fn enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
version: 1
site:
  root_url: "https://example.com/"
"#;

    #[test]
    fn minimal_config_takes_defaults() {
        let cfg = load_from_str(MINIMAL).unwrap();
        assert_eq!(cfg.listen, "0.0.0.0:3000");
        assert_eq!(cfg.disposition.status_code, 404);
        assert!(cfg.disposition.redirect_url.is_empty());
        assert_eq!(cfg.routes.comment_feeds.len(), route::DEFAULT_COMMENT_FEEDS.len());
        assert_eq!(cfg.context.admin_prefixes, vec!["/wp-admin".to_owned()]);
        assert!(cfg.surfaces.xmlrpc_methods);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = load_from_str(
            r#"
version: 1
site: { root_url: "https://example.com/" }
surfaces: { xmlrpc_methods: false }
context: { admin_prefixes: ["/admin"] }
"#,
        )
        .unwrap();
        assert!(!cfg.surfaces.xmlrpc_methods);
        assert!(cfg.surfaces.pingback_header);
        assert_eq!(cfg.context.admin_prefixes, vec!["/admin".to_owned()]);
        assert_eq!(cfg.context.api_prefixes.len(), context::DEFAULT_API_PREFIXES.len());
    }

    #[test]
    fn invalid_status_is_not_a_config_error() {
        let cfg = load_from_str(
            r#"
version: 1
site: { root_url: "https://example.com/" }
disposition: { status_code: 999, redirect_url: "https://elsewhere.test/" }
"#,
        );
        assert!(cfg.is_ok());
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            "version: 2\nsite: { root_url: \"https://example.com/\" }\n",
            "version: 1\nsite: { root_url: \"example.com\" }\n",
            "version: 1\nlisten: \"nowhere\"\nsite: { root_url: \"https://example.com/\" }\n",
            "version: 1\nsite: { root_url: \"https://example.com/\" }\ncontext: { api_prefixes: [\"wp-json\"] }\n",
            "version: 1\n",
        ];
        for yaml in cases {
            assert!(matches!(load_from_str(yaml), Err(Error::Config(_))), "{yaml}");
        }
    }
}
