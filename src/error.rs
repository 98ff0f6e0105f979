//! Unified error type.

use thiserror::Error;

/// The error type returned by hush's fallible operations.
///
/// Application-level outcomes (a 404 for a comment feed, a 403 for a comment
/// submission, a redirect) are expressed as [`Response`](crate::Response)
/// values, not as `Error`s. This type surfaces startup and infrastructure
/// failures: a bad config file, an invalid route pattern, a port that cannot
/// be bound.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("invalid route `{pattern}`: {source}")]
    Route {
        pattern: String,
        #[source]
        source: matchit::InsertError,
    },
}
