//! Request classification.
//!
//! The policy never looks at a request directly. These classifiers turn
//! paths, query strings and headers into the booleans
//! [`DispositionRequest`](crate::policy::DispositionRequest) carries.

pub mod context;
pub mod route;

pub use context::{ContextClassifier, Contexts};
pub use route::RouteClassifier;
