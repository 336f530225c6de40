//! Synchronous client core for a JSON:API public transit service.
//!
//! # Overview
//! Callers name an `Operation` and supply `Arguments`; the client translates
//! them into the API's query dialect (`filter[...]`, `fields[...]`,
//! `page[...]` or bare parameters, depending on the endpoint) and builds an
//! `HttpRequest`. A `Transport` executes it and `parse_response` turns the
//! body into JSON, which `Document` can decode further.
//!
//! # Design
//! - `TransitClient` is stateless; it holds only `ClientConfig`.
//! - Classification is a pure function in `query`, independent of I/O.
//! - The operation table in `catalog` is data, not per-endpoint code.
//! - No retries, backoff, rate limiting or pagination traversal.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod transport;
pub mod types;

pub use catalog::Operation;
pub use client::TransitClient;
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use http::{HttpRequest, HttpResponse};
pub use query::{classify, ArgValue, Arguments, Namespace, QueryParams};
pub use transport::Transport;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{Document, Prediction, Route, RouteType};
