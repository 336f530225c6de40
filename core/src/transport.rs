//! Executing requests built by the client.
//!
//! `Transport` is the seam between the deterministic core and the network.
//! The bundled `UreqTransport` performs a blocking GET; tests and hosts with
//! their own HTTP stack implement the trait themselves.

use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one request/response round trip.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::blocking::UreqTransport;

#[cfg(feature = "ureq")]
mod blocking {
    use tracing::debug;

    use super::Transport;
    use crate::error::{ApiError, Result};
    use crate::http::{HttpRequest, HttpResponse};

    /// Blocking transport backed by a `ureq::Agent`.
    ///
    /// Status codes are returned as data so the client can interpret them.
    #[derive(Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl UreqTransport {
        pub fn new() -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            let mut builder = self.agent.get(&request.url);
            for (key, value) in &request.query {
                builder = builder.query(key, value);
            }
            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let mut response = builder.call().map_err(|e| ApiError::Transport(Box::new(e)))?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| ApiError::Transport(Box::new(e)))?;

            debug!(url = %request.url, status, bytes = body.len(), "completed request");
            Ok(HttpResponse { status, headers, body })
        }
    }
}
