//! Request builder and response parser for the transit API.
//!
//! # Design
//! `TransitClient` holds only static configuration and carries no mutable
//! state between calls. `build_request` runs the catalog check and the query
//! classifier and produces an `HttpRequest`; `parse_response` turns an
//! `HttpResponse` into a JSON value. `call` glues the two around a
//! `Transport` for callers who do not drive the round trip themselves.

use serde_json::Value;
use tracing::debug;

use crate::catalog::{path_for, Operation};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::query::{classify, Arguments};
use crate::transport::Transport;
use crate::types::{Document, Prediction, Route};

pub const ACCEPT: &str = "application/vnd.api+json";

/// Synchronous, stateless client for the transit API.
#[derive(Debug, Clone)]
pub struct TransitClient {
    config: ClientConfig,
}

impl Default for TransitClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl TransitClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self::new(ClientConfig::default().with_base_url(base_url))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the GET request for a catalog operation.
    pub fn build_request(&self, operation: Operation, args: &Arguments) -> Result<HttpRequest> {
        operation.check(args)?;
        self.build_endpoint_request(operation.endpoint(), args)
    }

    /// Build the GET request for a raw endpoint identifier.
    ///
    /// Argument names are not checked against the catalog.
    pub fn build_endpoint_request(&self, endpoint: &str, args: &Arguments) -> Result<HttpRequest> {
        let query = classify(endpoint, args)?;

        let mut headers = vec![("Accept".to_string(), ACCEPT.to_string())];
        headers.extend(self.config.api_key_header());

        let url = format!("{}/{}", self.config.normalized_base_url(), path_for(endpoint));
        debug!(endpoint, url = %url, params = query.len(), "built request");
        Ok(HttpRequest {
            url,
            query: query.into_iter().collect(),
            headers,
        })
    }

    /// Parse a response body, rejecting non-2xx statuses and empty payloads.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        if response.body.trim().is_empty() {
            return Err(ApiError::EmptyResponse);
        }
        let value: Value = serde_json::from_str(&response.body)?;
        if is_empty_payload(&value) {
            return Err(ApiError::EmptyResponse);
        }
        Ok(value)
    }

    /// One classify-then-fetch cycle returning the raw JSON document.
    pub fn call<T: Transport>(&self, transport: &T, operation: Operation, args: &Arguments) -> Result<Value> {
        let request = self.build_request(operation, args)?;
        let response = transport.execute(&request)?;
        self.parse_response(response)
    }

    pub fn call_document<T: Transport>(
        &self,
        transport: &T,
        operation: Operation,
        args: &Arguments,
    ) -> Result<Document> {
        Document::from_value(self.call(transport, operation, args)?)
    }

    pub fn routes<T: Transport>(&self, transport: &T, args: &Arguments) -> Result<Vec<Route>> {
        self.call_document(transport, Operation::Routes, args)?.routes()
    }

    pub fn route<T: Transport>(&self, transport: &T, id: &str) -> Result<Route> {
        let args = Arguments::new().set("id", id);
        let mut routes = self.call_document(transport, Operation::RouteById, &args)?.routes()?;
        routes.pop().ok_or(ApiError::EmptyResponse)
    }

    pub fn predictions<T: Transport>(&self, transport: &T, args: &Arguments) -> Result<Vec<Prediction>> {
        self.call_document(transport, Operation::Predictions, args)?.predictions()
    }

    pub fn stops<T: Transport>(&self, transport: &T, args: &Arguments) -> Result<Document> {
        self.call_document(transport, Operation::Stops, args)
    }

    pub fn vehicles<T: Transport>(&self, transport: &T, args: &Arguments) -> Result<Document> {
        self.call_document(transport, Operation::Vehicles, args)
    }

    pub fn alerts<T: Transport>(&self, transport: &T, args: &Arguments) -> Result<Document> {
        self.call_document(transport, Operation::Alerts, args)
    }
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}
