//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The client builds an `HttpRequest`
//! with the query already classified and parses an `HttpResponse`; executing
//! the GET is the job of a `Transport`. Every request this API needs is a
//! GET, so no method is carried.

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL without the query string.
    pub url: String,
    /// Query parameters, not yet URL-encoded.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// First header value with this name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest {
            url: "https://example.test/routes".to_string(),
            query: vec![("page[limit]".to_string(), "3".to_string())],
            headers: vec![("Accept".to_string(), "application/vnd.api+json".to_string())],
        };
        assert_eq!(req.header("accept"), Some("application/vnd.api+json"));
        assert_eq!(req.header("x-api-key"), None);
        assert_eq!(req.query_value("page[limit]"), Some("3"));
    }
}
