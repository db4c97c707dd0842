//! HTTP transport for the XML service
//!
//! The service is a plain HTTPS POST endpoint: one URL per operation, an XML
//! document as the body, and an XML (or `Error:`-prefixed plain text) body
//! back. The [`Transport`] trait is the seam tests use to substitute a
//! scripted server.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use thiserror::Error;

use digiprove_core::request::SDK_USER_AGENT;

/// A body starting with this marker is a transport-level failure report
/// rather than a service response.
pub const ERROR_PREFIX: &str = "Error:";

/// Transport-level failure: the request never produced a service response
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed
    #[error("transport setup failed: {0}")]
    Build(String),

    /// The request failed in flight or returned a non-success status
    #[error("request to {operation} failed: {message}")]
    Request { operation: String, message: String },
}

/// One-shot request transport
///
/// Implementations post `body` to `https://{host}{path}{operation}` and
/// return the response body as text. HTTP-level failures are reported as
/// [`TransportError`]; the caller handles service-level errors found in the
/// body.
pub trait Transport {
    fn post(
        &self,
        host: &str,
        path: &str,
        operation: &str,
        body: &str,
    ) -> Result<String, TransportError>;
}

/// Default transport over a blocking HTTPS client
///
/// Redirects are disabled: the endpoints are fixed, and a redirect of a
/// certification request would silently change who receives the content.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(SDK_USER_AGENT)
            .redirect(Policy::none())
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(
        &self,
        host: &str,
        path: &str,
        operation: &str,
        body: &str,
    ) -> Result<String, TransportError> {
        let url = format!("https://{host}{path}{operation}");
        let fail = |message: String| TransportError::Request {
            operation: operation.to_string(),
            message,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .body(body.to_string())
            .send()
            .map_err(|e| fail(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fail(format!("server returned {status}")));
        }
        response.text().map_err(|e| fail(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_prefix_matches_wire_marker() {
        assert!("Error: connection refused".starts_with(ERROR_PREFIX));
        assert!(!"<digiprove_certify_response>".starts_with(ERROR_PREFIX));
    }
}
