//! HTTP transports used to download external models
//!
//! Transports only open a response stream. Writing, length checks and
//! verification happen in the fetcher so every transport behaves the same.

use std::io::Read;
use std::time::Duration;

use crate::error::{PackError, Result, fetch};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// A download request
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub url: &'a str,
    /// Bearer token for gated hosts
    pub bearer: Option<&'a str>,
}

/// An open response body
pub struct Response {
    /// Announced body length, if any
    pub content_length: Option<u64>,
    pub body: Box<dyn Read + Send>,
}

/// Opens download streams
pub trait Transport: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &'static str;

    /// Send the request; a non-success status is an error
    fn open(&self, request: &Request<'_>) -> Result<Response>;
}

/// Primary transport on the `reqwest` blocking client
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| fetch::transport_failed("reqwest", "client setup", e))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    fn open(&self, request: &Request<'_>) -> Result<Response> {
        let mut builder = self.client.get(request.url);
        if let Some(token) = request.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .map_err(|e| fetch::transport_failed(self.name(), request.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch::http_status(request.url, status.as_u16()));
        }

        Ok(Response {
            content_length: response.content_length(),
            body: Box::new(response),
        })
    }
}

/// Fallback transport on `ureq`
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(USER_AGENT)
            .timeout_connect(CONNECT_TIMEOUT)
            .build();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn name(&self) -> &'static str {
        "ureq"
    }

    fn open(&self, request: &Request<'_>) -> Result<Response> {
        let mut call = self.agent.get(request.url);
        if let Some(token) = request.bearer {
            call = call.set("Authorization", &format!("Bearer {}", token));
        }

        let response = call.call().map_err(|e| match e {
            ureq::Error::Status(status, _) => fetch::http_status(request.url, status),
            ureq::Error::Transport(transport) => {
                fetch::transport_failed(self.name(), request.url, transport)
            }
        })?;

        let content_length = response
            .header("Content-Length")
            .and_then(|value| value.trim().parse().ok());

        Ok(Response {
            content_length,
            body: response.into_reader(),
        })
    }
}

/// Transports in the order they are tried
///
/// The `reqwest` client is skipped when it cannot be set up, leaving
/// `ureq` alone.
pub fn default_transports() -> Vec<Box<dyn Transport>> {
    let mut transports: Vec<Box<dyn Transport>> = Vec::new();
    match ReqwestTransport::new() {
        Ok(transport) => transports.push(Box::new(transport)),
        Err(e) => tracing::warn!("{}", e),
    }
    transports.push(Box::new(UreqTransport::new()));
    transports
}

/// Open a request on the first transport that succeeds
///
/// Returns the name of the transport used with the response.
pub fn open_with_fallback(
    transports: &[Box<dyn Transport>],
    request: &Request<'_>,
) -> Result<(&'static str, Response)> {
    let mut last_error = None;
    for transport in transports {
        match transport.open(request) {
            Ok(response) => return Ok((transport.name(), response)),
            Err(e) => {
                tracing::debug!("{} failed, trying next transport: {}", transport.name(), e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| PackError::TransportFailed {
        transport: "none".to_string(),
        url: request.url.to_string(),
        reason: "no transport available".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct Failing;

    impl Transport for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn open(&self, request: &Request<'_>) -> Result<Response> {
            Err(fetch::transport_failed(self.name(), request.url, "connection refused"))
        }
    }

    struct Serving(&'static [u8]);

    impl Transport for Serving {
        fn name(&self) -> &'static str {
            "serving"
        }

        fn open(&self, _request: &Request<'_>) -> Result<Response> {
            Ok(Response {
                content_length: Some(self.0.len() as u64),
                body: Box::new(Cursor::new(self.0)),
            })
        }
    }

    #[test]
    fn test_fallback_to_second_transport() {
        let transports: Vec<Box<dyn Transport>> = vec![Box::new(Failing), Box::new(Serving(b"ok"))];
        let request = Request {
            url: "https://example.com/a",
            bearer: None,
        };

        let (name, mut response) = open_with_fallback(&transports, &request).unwrap();
        assert_eq!(name, "serving");

        let mut body = Vec::new();
        response.body.read_to_end(&mut body).unwrap();
        assert_eq!(body, b"ok");
    }

    #[test]
    fn test_all_transports_failing_reports_last_error() {
        let transports: Vec<Box<dyn Transport>> = vec![Box::new(Failing)];
        let request = Request {
            url: "https://example.com/a",
            bearer: None,
        };

        let err = open_with_fallback(&transports, &request).err().unwrap();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_no_transports() {
        let request = Request {
            url: "https://example.com/a",
            bearer: None,
        };
        assert!(open_with_fallback(&[], &request).is_err());
    }

    #[test]
    fn test_default_transports_end_with_ureq() {
        let transports = default_transports();
        assert_eq!(transports.last().map(|t| t.name()), Some("ureq"));
    }
}
