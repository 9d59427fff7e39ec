//! HTTP transport seam.
//!
//! The store and the dispatcher only see the [`Transport`] trait so tests can
//! swap in scripted or in-memory backends. [`HttpTransport`] is the reqwest
//! implementation used by the binary.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2xx response. Empty bodies (204 and friends) come back as `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub json: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connect failure, timeout or a connection dropped before a response.
    NoResponse(String),
    /// The server answered with a non-2xx status.
    Status { status: u16, body: String },
    /// A 2xx response whose body is not JSON.
    Decode { status: u16, message: String },
    /// The request could not be built.
    Request(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NoResponse(message) => write!(f, "no response received: {message}"),
            TransportError::Status { status, .. } => write!(f, "server returned status {status}"),
            TransportError::Decode { status, message } => {
                write!(f, "invalid JSON in {status} response: {message}")
            }
            TransportError::Request(message) => write!(f, "could not build request: {message}"),
        }
    }
}

impl std::error::Error for TransportError {}

pub type TransportResult = Result<TransportResponse, TransportError>;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> TransportResult;

    async fn get(&self, url: &str) -> TransportResult {
        self.send(Method::Get, url, None).await
    }

    async fn post(&self, url: &str, body: &Value) -> TransportResult {
        self.send(Method::Post, url, Some(body)).await
    }

    async fn put(&self, url: &str, body: &Value) -> TransportResult {
        self.send(Method::Put, url, Some(body)).await
    }

    async fn delete(&self, url: &str) -> TransportResult {
        self.send(Method::Delete, url, None).await
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: Method, url: &str, body: Option<&Value>) -> TransportResult {
        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(method = %method, url = %url, "Sending backend request");
        let response = request.send().await.map_err(classify_send_error)?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| TransportError::NoResponse(err.to_string()))?;
        debug!(method = %method, url = %url, status = status.as_u16(), "Backend responded");

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_json_body(status.as_u16(), &text)
    }
}

fn classify_send_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Request(err.to_string())
    } else {
        TransportError::NoResponse(err.to_string())
    }
}

fn parse_json_body(status: u16, text: &str) -> TransportResult {
    if text.trim().is_empty() {
        return Ok(TransportResponse {
            status,
            json: Value::Null,
        });
    }
    serde_json::from_str(text)
        .map(|json| TransportResponse { status, json })
        .map_err(|err| TransportError::Decode {
            status,
            message: err.to_string(),
        })
}
