//! Classified client errors.
//!
//! Every failure that leaves the library store or the request dispatcher is
//! one of these values. Transport failures are converted at the edge so the
//! caller always gets a definite error branch to render.

use crate::api::transport::TransportError;
use std::error::Error;
use std::fmt;

/// Discriminant of [`ClientError`], handy for matching without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Http,
    InvalidVersion,
    NotFound,
    InvalidResource,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The request was sent but no response came back.
    Network(String),
    /// The backend answered with a non-2xx status.
    Http { status: u16, detail: String },
    /// A strategy token outside the known set was requested.
    InvalidVersion(String),
    /// The library id does not exist on the backend.
    NotFound(i64),
    /// A draft or patch failed local validation; nothing was sent.
    InvalidResource(String),
    /// Anything that does not fit the other kinds.
    Unknown(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Http { .. } => ErrorKind::Http,
            ClientError::InvalidVersion(_) => ErrorKind::InvalidVersion,
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::InvalidResource(_) => ErrorKind::InvalidResource,
            ClientError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// HTTP status carried by the error, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::NotFound(_) => Some(404),
            _ => None,
        }
    }

    pub(crate) fn unexpected_payload(what: &str, err: impl fmt::Display) -> Self {
        ClientError::Unknown(format!("Unexpected {what} payload: {err}"))
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NoResponse(message) => ClientError::Network(message),
            TransportError::Status { status, body } => ClientError::Http {
                status,
                detail: summarize_error_body(&body),
            },
            TransportError::Decode { status, message } => {
                ClientError::Unknown(format!("Invalid JSON in {status} response: {message}"))
            }
            TransportError::Request(message) => ClientError::Unknown(message),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network(message) => {
                write!(f, "No response received from the backend: {message}")
            }
            ClientError::Http { status, detail } if detail.is_empty() => {
                write!(f, "HTTP error! status: {status}")
            }
            ClientError::Http { status, detail } => {
                write!(f, "HTTP error! status: {status} ({detail})")
            }
            ClientError::InvalidVersion(token) => write!(
                f,
                "Unknown strategy '{token}'. Expected one of: plain, pipeline, rag, rag-2"
            ),
            ClientError::NotFound(id) => write!(f, "Library {id} not found"),
            ClientError::InvalidResource(reason) => write!(f, "Invalid library: {reason}"),
            ClientError::Unknown(message) => write!(f, "Error: {message}"),
        }
    }
}

impl Error for ClientError {}

/// Pulls a one-line summary out of an error body.
///
/// The backend reports failures as `{"detail": ...}`; other servers in front
/// of it may use `{"error": {"message": ...}}` or `{"message": ...}`. Plain
/// text bodies are collapsed onto one line.
pub fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let summary = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|detail| match detail {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Null => None,
                    other => Some(other.to_string()),
                })
                .or_else(|| {
                    value
                        .pointer("/error/message")
                        .and_then(|v| v.as_str())
                        .map(str::to_owned)
                })
                .or_else(|| {
                    value
                        .get("message")
                        .and_then(|v| v.as_str())
                        .map(str::to_owned)
                })
        })
        .unwrap_or_else(|| trimmed.to_string());

    summary.split_whitespace().collect::<Vec<_>>().join(" ")
}
