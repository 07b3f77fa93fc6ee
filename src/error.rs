use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;
use tracing_error::SpanTrace;

/// Errors that can occur when interacting with the Zoho Books API.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// A credential or the organization id is missing. Raised before any request is sent.
    #[error("missing credential: {0}")]
    #[diagnostic(
        code(zohobooks_rs::config_error),
        help("Provide an API key, or an OAuth access token together with an organization id")
    )]
    Config(String),

    #[error("error making request: {0:?}")]
    #[diagnostic(
        code(zohobooks_rs::request_error),
        help("Check your network connection and Zoho Books API availability")
    )]
    Request(#[source] reqwest::Error),

    #[error("request to {url} timed out after {timeout:?}")]
    #[diagnostic(
        code(zohobooks_rs::timeout),
        help("Increase the client timeout or retry the request later")
    )]
    Timeout {
        url: String,
        timeout: Duration,
        #[source]
        source: reqwest::Error,
    },

    #[error("error decoding response ({length} bytes): {source}")]
    #[diagnostic(
        code(zohobooks_rs::deserialization_error),
        help("The API returned data in an unexpected format")
    )]
    DeserializationError {
        #[source]
        source: serde_json::Error,
        length: usize,
        snippet: Option<String>,
    },

    #[error("response envelope has no `{key}` payload")]
    #[diagnostic(
        code(zohobooks_rs::missing_payload),
        help("The API answered successfully but without the expected record")
    )]
    MissingPayload { key: &'static str },

    #[error("error encoding request body: {0}")]
    #[diagnostic(code(zohobooks_rs::serialization_error))]
    Serialization(#[source] serde_json::Error),

    /// A structured error returned inside a successfully parsed response body.
    #[error("{message}")]
    #[diagnostic(
        code(zohobooks_rs::api_error),
        help("Review the message returned by the Zoho Books API")
    )]
    Application {
        code: i64,
        message: String,
        span_trace: SpanTrace,
    },

    /// An error returned while exchanging or refreshing an OAuth token.
    #[error("{message}")]
    #[diagnostic(
        code(zohobooks_rs::oauth2_error),
        help("Verify your OAuth client id, client secret, refresh token and redirect uri")
    )]
    Auth {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("endpoint could not be parsed as a URL")]
    #[diagnostic(
        code(zohobooks_rs::invalid_endpoint),
        help("Check that the configured base URLs are correctly formatted")
    )]
    InvalidEndpoint,

    #[error("i/o error: {0}")]
    #[diagnostic(code(zohobooks_rs::io_error))]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn application(code: i64, message: impl Into<String>) -> Self {
        Self::Application {
            code,
            message: message.into(),
            span_trace: SpanTrace::capture(),
        }
    }

    pub(crate) fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
            source: None,
        }
    }

    /// The application status code returned by the API, if this is an application error.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Application { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The span trace captured when an application error was created.
    #[must_use]
    pub fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            Self::Application { span_trace, .. } => Some(span_trace),
            _ => None,
        }
    }

    /// Whether the response body could not be turned into the expected payload.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::DeserializationError { .. } | Self::MissingPayload { .. }
        )
    }

    /// Whether the request ran out of time, either while sending or while reading the body.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Request(e) => e.is_timeout(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::DeserializationError {
            source: e,
            length: 0,
            snippet: None,
        }
    }
}

/// Type alias for results from this crate.
///
/// This is already a Miette diagnostic result due to the implementation of
/// the Diagnostic trait for the Error type.
pub type Result<O> = std::result::Result<O, Error>;
