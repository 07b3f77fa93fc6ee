//! Sentry integration for zohobooks-rs errors.
//!
//! Only available when the `sentry` feature is enabled.
//!
//! ```toml
//! [dependencies]
//! zohobooks-rs = { version = "0.1", features = ["sentry"] }
//! ```
//!
//! Span traces are only captured when tracing is set up with
//! `tracing_error::ErrorLayer`:
//!
//! ```ignore
//! use tracing_subscriber::prelude::*;
//! use tracing_error::ErrorLayer;
//!
//! tracing_subscriber::registry()
//!     .with(tracing_subscriber::fmt::layer())
//!     .with(ErrorLayer::default())
//!     .with(sentry::integrations::tracing::layer())
//!     .init();
//! ```

use std::collections::BTreeMap;

use sentry_core::{Breadcrumb, protocol::Value};

use crate::error::Error;

const BODY_PREVIEW_LEN: usize = 500;

/// Convert a zohobooks-rs Error into a Sentry breadcrumb.
impl<'a> From<&'a Error> for Breadcrumb {
    fn from(error: &'a Error) -> Self {
        let mut data = BTreeMap::new();
        let (category, message) = match error {
            Error::Config(reason) => ("zoho.config", format!("Missing credential: {reason}")),
            Error::Request(source) => ("http.request", format!("HTTP request error: {source}")),
            Error::Timeout { url, timeout, .. } => {
                data.insert("url".to_string(), Value::from(url.clone()));
                data.insert(
                    "timeout_ms".to_string(),
                    Value::from(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
                );
                ("http.request", "Request timed out".to_string())
            }
            Error::DeserializationError { length, .. } => {
                data.insert("length".to_string(), Value::from(*length));
                ("http.response", "Failed to decode response".to_string())
            }
            Error::MissingPayload { key } => {
                data.insert("key".to_string(), Value::from(*key));
                ("http.response", format!("Response has no `{key}` payload"))
            }
            Error::Serialization(_) => ("zoho.validation", "Failed to encode body".to_string()),
            Error::Application { code, message, .. } => {
                data.insert("code".to_string(), Value::from(*code));
                ("zoho.api", format!("Zoho Books API error: {message}"))
            }
            Error::Auth { message, .. } => ("auth", format!("OAuth error: {message}")),
            Error::InvalidEndpoint => ("zoho.config", "Invalid endpoint URL".to_string()),
            Error::Io(source) => ("zoho.io", format!("I/O error: {source}")),
        };

        Breadcrumb {
            ty: "error".to_string(),
            category: Some(category.to_string()),
            message: Some(message),
            data,
            level: sentry_core::Level::Error,
            ..Default::default()
        }
    }
}

/// Extract extra Sentry context from an error.
///
/// ```ignore
/// use sentry::configure_scope;
/// use zohobooks_rs::sentry_integration::error_to_sentry_context;
///
/// if let Err(e) = client.currencies().list().await {
///     configure_scope(|scope| {
///         for (key, value) in error_to_sentry_context(&e) {
///             scope.set_extra(&key, value);
///         }
///     });
/// }
/// ```
pub fn error_to_sentry_context(error: &Error) -> BTreeMap<String, Value> {
    let mut context = BTreeMap::new();

    if let Some(span_trace) = error.span_trace() {
        context.insert(
            "zoho.span_trace".to_string(),
            Value::from(format!("{span_trace}")),
        );
    }

    if let Some(code) = error.code() {
        context.insert("zoho.code".to_string(), Value::from(code));
    }

    match error {
        Error::Timeout { url, .. } => {
            context.insert("zoho.url".to_string(), Value::from(url.clone()));
        }
        Error::DeserializationError {
            snippet: Some(snippet),
            ..
        } => {
            let preview: String = snippet.chars().take(BODY_PREVIEW_LEN).collect();
            context.insert("zoho.response_body".to_string(), Value::from(preview));
        }
        _ => {}
    }

    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_error_breadcrumb_carries_code() {
        let error = Error::application(1002, "Invoice does not exist.");
        let breadcrumb = Breadcrumb::from(&error);
        assert_eq!(breadcrumb.category.as_deref(), Some("zoho.api"));
        assert_eq!(breadcrumb.data.get("code"), Some(&Value::from(1002)));

        let context = error_to_sentry_context(&error);
        assert!(context.contains_key("zoho.span_trace"));
        assert_eq!(context.get("zoho.code"), Some(&Value::from(1002)));
    }
}
