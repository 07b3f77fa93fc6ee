//! Decoding of the generic response envelope returned by every Zoho Books endpoint.
//!
//! Each response carries an application `code` and `message` next to whatever
//! payload the operation produced (`"contact"`, `"invoices"`, ...). Errors are
//! signalled through those body fields, not the HTTP status line.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    Client,
    entities::Resource,
    error::{Error, Result},
};

const SNIPPET_LEN: usize = 120;

/// The parsed body of a Zoho Books response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// Which part of the envelope an operation expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// A single record under the resource's singular key.
    Single,
    /// A list under the resource's plural key.
    List,
    /// No record, only the acknowledgement message.
    Ack,
}

/// The payload an operation projected out of an [`Envelope`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<R> {
    Single(R),
    List(Vec<R>),
    Ack(String),
}

impl<R: Resource> Payload<R> {
    /// The record of a [`Projection::Single`] payload.
    pub fn into_single(self) -> Result<R> {
        match self {
            Self::Single(record) => Ok(record),
            _ => Err(Error::MissingPayload { key: R::KEY }),
        }
    }

    /// The records of a [`Projection::List`] payload.
    pub fn into_list(self) -> Result<Vec<R>> {
        match self {
            Self::List(records) => Ok(records),
            _ => Err(Error::MissingPayload { key: R::LIST_KEY }),
        }
    }
}

impl Envelope {
    /// The application status code; absent means success.
    #[must_use]
    pub fn code(&self) -> i64 {
        self.code.unwrap_or_default()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }

    /// Any other top-level field of the envelope.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Messages from the nested `data.errors` list (e-invoice operations).
    #[must_use]
    pub fn nested_errors(&self) -> Vec<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.get("errors"))
            .and_then(Value::as_array)
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|error| error.get("message").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Project the payload selected by `projection` for resource `R`.
    pub fn project<R: Resource>(self, projection: Projection) -> Result<Payload<R>> {
        match projection {
            Projection::Single => self.single().map(Payload::Single),
            Projection::List => self.list().map(Payload::List),
            Projection::Ack => Ok(Payload::Ack(self.message.unwrap_or_default())),
        }
    }

    fn single<R: Resource>(mut self) -> Result<R> {
        match self.fields.remove(R::KEY) {
            None | Some(Value::Null) => Err(Error::MissingPayload { key: R::KEY }),
            Some(value) => from_value(value),
        }
    }

    // An absent list is an empty one.
    fn list<R: Resource>(mut self) -> Result<Vec<R>> {
        match self.fields.remove(R::LIST_KEY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => from_value(value),
        }
    }
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        error!("Failed to deserialize payload: {}", e);
        Error::from(e)
    })
}

/// Parse a raw body into an envelope and classify application errors.
pub fn parse(body: &[u8]) -> Result<Envelope> {
    debug!("Response body size: {} bytes", body.len());

    let envelope: Envelope = serde_json::from_slice(body).map_err(|e| {
        let snippet = String::from_utf8_lossy(body)
            .chars()
            .take(SNIPPET_LEN)
            .collect::<String>();
        error!(
            "Deserialization error: {}, body length: {}, starting with: {}",
            e,
            body.len(),
            snippet
        );
        Error::DeserializationError {
            source: e,
            length: body.len(),
            snippet: Some(snippet),
        }
    })?;

    if envelope.code() != 0 {
        warn!(code = envelope.code(), api_message = envelope.message(), "API returned an error");
        return Err(Error::application(envelope.code(), envelope.message()));
    }

    if let Some(first) = envelope.nested_errors().first() {
        warn!(api_message = *first, "API returned nested errors");
        return Err(Error::application(envelope.code(), first.to_lowercase()));
    }

    Ok(envelope)
}

/// Decode a dispatched response.
///
/// A transport error is propagated untouched. Otherwise the whole body is read
/// through [`Client::read_body`], which consumes the response and hands the
/// connection back to the pool whether or not parsing succeeds.
#[instrument(skip(client, response))]
pub async fn decode(client: &Client, response: Result<reqwest::Response>) -> Result<Envelope> {
    let body = client.read_body(response?).await?;
    parse(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{contact::Contact, currency::Currency};

    #[test]
    fn success_envelope_projects_contact() {
        let envelope =
            parse(br#"{"code":0,"contact":{"contact_id":"C1","contact_name":"Acme"}}"#).unwrap();
        let contact: Contact = envelope.single().unwrap();
        assert_eq!(contact.contact_id, "C1");
        assert_eq!(contact.contact_name, "Acme");
    }

    #[test]
    fn error_envelope_surfaces_message() {
        let error = parse(br#"{"code":14,"message":"invalid organization id"}"#).unwrap_err();
        assert_eq!(error.to_string(), "invalid organization id");
        assert_eq!(error.code(), Some(14));
    }

    #[test]
    fn error_code_wins_over_partial_payload() {
        let error = parse(br#"{"code":1002,"message":"nope","contact":{"contact_id":"C1"}}"#)
            .unwrap_err();
        assert!(matches!(error, Error::Application { code: 1002, .. }));
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let error = parse(b"not-json").unwrap_err();
        assert!(error.is_decode());
        match error {
            Error::DeserializationError { length, snippet, .. } => {
                assert_eq!(length, 8);
                assert_eq!(snippet.as_deref(), Some("not-json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn absent_code_is_success() {
        let envelope = parse(br#"{"currencies":[{"currency_id":"1","currency_code":"INR"}]}"#)
            .unwrap();
        let currencies: Vec<Currency> = envelope.list().unwrap();
        assert_eq!(currencies.len(), 1);
        assert_eq!(currencies[0].currency_code, "INR");
    }

    #[test]
    fn nested_errors_are_lower_cased() {
        let error = parse(
            br#"{"code":0,"message":"","data":{"errors":[{"code":2150,"message":"Invalid GSTIN"}]}}"#,
        )
        .unwrap_err();
        assert_eq!(error.to_string(), "invalid gstin");
    }

    #[test]
    fn projection_selects_requested_branch() {
        let body = br#"{"code":0,"message":"success","contacts":[{"contact_id":"A"},{"contact_id":"B"}]}"#;
        let payload = parse(body).unwrap().project::<Contact>(Projection::List).unwrap();
        let contacts = payload.into_list().unwrap();
        assert_eq!(contacts.len(), 2);

        let ack = parse(body).unwrap().project::<Contact>(Projection::Ack).unwrap();
        assert_eq!(ack, Payload::Ack("success".to_string()));

        let missing = parse(body).unwrap().project::<Contact>(Projection::Single);
        assert!(matches!(missing, Err(Error::MissingPayload { key: "contact" })));

        let mismatched = parse(body)
            .unwrap()
            .project::<Contact>(Projection::Ack)
            .unwrap()
            .into_list();
        assert!(matches!(mismatched, Err(Error::MissingPayload { key: "contacts" })));
    }
}
