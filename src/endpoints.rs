use std::{convert::Infallible, fmt, str::FromStr};

use url::form_urlencoded;

/// A regional Zoho Books deployment.
///
/// Every datacenter has its own API origin and its own accounts server used
/// for OAuth. Unknown codes resolve to [`Datacenter::Default`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Datacenter {
    #[default]
    Default,
    In,
    Eu,
    Au,
}

impl Datacenter {
    /// Parse a datacenter code (`"in"`, `"eu"`, `"au"`). Anything else is the default origin.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "in" => Self::In,
            "eu" => Self::Eu,
            "au" => Self::Au,
            _ => Self::Default,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Default => "",
            Self::In => "in",
            Self::Eu => "eu",
            Self::Au => "au",
        }
    }

    /// Base URL of the Books API for this datacenter.
    #[must_use]
    pub fn api_origin(self) -> &'static str {
        match self {
            Self::Default => "https://books.zoho.com/api/v3",
            Self::In => "https://books.zoho.in/api/v3",
            Self::Eu => "https://books.zoho.eu/api/v3",
            Self::Au => "https://books.zoho.com.au/api/v3",
        }
    }

    /// Base URL of the accounts (OAuth) server for this datacenter.
    #[must_use]
    pub fn accounts_origin(self) -> &'static str {
        match self {
            Self::Default => "https://accounts.zoho.com",
            Self::In => "https://accounts.zoho.in",
            Self::Eu => "https://accounts.zoho.eu",
            Self::Au => "https://accounts.zoho.com.au",
        }
    }
}

impl FromStr for Datacenter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_code(s))
    }
}

impl fmt::Display for Datacenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            other => write!(f, "{}", other.code()),
        }
    }
}

/// Resolve `path` against the datacenter's API origin and append the organization id.
#[must_use]
pub fn resolve(path: &str, datacenter: Datacenter, organization_id: &str) -> String {
    resolve_with_base(datacenter.api_origin(), path, organization_id)
}

/// Same as [`resolve`] but against an explicit base URL.
#[must_use]
pub fn resolve_with_base(base: &str, path: &str, organization_id: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    let organization_id: String = form_urlencoded::byte_serialize(organization_id.as_bytes()).collect();
    format!(
        "{}{path}{separator}organization_id={organization_id}",
        base.trim_end_matches('/')
    )
}

/// Append query pairs to a path, skipping pairs with empty values.
#[must_use]
pub fn with_query(path: impl Into<String>, pairs: &[(&str, &str)]) -> String {
    let mut path = path.into();
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs.iter().filter(|(_, value)| !value.is_empty()) {
        query.append_pair(key, value);
        any = true;
    }
    if any {
        path.push(if path.contains('?') { '&' } else { '?' });
        path.push_str(&query.finish());
    }
    path
}

/// A typed representation of Zoho Books API endpoints.
///
/// Produces the path relative to the datacenter origin; the organization id is
/// appended later by [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZohoEndpoint {
    Contacts,
    Contact(String),
    Invoices,
    Invoice(String),
    InvoiceEmail(String),
    InvoiceStatus(String, String),
    InvoiceEInvoicePush(String),
    InvoiceBillingAddress(String),
    InvoicesPdf,
    CustomerPayments,
    CustomerPayment(String),
    BankAccounts,
    BankTransactions,
    Currencies,

    // Custom endpoint with path components
    Custom(Vec<String>),
}

impl ZohoEndpoint {
    /// Converts the endpoint to a path such as `/invoices/42/email`.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Contacts => "/contacts".to_string(),
            Self::Contact(id) => format!("/contacts/{id}"),
            Self::Invoices => "/invoices".to_string(),
            Self::Invoice(id) => format!("/invoices/{id}"),
            Self::InvoiceEmail(id) => format!("/invoices/{id}/email"),
            Self::InvoiceStatus(id, status) => format!("/invoices/{id}/status/{status}"),
            Self::InvoiceEInvoicePush(id) => format!("/invoices/{id}/einvoice/push"),
            Self::InvoiceBillingAddress(id) => format!("/invoices/{id}/address/billing"),
            Self::InvoicesPdf => "/invoices/pdf".to_string(),
            Self::CustomerPayments => "/customerpayments".to_string(),
            Self::CustomerPayment(id) => format!("/customerpayments/{id}"),
            Self::BankAccounts => "/bankaccounts".to_string(),
            Self::BankTransactions => "/banktransactions".to_string(),
            Self::Currencies => "/settings/currencies".to_string(),
            Self::Custom(components) => format!("/{}", components.join("/")),
        }
    }
}

impl fmt::Display for ZohoEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl From<ZohoEndpoint> for String {
    fn from(endpoint: ZohoEndpoint) -> Self {
        endpoint.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datacenter_origins_match_table() {
        let table = [
            ("", "https://books.zoho.com/api/v3"),
            ("in", "https://books.zoho.in/api/v3"),
            ("eu", "https://books.zoho.eu/api/v3"),
            ("au", "https://books.zoho.com.au/api/v3"),
        ];
        for (code, origin) in table {
            let url = resolve("/contacts", Datacenter::from_code(code), "1");
            assert!(url.starts_with(origin), "{code}: {url}");
            assert_eq!(url, format!("{origin}/contacts?organization_id=1"));
        }
    }

    #[test]
    fn unknown_datacenter_falls_back_to_default() {
        assert_eq!(Datacenter::from_code("jp"), Datacenter::Default);
        assert_eq!(Datacenter::from_code("EU"), Datacenter::Eu);
        assert_eq!(
            resolve("/invoices", Datacenter::from_code("mars"), "9"),
            "https://books.zoho.com/api/v3/invoices?organization_id=9"
        );
    }

    #[test]
    fn organization_id_uses_ampersand_after_existing_query() {
        assert_eq!(
            resolve("/contacts?email_contains=a", Datacenter::Default, "77"),
            "https://books.zoho.com/api/v3/contacts?email_contains=a&organization_id=77"
        );
        assert_eq!(
            resolve("/contacts", Datacenter::Default, "77"),
            "https://books.zoho.com/api/v3/contacts?organization_id=77"
        );
    }

    #[test]
    fn malformed_paths_pass_through() {
        assert_eq!(
            resolve_with_base("http://localhost:1/", "contacts//x", "1"),
            "http://localhost:1contacts//x?organization_id=1"
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let first = resolve("/bankaccounts?filter_by=Status.All&", Datacenter::Au, "123");
        let second = resolve("/bankaccounts?filter_by=Status.All&", Datacenter::Au, "123");
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn with_query_skips_empty_values_and_encodes() {
        assert_eq!(with_query("/contacts", &[("email_contains", "")]), "/contacts");
        assert_eq!(
            with_query("/contacts", &[("email_contains", "a@b.com")]),
            "/contacts?email_contains=a%40b.com"
        );
        assert_eq!(
            with_query("/invoices/1/email?send_attachment=true", &[("x", "y")]),
            "/invoices/1/email?send_attachment=true&x=y"
        );
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(ZohoEndpoint::Currencies.path(), "/settings/currencies");
        assert_eq!(
            ZohoEndpoint::InvoiceStatus("5".into(), "sent".into()).to_string(),
            "/invoices/5/status/sent"
        );
        assert_eq!(
            ZohoEndpoint::Custom(vec!["items".into(), "3".into()]).path(),
            "/items/3"
        );
    }
}
