use std::{path::Path, sync::Arc};

use oauth2::AccessToken;
use reqwest::{
    Method,
    header::{self, HeaderMap, HeaderValue},
};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use url::form_urlencoded;

use crate::config::{ClientBuilder, Config};
use crate::endpoints;
use crate::entities::{
    bank_account::{self, BankAccount},
    bank_transaction::{self, BankTransaction, BankTransactionParams},
    contact::{self, Contact, ContactParams},
    currency::{self, Currency},
    invoice::{self, Invoice},
    payment::{self, Payment, PaymentParams},
};
use crate::envelope::{self, Envelope};
use crate::error::{Error, Result};
use crate::oauth::{self, Credentials};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// The form field Zoho Books reads JSON request bodies from.
const JSON_FORM_FIELD: &str = "JSONString";

/// Client for the Zoho Books API.
///
/// Cheap to clone; clones share the HTTP connection pool, the configuration
/// and the current access token. Use [`ClientBuilder`] to create one.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    config: Arc<Config>,
    credentials: Arc<Credentials>,
    access_token: Arc<RwLock<Option<AccessToken>>>,
    refresh_lock: Arc<Mutex<()>>,
}

impl Client {
    pub(crate) fn new(
        http: reqwest::Client,
        config: Config,
        credentials: Credentials,
        access_token: Option<AccessToken>,
    ) -> Self {
        Self {
            http,
            config: Arc::new(config),
            credentials: Arc::new(credentials),
            access_token: Arc::new(RwLock::new(access_token)),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether requests are authenticated with OAuth rather than a legacy key.
    #[must_use]
    pub fn is_oauth(&self) -> bool {
        self.credentials.is_oauth()
    }

    /// A snapshot of the current access token.
    pub async fn access_token(&self) -> Option<AccessToken> {
        self.access_token.read().await.clone()
    }

    /// Replace the access token used by this client and all of its clones.
    pub async fn set_access_token(&self, token: impl Into<String>) {
        trace!("updating access token");
        *self.access_token.write().await = Some(AccessToken::new(token.into()));
    }

    /// Mint a new access token from the refresh token and store it.
    ///
    /// Concurrent refreshes are serialized. If the refresh fails the previously
    /// stored token is kept.
    #[instrument(skip(self))]
    pub async fn refresh_access_token(&self) -> Result<AccessToken> {
        let Credentials::OAuth(credentials) = self.credentials.as_ref() else {
            return Err(Error::Config(
                "token refresh requires oauth credentials".to_string(),
            ));
        };

        let _guard = self.refresh_lock.lock().await;
        let token =
            oauth::refresh_access_token(&self.http, &self.config.token_url(), credentials).await?;
        *self.access_token.write().await = Some(token.clone());
        debug!("access token refreshed");
        Ok(token)
    }

    /// The absolute URL a relative API path resolves to, organization id included.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        endpoints::resolve_with_base(
            &self.config.api_base_url,
            path,
            &self.config.organization_id,
        )
    }

    /// Dispatch one authenticated request and hand back the raw response.
    ///
    /// Credentials are checked first; a missing access token or organization id
    /// fails with [`Error::Config`] without touching the network. A `body` is
    /// only sent for `POST` and `PUT`, wrapped in the `JSONString` form field.
    /// `headers` are applied before the authorization header, which always wins.
    #[instrument(skip(self, body, headers))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&str>,
        mut headers: HeaderMap,
    ) -> Result<reqwest::Response> {
        let authorization = {
            let token = self.access_token.read().await;
            self.credentials
                .authorization_header(token.as_ref(), &self.config.organization_id)?
        };
        let url = self.url(path);
        trace!(%method, %url, "making request");
        headers.remove(header::AUTHORIZATION);

        let mut request = self
            .http
            .request(method.clone(), url.as_str())
            .header(header::ACCEPT, "application/json")
            .headers(headers)
            .header(header::AUTHORIZATION, authorization);

        if let Some(json) = body.filter(|_| method == Method::POST || method == Method::PUT) {
            trace!(json, "request body");
            let form = form_urlencoded::Serializer::new(String::new())
                .append_pair(JSON_FORM_FIELD, json)
                .finish();
            request = request
                .header(header::CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
                .body(form);
        }

        request
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))
    }

    /// Read the whole body of a dispatched response.
    ///
    /// The client timeout spans the body as well, so a server that stalls
    /// after the headers fails with [`Error::Timeout`] too.
    pub async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        let url = response.url().to_string();
        trace!(status = %response.status(), %url, "reading response body");
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(url, e))?;
        Ok(body.to_vec())
    }

    fn transport_error(&self, url: String, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            warn!(%url, timeout = ?self.config.timeout, "request timed out");
            Error::Timeout {
                url,
                timeout: self.config.timeout,
                source: e,
            }
        } else {
            error!("Request to {} failed: {}", url, e);
            Error::Request(e)
        }
    }

    async fn request_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Envelope> {
        let json = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(Error::Serialization)?;
        envelope::decode(
            self,
            self.send(method, path, json.as_deref(), HeaderMap::new())
                .await,
        )
        .await
    }

    /// Perform an authenticated `GET` request and decode the envelope.
    #[instrument(skip(self))]
    pub async fn get(&self, path: &str) -> Result<Envelope> {
        self.request_json::<()>(Method::GET, path, None).await
    }

    /// Perform an authenticated `POST` request with `data` as the JSON body.
    #[instrument(skip(self, data))]
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, data: &B) -> Result<Envelope> {
        self.request_json(Method::POST, path, Some(data)).await
    }

    /// `POST` without a body, for action routes such as status changes.
    #[instrument(skip(self))]
    pub async fn post_empty(&self, path: &str) -> Result<Envelope> {
        self.request_json::<()>(Method::POST, path, None).await
    }

    /// Perform an authenticated `PUT` request with `data` as the JSON body.
    #[instrument(skip(self, data))]
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, data: &B) -> Result<Envelope> {
        self.request_json(Method::PUT, path, Some(data)).await
    }

    /// Perform an authenticated `DELETE` request.
    #[instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<Envelope> {
        self.request_json::<()>(Method::DELETE, path, None).await
    }

    /// Access the contacts API
    #[must_use]
    pub fn contacts(&self) -> ContactsApi<'_> {
        ContactsApi { client: self }
    }

    /// Access the invoices API
    #[must_use]
    pub fn invoices(&self) -> InvoicesApi<'_> {
        InvoicesApi { client: self }
    }

    /// Access the customer payments API
    #[must_use]
    pub fn customer_payments(&self) -> CustomerPaymentsApi<'_> {
        CustomerPaymentsApi { client: self }
    }

    /// Access the bank accounts API
    #[must_use]
    pub fn bank_accounts(&self) -> BankAccountsApi<'_> {
        BankAccountsApi { client: self }
    }

    /// Access the bank transactions API
    #[must_use]
    pub fn bank_transactions(&self) -> BankTransactionsApi<'_> {
        BankTransactionsApi { client: self }
    }

    /// Access the currencies API
    #[must_use]
    pub fn currencies(&self) -> CurrenciesApi<'_> {
        CurrenciesApi { client: self }
    }
}

/// API handler for Contacts endpoints
#[derive(Debug)]
pub struct ContactsApi<'a> {
    client: &'a Client,
}

impl ContactsApi<'_> {
    pub async fn create(&self, params: &ContactParams) -> Result<Contact> {
        contact::create(self.client, params).await
    }

    pub async fn get(&self, contact_id: &str) -> Result<Contact> {
        contact::get(self.client, contact_id).await
    }

    /// List contacts, optionally filtered by e-mail address.
    pub async fn list(&self, options: &contact::FindOptions) -> Result<Vec<Contact>> {
        contact::list(self.client, options).await
    }

    pub async fn list_all(&self) -> Result<Vec<Contact>> {
        self.list(&contact::FindOptions::default()).await
    }

    pub async fn update(&self, contact_id: &str, params: &ContactParams) -> Result<Contact> {
        contact::update(self.client, contact_id, params).await
    }

    pub async fn delete(&self, contact_id: &str) -> Result<()> {
        contact::delete(self.client, contact_id).await
    }
}

/// API handler for Invoices endpoints
#[derive(Debug)]
pub struct InvoicesApi<'a> {
    client: &'a Client,
}

impl InvoicesApi<'_> {
    pub async fn create(&self, params: &invoice::InvoiceParams) -> Result<Invoice> {
        invoice::create(self.client, params).await
    }

    pub async fn get(&self, invoice_id: &str) -> Result<Invoice> {
        invoice::get(self.client, invoice_id).await
    }

    pub async fn update(&self, invoice_id: &str, params: &invoice::InvoiceParams) -> Result<Invoice> {
        invoice::update(self.client, invoice_id, params).await
    }

    pub async fn update_billing_address(
        &self,
        invoice_id: &str,
        address: &invoice::BillingAddressParams,
    ) -> Result<Invoice> {
        invoice::update_billing_address(self.client, invoice_id, address).await
    }

    /// Push to the IRP and return the refreshed invoice.
    pub async fn push_to_irp(&self, invoice_id: &str) -> Result<Invoice> {
        invoice::push_to_irp(self.client, invoice_id).await
    }

    pub async fn email(&self, invoice_id: &str, params: &invoice::InvoiceEmailParams) -> Result<()> {
        invoice::email(self.client, invoice_id, params).await
    }

    pub async fn update_status(
        &self,
        invoice_id: &str,
        status: invoice::StatusTransition,
    ) -> Result<()> {
        invoice::update_status(self.client, invoice_id, status).await
    }

    /// Get the invoice as a PDF
    pub async fn pdf(&self, invoice_id: &str) -> Result<Vec<u8>> {
        invoice::pdf(self.client, invoice_id).await
    }

    pub async fn download_pdf(&self, invoice_id: &str, path: impl AsRef<Path>) -> Result<()> {
        invoice::download_pdf(self.client, invoice_id, path).await
    }
}

/// API handler for Customer Payments endpoints
#[derive(Debug)]
pub struct CustomerPaymentsApi<'a> {
    client: &'a Client,
}

impl CustomerPaymentsApi<'_> {
    pub async fn create(&self, params: &PaymentParams) -> Result<Payment> {
        payment::create(self.client, params).await
    }

    pub async fn get(&self, payment_id: &str) -> Result<Payment> {
        payment::get(self.client, payment_id).await
    }

    pub async fn list(&self, options: &payment::FindOptions) -> Result<Vec<Payment>> {
        payment::list(self.client, options).await
    }

    pub async fn delete(&self, payment_id: &str) -> Result<()> {
        payment::delete(self.client, payment_id).await
    }
}

/// API handler for Bank Accounts endpoints
#[derive(Debug)]
pub struct BankAccountsApi<'a> {
    client: &'a Client,
}

impl BankAccountsApi<'_> {
    pub async fn list(&self, options: &bank_account::FindOptions) -> Result<Vec<BankAccount>> {
        bank_account::list(self.client, options).await
    }
}

/// API handler for Bank Transactions endpoints
#[derive(Debug)]
pub struct BankTransactionsApi<'a> {
    client: &'a Client,
}

impl BankTransactionsApi<'_> {
    pub async fn create(&self, params: &BankTransactionParams) -> Result<BankTransaction> {
        bank_transaction::create(self.client, params).await
    }
}

/// API handler for Currencies endpoints
#[derive(Debug)]
pub struct CurrenciesApi<'a> {
    client: &'a Client,
}

impl CurrenciesApi<'_> {
    pub async fn list(&self) -> Result<Vec<Currency>> {
        currency::list(self.client).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(organization_id: &str) -> Client {
        ClientBuilder::new()
            .api_key("k")
            .organization_id(organization_id)
            .api_base_url("http://localhost:9/api/v3/")
            .build()
            .unwrap()
    }

    #[test]
    fn url_appends_organization_id() {
        let client = client("a b");
        assert_eq!(
            client.url("/contacts?email_contains=x"),
            "http://localhost:9/api/v3/contacts?email_contains=x&organization_id=a+b"
        );
    }

    #[tokio::test]
    async fn set_access_token_is_shared_between_clones() {
        let client = client("1");
        let clone = client.clone();
        assert!(clone.access_token().await.is_none());
        client.set_access_token("fresh").await;
        assert_eq!(clone.access_token().await.unwrap().secret(), "fresh");
    }

    #[tokio::test]
    async fn refresh_requires_oauth() {
        let error = client("1").refresh_access_token().await.unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }
}
