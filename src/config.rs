//! Client configuration and construction.

use std::time::Duration;

use oauth2::AccessToken;

use crate::{
    client::Client,
    endpoints::Datacenter,
    error::{Error, Result},
    oauth::{self, Credentials, KeyPair, OAuthCredentials},
};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable settings shared by every request a [`Client`] makes.
#[derive(Debug, Clone)]
pub struct Config {
    pub organization_id: String,
    pub datacenter: Datacenter,
    pub timeout: Duration,
    pub(crate) api_base_url: String,
    pub(crate) accounts_base_url: String,
}

impl Config {
    /// The API origin requests are resolved against.
    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// The OAuth token endpoint for this configuration.
    #[must_use]
    pub fn token_url(&self) -> String {
        oauth::token_url(&self.accounts_base_url)
    }
}

/// Builder for [`Client`].
///
/// ```no_run
/// use zohobooks_rs::{ClientBuilder, Datacenter};
///
/// # fn example() -> zohobooks_rs::error::Result<()> {
/// let client = ClientBuilder::new()
///     .api_key("legacy-authtoken")
///     .organization_id("10234695")
///     .datacenter(Datacenter::In)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone)]
pub struct ClientBuilder {
    credentials: Option<Credentials>,
    access_token: Option<AccessToken>,
    organization_id: Option<String>,
    datacenter: Datacenter,
    timeout: Option<Duration>,
    api_base_url: Option<String>,
    accounts_base_url: Option<String>,
}

impl ClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from `ZOHO_*` environment variables.
    ///
    /// `ZOHO_ORGANIZATION_ID` is required, together with either
    /// `ZOHO_BOOKS_API_KEY` or the OAuth set `ZOHO_CLIENT_ID`,
    /// `ZOHO_CLIENT_SECRET`, `ZOHO_REFRESH_TOKEN` and `ZOHO_REDIRECT_URI`
    /// (`ZOHO_ACCESS_TOKEN` optional). `ZOHO_DATACENTER` and
    /// `ZOHO_TIMEOUT_SECS` are optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ClientBuilder::from_env`] but reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| Error::Config(format!("{key} environment variable not set")))
        };

        let mut builder = Self::new().organization_id(require("ZOHO_ORGANIZATION_ID")?);

        if let Some(datacenter) = lookup("ZOHO_DATACENTER") {
            builder = builder.datacenter(Datacenter::from_code(&datacenter));
        }
        if let Some(timeout) = lookup("ZOHO_TIMEOUT_SECS") {
            let secs = timeout
                .parse::<u64>()
                .map_err(|_| Error::Config(format!("invalid ZOHO_TIMEOUT_SECS: {timeout}")))?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(key) = lookup("ZOHO_BOOKS_API_KEY").filter(|key| !key.is_empty()) {
            return Ok(builder.api_key(key));
        }

        let credentials = OAuthCredentials::new(
            KeyPair::new(require("ZOHO_CLIENT_ID")?, require("ZOHO_CLIENT_SECRET")?),
            require("ZOHO_REFRESH_TOKEN")?,
            require("ZOHO_REDIRECT_URI")?,
        );
        builder = builder.oauth(credentials);
        if let Some(token) = lookup("ZOHO_ACCESS_TOKEN") {
            builder = builder.access_token(token);
        }
        Ok(builder)
    }

    /// Authenticate with a legacy static `authtoken`.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::api_key(key));
        self
    }

    /// Authenticate with an OAuth client.
    #[must_use]
    pub fn oauth(mut self, credentials: OAuthCredentials) -> Self {
        self.credentials = Some(Credentials::OAuth(credentials));
        self
    }

    /// The current OAuth access token, if one is already known.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(AccessToken::new(token.into()));
        self
    }

    #[must_use]
    pub fn organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    #[must_use]
    pub fn datacenter(mut self, datacenter: Datacenter) -> Self {
        self.datacenter = datacenter;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the API origin, e.g. for a proxy or a mock server.
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Override the accounts (OAuth) origin.
    #[must_use]
    pub fn accounts_base_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_base_url = Some(url.into());
        self
    }

    /// Build the client. Fails when no credentials were configured.
    ///
    /// Missing access tokens or organization ids are not rejected here; OAuth
    /// requests made without them fail with [`Error::Config`] before reaching
    /// the network.
    pub fn build(self) -> Result<Client> {
        let credentials = self
            .credentials
            .ok_or_else(|| Error::Config("no api key or oauth credentials configured".to_string()))?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        let config = Config {
            organization_id: self.organization_id.unwrap_or_default(),
            datacenter: self.datacenter,
            timeout,
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| self.datacenter.api_origin().to_string()),
            accounts_base_url: self
                .accounts_base_url
                .unwrap_or_else(|| self.datacenter.accounts_origin().to_string()),
        };

        Ok(Client::new(
            http,
            config,
            credentials,
            self.access_token,
        ))
    }

    /// Complete the authorization code flow and build an OAuth client.
    ///
    /// `key_pair` and `redirect_uri` must match the ones used for
    /// [`oauth::authorize_url`].
    #[instrument(skip(self, key_pair, code))]
    pub async fn from_authorization_code(
        self,
        key_pair: KeyPair,
        redirect_uri: String,
        code: &str,
    ) -> Result<Client> {
        let accounts_base = self
            .accounts_base_url
            .clone()
            .unwrap_or_else(|| self.datacenter.accounts_origin().to_string());
        let http = reqwest::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        let (access_token, refresh_token) = oauth::exchange_code(
            &http,
            &oauth::token_url(&accounts_base),
            &key_pair,
            &redirect_uri,
            code,
        )
        .await?;
        let refresh_token = refresh_token
            .ok_or_else(|| Error::auth("code exchange did not return a refresh token"))?;

        self.oauth(OAuthCredentials {
            key_pair,
            refresh_token,
            redirect_uri,
        })
        .access_token(access_token.secret().clone())
        .build()
    }
}
