use oauth2::{AccessToken, ClientId, ClientSecret, CsrfToken, RefreshToken};
use reqwest::header::HeaderValue;
use serde::Deserialize;
use url::Url;

use crate::{
    endpoints::Datacenter,
    error::{Error, Result},
    scope::Scope,
};

const TOKEN_PATH: &str = "/oauth/v2/token";
const AUTHORIZE_PATH: &str = "/oauth/v2/auth";

/// Stores the OAuth 2 client ID and client secret.
#[derive(Debug, Clone)]
pub struct KeyPair(pub(crate) ClientId, pub(crate) ClientSecret);

impl KeyPair {
    /// Creates a new `KeyPair` from the provided `client_id` and `client_secret` strings.
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self(ClientId::new(client_id), ClientSecret::new(client_secret))
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        self.0.as_str()
    }
}

/// Everything needed to mint new access tokens for a Zoho OAuth client.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub key_pair: KeyPair,
    pub refresh_token: RefreshToken,
    pub redirect_uri: String,
}

impl OAuthCredentials {
    #[must_use]
    pub fn new(key_pair: KeyPair, refresh_token: String, redirect_uri: String) -> Self {
        Self {
            key_pair,
            refresh_token: RefreshToken::new(refresh_token),
            redirect_uri,
        }
    }
}

/// The authentication scheme a client applies to every request.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Legacy static `authtoken`.
    ApiKey(ClientSecret),
    /// OAuth client; the current access token is held by the client.
    OAuth(OAuthCredentials),
}

impl Credentials {
    #[must_use]
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(ClientSecret::new(key.into()))
    }

    #[must_use]
    pub fn is_oauth(&self) -> bool {
        matches!(self, Self::OAuth(_))
    }

    /// Build the `Authorization` header value.
    ///
    /// OAuth clients need a non-empty access token and organization id; legacy
    /// clients need a non-empty key. Violations are reported before any I/O.
    pub fn authorization_header(
        &self,
        access_token: Option<&AccessToken>,
        organization_id: &str,
    ) -> Result<HeaderValue> {
        let value = match self {
            Self::OAuth(_) => {
                let token = access_token
                    .map(AccessToken::secret)
                    .filter(|token| !token.is_empty())
                    .ok_or_else(|| Error::Config("access token is not set".to_string()))?;
                if organization_id.is_empty() {
                    return Err(Error::Config("organization id is not set".to_string()));
                }
                format!("Zoho-oauthtoken {token}")
            }
            Self::ApiKey(key) => {
                if key.secret().is_empty() {
                    return Err(Error::Config("api key is not set".to_string()));
                }
                format!("Zoho-authtoken {}", key.secret())
            }
        };
        let mut header = HeaderValue::from_str(&value)
            .map_err(|_| Error::Config("credential contains invalid header characters".to_string()))?;
        header.set_sensitive(true);
        Ok(header)
    }
}

/// The JSON document returned by the Zoho accounts token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    access_token: Option<AccessToken>,
    #[serde(default)]
    refresh_token: Option<RefreshToken>,
    #[serde(default)]
    pub api_domain: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TokenResponse {
    /// An explicit `error` field wins; otherwise a non-empty access token is required.
    pub fn into_access_token(self) -> Result<AccessToken> {
        self.into_tokens().map(|(access_token, _)| access_token)
    }

    /// Access token plus the refresh token issued by a code exchange.
    pub fn into_tokens(self) -> Result<(AccessToken, Option<RefreshToken>)> {
        if let Some(error) = self.error.filter(|error| !error.is_empty()) {
            return Err(Error::auth(error));
        }
        match self.access_token {
            Some(token) if !token.secret().is_empty() => Ok((token, self.refresh_token)),
            _ => Err(Error::auth("token response did not contain an access token")),
        }
    }
}

/// Token endpoint URL under an accounts server origin.
#[must_use]
pub fn token_url(accounts_base: &str) -> String {
    format!("{}{TOKEN_PATH}", accounts_base.trim_end_matches('/'))
}

#[instrument(skip(http, params))]
async fn request_token(
    http: &reqwest::Client,
    token_url: &str,
    params: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = http
        .post(token_url)
        .query(params)
        .send()
        .await
        .map_err(|e| Error::Auth {
            message: e.to_string(),
            source: Some(Box::new(e)),
        })?;
    let body = response.bytes().await.map_err(|e| Error::Auth {
        message: e.to_string(),
        source: Some(Box::new(e)),
    })?;
    debug!("Token response body size: {} bytes", body.len());

    serde_json::from_slice(&body).map_err(|e| {
        error!(
            "Token endpoint returned an unreadable body ({} bytes): {}",
            body.len(),
            e
        );
        Error::Auth {
            message: format!("unreadable token response ({} bytes)", body.len()),
            source: Some(Box::new(e)),
        }
    })
}

/// Exchange a refresh token for a new access token.
///
/// Performs exactly one call to the token endpoint. The new token is not
/// stored anywhere; see [`crate::Client::refresh_access_token`] for that.
#[instrument(skip(http, credentials), fields(client_id = credentials.key_pair.client_id()))]
pub async fn refresh_access_token(
    http: &reqwest::Client,
    token_url: &str,
    credentials: &OAuthCredentials,
) -> Result<AccessToken> {
    trace!("refreshing access token");
    let response = request_token(
        http,
        token_url,
        &[
            ("refresh_token", credentials.refresh_token.secret()),
            ("client_id", credentials.key_pair.0.as_str()),
            ("client_secret", credentials.key_pair.1.secret()),
            ("redirect_uri", &credentials.redirect_uri),
            ("grant_type", "refresh_token"),
        ],
    )
    .await?;

    response.into_access_token().inspect_err(|e| {
        error!("Access token refresh failed: {}", e);
    })
}

/// Exchange an authorization code from the code flow for access and refresh tokens.
#[instrument(skip(http, key_pair, code))]
pub async fn exchange_code(
    http: &reqwest::Client,
    token_url: &str,
    key_pair: &KeyPair,
    redirect_uri: &str,
    code: &str,
) -> Result<(AccessToken, Option<RefreshToken>)> {
    let response = request_token(
        http,
        token_url,
        &[
            ("code", code),
            ("client_id", key_pair.0.as_str()),
            ("client_secret", key_pair.1.secret()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await?;
    response.into_tokens()
}

/// Generates an authorization URL to use for the code flow authorization method.
///
/// Requests offline access so that the exchange also yields a refresh token.
pub fn authorize_url(
    key_pair: &KeyPair,
    datacenter: Datacenter,
    redirect_uri: &str,
    scopes: impl Into<Scope>,
) -> Result<(Url, CsrfToken)> {
    let mut url = Url::parse(datacenter.accounts_origin())
        .and_then(|base| base.join(AUTHORIZE_PATH))
        .map_err(|_| Error::InvalidEndpoint)?;
    let state = CsrfToken::new_random();
    url.query_pairs_mut()
        .append_pair("scope", &scopes.into().to_string())
        .append_pair("client_id", key_pair.client_id())
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("access_type", "offline")
        .append_pair("state", state.secret());
    Ok((url, state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_yields_access_token() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"access_token":"abc","expires_in":3600}"#).unwrap();
        assert_eq!(response.expires_in, Some(3600));
        assert_eq!(response.into_access_token().unwrap().secret(), "abc");
    }

    #[test]
    fn token_response_error_field_wins() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"error":"invalid_code"}"#).unwrap();
        let error = response.into_access_token().unwrap_err();
        assert_eq!(error.to_string(), "invalid_code");
        assert!(matches!(error, Error::Auth { source: None, .. }));
    }

    #[test]
    fn empty_access_token_is_rejected() {
        let response: TokenResponse = serde_json::from_str(r#"{"access_token":""}"#).unwrap();
        assert!(response.into_access_token().is_err());
    }

    #[test]
    fn oauth_header_requires_token_and_organization() {
        let credentials = Credentials::OAuth(OAuthCredentials::new(
            KeyPair::new("id".into(), "secret".into()),
            "refresh".into(),
            "https://example.com/cb".into(),
        ));
        let token = AccessToken::new("tok".into());
        assert!(matches!(
            credentials.authorization_header(None, "1"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            credentials.authorization_header(Some(&token), ""),
            Err(Error::Config(_))
        ));
        let header = credentials.authorization_header(Some(&token), "1").unwrap();
        assert_eq!(header.to_str().unwrap(), "Zoho-oauthtoken tok");
        assert!(header.is_sensitive());
    }

    #[test]
    fn legacy_header_uses_authtoken() {
        let header = Credentials::api_key("k3y")
            .authorization_header(None, "")
            .unwrap();
        assert_eq!(header.to_str().unwrap(), "Zoho-authtoken k3y");
        assert!(Credentials::api_key("").authorization_header(None, "1").is_err());
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let key_pair = KeyPair::new("client".into(), "very-secret".into());
        let debug = format!("{key_pair:?}");
        assert!(debug.contains("client"));
        assert!(!debug.contains("very-secret"));
    }

    #[test]
    fn authorize_url_targets_datacenter_accounts_server() {
        let key_pair = KeyPair::new("1000.ABC".into(), "s".into());
        let (url, state) = authorize_url(
            &key_pair,
            Datacenter::Eu,
            "https://example.com/callback",
            Scope::full_access(),
        )
        .unwrap();
        assert_eq!(url.host_str(), Some("accounts.zoho.eu"));
        assert_eq!(url.path(), "/oauth/v2/auth");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("scope".into(), "ZohoBooks.fullaccess.all".into())));
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("state".into(), state.secret().clone())));
    }
}
