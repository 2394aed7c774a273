// HTTP request gateway
//
// Wraps `reqwest::Client` with base-URL joining, credential header
// injection, and error-body interpretation. All endpoint groups
// (auth, users, recipes, notifications) are implemented as inherent
// methods via separate files under `endpoints/` to keep this module
// focused on transport mechanics.

use std::sync::Arc;

use reqwest::Method;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::credential::CredentialCell;
use crate::error::{Error, parse_error_body};
use crate::transport::TransportConfig;

/// Raw HTTP client for the Umami REST API.
///
/// Attaches the current credential (from the shared [`CredentialCell`])
/// as `Authorization: Token <key>` on every call when present, and omits
/// the header entirely when absent. Non-success responses are folded
/// into the [`Error`] taxonomy before the caller sees them.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credential: Arc<CredentialCell>,
}

impl ApiClient {
    /// Create a client from a base URL (e.g. `https://umami.app/api/`)
    /// and a shared credential cell.
    pub fn new(
        base_url: Url,
        credential: Arc<CredentialCell>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            credential,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (tests).
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        credential: Arc<CredentialCell>,
    ) -> Self {
        Self {
            http,
            base_url,
            credential,
        }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The shared credential cell (the session layer writes it).
    pub fn credential(&self) -> &Arc<CredentialCell> {
        &self.credential
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path relative to the base.
    ///
    /// Paths are given without a leading slash (`auth/login/`), matching
    /// the server's trailing-slash route style.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and deserialize the response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// Send a POST request with a JSON body and deserialize the response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Send a bodyless POST (toggle-style endpoints) and deserialize.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::POST, path, None::<&()>).await
    }

    /// Send a DELETE request and deserialize the response.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(Method::DELETE, path, None::<&()>).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url);

        if let Some(token) = self.credential.current() {
            builder = builder.header("Authorization", format!("Token {}", token.expose_secret()));
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let text = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &text));
        }

        // Empty 2xx bodies (204, logout) deserialize as `null`.
        let body_str = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(body_str).map_err(|e| {
            let preview: String = text.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: text.clone(),
            }
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
