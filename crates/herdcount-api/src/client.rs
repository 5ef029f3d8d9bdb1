// Counting service HTTP client
//
// Wraps `reqwest::Client` with base-URL handling, bearer authentication
// and `{ "message": ... }` error unwrapping. Endpoint groups (auth, counts,
// devices) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use std::time::Duration;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::Ping;

/// Error body shape used by every endpoint of the service.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Async client for the counting service.
///
/// The base URL points at the API root (e.g. `http://localhost:5000/api`);
/// endpoint paths are joined relative to it. Authenticated endpoints take
/// the bearer token explicitly: the client itself is stateless, the session
/// owns the token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client from a base URL and transport settings.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout: transport.timeout,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            timeout: TransportConfig::default().timeout,
        })
    }

    /// The API root this client talks to (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ensure the path ends with a slash so relative joins stay under it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    fn request(
        &self,
        method: Method,
        url: Url,
        token: Option<&SecretString>,
    ) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self
            .request(Method::GET, url, token)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self
            .request(Method::POST, url, token)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    /// POST without a request body (e.g. heartbeats).
    pub(crate) async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self
            .request(Method::POST, url, token)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self
            .request(Method::DELETE, url, token)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    /// Service liveness probe: `GET /test`. Needs no token.
    pub async fn ping(&self) -> Result<Ping, Error> {
        self.get("test", None).await
    }

    // ── Response handling ────────────────────────────────────────────

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await.map_err(|e| self.transport_error(e))?;
            trace!(%status, bytes = body.len(), "response body received");
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body: body.clone(),
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    /// Turn a non-2xx response into [`Error::Api`], keeping the server's
    /// `message` verbatim when the body carries one.
    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let fallback = || {
            status
                .canonical_reason()
                .map_or_else(|| status.to_string(), str::to_owned)
        };

        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(err) => err.message.unwrap_or_else(fallback),
            Err(_) if raw.trim().is_empty() => fallback(),
            Err(_) => raw,
        };

        debug!(status = status.as_u16(), %message, "request rejected");
        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ApiClient;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = ApiClient::with_client(reqwest::Client::new(), "http://localhost:5000/api")
            .expect("valid URL");
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/api/");
    }

    #[test]
    fn paths_join_under_api_root() {
        let client = ApiClient::with_client(reqwest::Client::new(), "http://localhost:5000/api/")
            .expect("valid URL");
        let url = client.url("/counts/stats").expect("joined URL");
        assert_eq!(url.as_str(), "http://localhost:5000/api/counts/stats");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(ApiClient::with_client(reqwest::Client::new(), "not a url").is_err());
    }
}
