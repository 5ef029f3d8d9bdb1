// Account endpoints
//
// Registration, login and token verification. Login hands back a bearer
// token; nothing is stored here, the caller owns the token for the
// lifetime of its session.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{MessageResponse, Verification};

/// Username/password pair submitted to `/register` and `/login`.
///
/// The password is a [`SecretString`] so it never shows up in debug
/// output or logs.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Both fields are non-empty. The only validation done client-side.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.expose_secret().is_empty()
    }

    fn body(&self) -> serde_json::Value {
        json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        })
    }
}

/// Successful login: the bearer token plus what the service echoed back.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub token: SecretString,
    /// Canonical username as stored by the service, when it sends one.
    pub username: Option<String>,
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiClient {
    /// Create an account: `POST /register`.
    ///
    /// Returns the service's confirmation message, if any. A taken username
    /// comes back as [`Error::Api`] carrying the server's message.
    pub async fn register(&self, credentials: &Credentials) -> Result<Option<String>, Error> {
        debug!(username = %credentials.username, "registering account");
        let resp: MessageResponse = self.post("register", &credentials.body(), None).await?;
        Ok(resp.message)
    }

    /// Authenticate: `POST /login`.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, Error> {
        debug!(username = %credentials.username, "logging in");
        let resp: LoginResponse = self.post("login", &credentials.body(), None).await?;
        debug!("login successful");
        Ok(LoginGrant {
            token: SecretString::from(resp.token),
            username: resp.username,
            message: resp.message,
        })
    }

    /// Check that a token is still accepted: `GET /verify`.
    pub async fn verify(&self, token: &SecretString) -> Result<Verification, Error> {
        self.get("verify", Some(token)).await
    }
}
