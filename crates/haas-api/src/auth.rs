// Superset authentication
//
// Database-provider login issuing a JWT bearer token, followed by a CSRF
// token fetch. Mutating endpoints require both; the CSRF token is tied to
// the session cookie the fetch sets.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, warn};

use crate::client::{SupersetClient, parse_error};
use crate::error::Error;
use crate::models::{CsrfResponse, LoginResponse};

impl SupersetClient {
    /// Authenticate with username/password against the `db` provider.
    ///
    /// `POST /api/v1/security/login`, then `GET /api/v1/security/csrf_token/`.
    /// On success the bearer and CSRF tokens are attached to every later request.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.api_url("security/login")?;
        debug!("logging in at {url}");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
            "provider": "db",
            "refresh": true,
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = match parse_error(status, resp).await {
                Error::Authentication { message } | Error::Api { message, .. } => message,
                other => other.to_string(),
            };
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {message}"),
            });
        }

        let tokens: LoginResponse = resp.json().await.map_err(|e| Error::Authentication {
            message: format!("unexpected login response: {e}"),
        })?;
        self.set_access_token(SecretString::from(tokens.access_token));

        self.refresh_csrf_token().await?;

        debug!(username, "login successful");
        Ok(())
    }

    /// Fetch a fresh CSRF token for the current session.
    ///
    /// `GET /api/v1/security/csrf_token/`
    pub async fn refresh_csrf_token(&self) -> Result<(), Error> {
        let url = self.api_url("security/csrf_token/")?;
        let csrf: CsrfResponse = self.get(url, &[]).await?;
        self.set_csrf_token(csrf.result);
        Ok(())
    }

    /// End the current session.
    ///
    /// Superset's JWT tokens cannot be revoked through the API, so this drops
    /// the local tokens and visits `/logout/` to clear the web session cookie.
    /// A failing logout request is logged, not returned.
    pub async fn logout(&self) -> Result<(), Error> {
        let url = self.page_url("logout/")?;
        debug!("logging out at {url}");

        match self.request(Method::GET, url).send().await {
            Ok(resp) if !resp.status().is_success() && !resp.status().is_redirection() => {
                warn!(status = %resp.status(), "logout request was not accepted");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "logout request failed"),
        }

        self.clear_session();
        debug!("logout complete");
        Ok(())
    }
}
