// Superset REST client
//
// Wraps `reqwest::Client` with Superset URL construction, bearer/CSRF
// header injection, and error-body decoding. Endpoint groups (datasets,
// charts, dashboards, databases, auth) are implemented as inherent methods
// in separate files to keep this module focused on transport mechanics.

use std::fmt;
use std::sync::{PoisonError, RwLock};

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{ErrorResponse, Filter, ListQuery, ListResponse, ResourceRow};
use crate::transport::TransportConfig;

/// Async client for a single Superset instance.
///
/// Holds the session material (bearer token, CSRF token) acquired by
/// [`login`](Self::login) and nothing else: no resource state is cached,
/// every lookup goes to the server.
pub struct SupersetClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
    access_token: RwLock<Option<SecretString>>,
    /// Sent as `X-CSRFToken` on every mutating request. Bound to the
    /// session cookie, so the client needs a cookie jar in production.
    csrf_token: RwLock<Option<String>>,
}

impl fmt::Debug for SupersetClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupersetClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl SupersetClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// A cookie jar is added if the config doesn't carry one. `base_url` is
    /// the Superset root (e.g. `http://localhost:8088`), optionally with a
    /// path prefix when served behind an ingress proxy.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            timeout_secs: config.timeout_secs(),
            access_token: RwLock::new(None),
            csrf_token: RwLock::new(None),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            timeout_secs: 0,
            access_token: RwLock::new(None),
            csrf_token: RwLock::new(None),
        }
    }

    /// The Superset base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Whether a bearer token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    // ── Session material ─────────────────────────────────────────────

    pub(crate) fn set_access_token(&self, token: SecretString) {
        debug!("storing access token");
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub(crate) fn set_csrf_token(&self, token: String) {
        debug!("storing CSRF token");
        *self
            .csrf_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub(crate) fn clear_session(&self) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        *self
            .csrf_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}api/v1/{path}`
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("api/v1/{path}"))?)
    }

    /// `{base}{path}` for non-API pages such as `/logout/`.
    pub(crate) fn page_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Start a request with the session headers attached.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mutating = method != Method::GET;
        let mut builder = self.http.request(method, url);

        if let Some(token) = self
            .access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            builder = builder.bearer_auth(token.expose_secret());
        }

        if mutating {
            if let Some(csrf) = self
                .csrf_token
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .as_ref()
            {
                builder = builder.header("X-CSRFToken", csrf);
            }
        }

        builder
    }

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");

        let resp = self
            .request(Method::GET, url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    /// Send a POST request with a JSON body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self
            .request(Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    /// Send a POST request whose response body is irrelevant.
    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        debug!("POST {url}");

        let resp = self
            .request(Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(parse_error(status, resp).await)
        }
    }

    /// Look up the id of the first `resource` row whose `column` equals `value`.
    ///
    /// `GET /api/v1/{resource}/?q={"filters":[{"col":column,"opr":"eq","value":value}]}`
    pub(crate) async fn find_by(
        &self,
        resource: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<i64>, Error> {
        let url = self.api_url(&format!("{resource}/"))?;
        let query = ListQuery {
            filters: [Filter {
                col: column,
                opr: "eq",
                value,
            }],
        };
        let q = serde_json::to_string(&query).map_err(|e| Error::Deserialization {
            message: format!("failed to encode list filter: {e}"),
            body: String::new(),
        })?;

        let page: ListResponse<ResourceRow> = self.get(url, &[("q", q)]).await?;
        trace!(resource, column, value, count = page.count, "lookup result");
        Ok(page.result.first().map(|row| row.id))
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(parse_error(status, resp).await);
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    pub(crate) fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// Decode a non-success response into an [`Error`].
pub(crate) async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
    let raw = resp.text().await.unwrap_or_default();

    let message = serde_json::from_str::<ErrorResponse>(&raw)
        .ok()
        .and_then(ErrorResponse::into_message)
        .unwrap_or_else(|| {
            if raw.is_empty() {
                status.to_string()
            } else {
                raw
            }
        });

    if status == StatusCode::UNAUTHORIZED {
        return Error::Authentication { message };
    }

    Error::Api {
        status: status.as_u16(),
        message,
    }
}

/// Ensure the base URL ends with `/` so relative joins keep any prefix path.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = normalize_base_url(Url::parse("http://localhost:8088").expect("url"));
        assert_eq!(url.as_str(), "http://localhost:8088/");

        let prefixed =
            normalize_base_url(Url::parse("http://ha.local/api/hassio_ingress/abc").expect("url"));
        assert_eq!(prefixed.path(), "/api/hassio_ingress/abc/");
    }

    #[test]
    fn api_url_keeps_prefix() {
        let client = SupersetClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://ha.local/superset").expect("url"),
        );
        let url = client.api_url("dataset/").expect("join");
        assert_eq!(url.as_str(), "http://ha.local/superset/api/v1/dataset/");
    }
}
