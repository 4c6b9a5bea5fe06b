// ── Core error types ──
//
// Three layers, from widest to narrowest blast radius:
// - `CoreError`: the run could not start (connection, auth, config, spec).
// - `ProvisionError`: one resource did not resolve. Carried in the report,
//   never propagated.
// - `RemoteError`: a definitive failure from the remote capability,
//   classified from `haas_api::Error`.

use serde::Serialize;
use thiserror::Error;

use crate::model::{ResourceKind, ResourceRef};

/// Run-level error: nothing was reconciled.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to Superset at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Superset request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Precondition errors ──────────────────────────────────────────
    #[error("Database connection '{name}' not found on the server")]
    DatabaseNotFound { name: String },

    #[error("Invalid resource specification: {0}")]
    Spec(#[from] SpecError),

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<haas_api::Error> for CoreError {
    fn from(err: haas_api::Error) -> Self {
        match err {
            haas_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            haas_api::Error::Transport(ref e) => {
                if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            haas_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            haas_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            haas_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            haas_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            haas_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("unexpected response: {message}"),
                status: None,
            },
        }
    }
}

// ── Remote capability failures ───────────────────────────────────────

/// Definitive failure of a single remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The server understood the request and declined it.
    #[error("rejected: {message}")]
    Rejected { status: Option<u16>, message: String },

    /// The server could not be reached or did not answer usefully.
    #[error("unavailable: {message}")]
    Unavailable { message: String },
}

impl From<haas_api::Error> for RemoteError {
    fn from(err: haas_api::Error) -> Self {
        if err.is_rejection() {
            RemoteError::Rejected {
                status: err.status(),
                message: err.to_string(),
            }
        } else {
            RemoteError::Unavailable {
                message: err.to_string(),
            }
        }
    }
}

// ── Per-resource failures ────────────────────────────────────────────

/// Why a single resource ended without a fresh or reused identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ProvisionError {
    /// The existence check could not be completed.
    #[error("lookup failed: {message}")]
    LookupFailed { message: String },

    /// A required dependency never resolved; creation was not attempted.
    #[error("missing dependency {dependency}")]
    MissingDependency { dependency: ResourceRef },

    /// The server declined the create payload.
    #[error("rejected by server: {message}")]
    RemoteRejected { status: Option<u16>, message: String },

    /// Transport-level failure on the create call.
    #[error("server unavailable: {message}")]
    RemoteUnavailable { message: String },
}

impl From<RemoteError> for ProvisionError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Rejected { status, message } => {
                ProvisionError::RemoteRejected { status, message }
            }
            RemoteError::Unavailable { message } => ProvisionError::RemoteUnavailable { message },
        }
    }
}

// ── Specification Set errors ─────────────────────────────────────────

/// The Specification Set is not a valid DAG of uniquely keyed resources.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("{kind} with an empty natural key")]
    EmptyKey { kind: ResourceKind },

    #[error("duplicate {kind} '{key}'")]
    DuplicateKey { kind: ResourceKind, key: String },

    #[error("chart '{chart}' references undeclared dataset '{dataset}'")]
    UnknownDataset { chart: String, dataset: String },

    #[error("dashboard '{dashboard}' references undeclared chart '{chart}'")]
    UnknownChart { dashboard: String, chart: String },

    #[error("dashboard '{dashboard}' lists chart '{chart}' more than once")]
    RepeatedChart { dashboard: String, chart: String },

    #[error("failed to parse specification file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read specification file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
