//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use haas_config::ConfigError;
use haas_core::{CoreError, SpecError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    /// The run completed but some resources were skipped or failed.
    pub const PARTIAL: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Superset at {url}")]
    #[diagnostic(
        code(haas::connection_failed),
        help(
            "Check that Superset is running and reachable.\n\
             Set the URL with --url, SUPERSET_URL, or: haas config set url <URL>"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(haas::timeout),
        help("Increase timeout with --timeout or check Superset responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(haas::auth_failed),
        help(
            "Verify the Superset username and password.\n\
             Run: haas config set-password --profile {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    // ── Preconditions ────────────────────────────────────────────────
    #[error("Database connection '{name}' not found on the server")]
    #[diagnostic(
        code(haas::database_not_found),
        help(
            "Create the connection in Superset (Settings > Database Connections)\n\
             or choose another with --database <NAME>."
        )
    )]
    DatabaseNotFound { name: String },

    #[error("Invalid resource specification")]
    #[diagnostic(
        code(haas::spec),
        help("Check the [[datasets]], [[charts]] and [[dashboards]] tables of the --spec file.")
    )]
    Spec(#[source] SpecError),

    // ── Partial run ──────────────────────────────────────────────────
    #[error("{failed} resource(s) failed and {skipped} were skipped")]
    #[diagnostic(
        code(haas::partial),
        help("Fix the reported failures and run again; existing resources are reused.")
    )]
    Partial { failed: usize, skipped: usize },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", http_status(.status.as_ref()))]
    #[diagnostic(code(haas::api_error))]
    ApiError { message: String, status: Option<u16> },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(haas::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(haas::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: haas config set url <URL> --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(haas::config))]
    Config { message: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(haas::keyring),
        help("Store the password with password_env or HAAS_PASSWORD instead.")
    )]
    Keyring { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn http_status(status: Option<&u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::DatabaseNotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::Spec(_) => exit_code::USAGE,
            Self::Partial { .. } => exit_code::PARTIAL,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to authentication failures.
    #[must_use]
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                message,
                profile: name.into(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                message,
                profile: "default".into(),
            },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::DatabaseNotFound { name } => CliError::DatabaseNotFound { name },
            CoreError::Spec(e) => CliError::Spec(e),
            CoreError::Api { message, status } => CliError::ApiError { message, status },
            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

impl From<SpecError> for CliError {
    fn from(err: SpecError) -> Self {
        CliError::Spec(err)
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: "(none)".into(),
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        ConfigError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(
            CliError::Partial {
                failed: 1,
                skipped: 0
            }
            .exit_code(),
            exit_code::PARTIAL
        );
        assert_eq!(
            CliError::from(CoreError::AuthenticationFailed {
                message: "bad".into()
            })
            .exit_code(),
            exit_code::AUTH
        );
        assert_eq!(
            CliError::from(CoreError::DatabaseNotFound {
                name: "Home Assistant".into()
            })
            .exit_code(),
            exit_code::NOT_FOUND
        );
    }

    #[test]
    fn profile_is_attached_to_auth_failures() {
        let err = CliError::from(CoreError::AuthenticationFailed {
            message: "bad".into(),
        })
        .for_profile("lab");
        assert!(matches!(err, CliError::AuthFailed { ref profile, .. } if profile == "lab"));
    }

    #[test]
    fn api_error_message_includes_status() {
        let err = CliError::ApiError {
            message: "boom".into(),
            status: Some(500),
        };
        assert_eq!(err.to_string(), "API error (HTTP 500): boom");
    }
}
