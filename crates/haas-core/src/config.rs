// ── Runtime provisioning configuration ──
//
// Describes *where* to provision and *how* to pace it. Carries credential
// data but never touches disk: `haas-config` builds a `ProvisionConfig`
// from profiles and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use haas_api::transport::{TlsMode, TransportConfig};

use crate::model::ResourceKind;
use crate::model::spec::DEFAULT_DATABASE;
use crate::rate_limit::{DEFAULT_DATASET_SPACING, RateLimiter};

/// What to do when an existence check cannot be completed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LookupFailurePolicy {
    /// Report the resource as failed and do not create it.
    #[default]
    Fail,
    /// Treat the resource as absent and attempt creation. May duplicate
    /// resources when the lookup failure was transient.
    AssumeAbsent,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Everything a provisioning run needs to reach and pace the server.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    /// Superset base URL (e.g., `http://localhost:8088`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request transport timeout.
    pub timeout: Duration,
    /// Database connection that must exist before a run starts.
    pub database: String,
    /// Minimum spacing between dataset creations.
    pub dataset_spacing: Duration,
    pub lookup_failure: LookupFailurePolicy,
}

impl ProvisionConfig {
    /// Rate limiter honouring `dataset_spacing`.
    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::unlimited().with_spacing(ResourceKind::Dataset, self.dataset_spacing)
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            cookie_jar: None,
        }
    }
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:8088").unwrap_or_else(|_| unreachable!()),
            username: "admin".into(),
            password: SecretString::from("admin".to_string()),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            database: DEFAULT_DATABASE.into(),
            dataset_spacing: DEFAULT_DATASET_SPACING,
            lookup_failure: LookupFailurePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn lookup_policy_parses_kebab_case() {
        assert_eq!(
            LookupFailurePolicy::from_str("assume-absent").ok(),
            Some(LookupFailurePolicy::AssumeAbsent)
        );
        assert_eq!(LookupFailurePolicy::Fail.to_string(), "fail");
        assert!(LookupFailurePolicy::from_str("retry").is_err());
    }

    #[test]
    fn rate_limiter_uses_dataset_spacing() {
        let config = ProvisionConfig {
            dataset_spacing: Duration::from_millis(250),
            ..ProvisionConfig::default()
        };
        let limiter = config.rate_limiter();
        assert_eq!(limiter.spacing(ResourceKind::Dataset), Duration::from_millis(250));
        assert_eq!(limiter.spacing(ResourceKind::Chart), Duration::ZERO);
    }
}
