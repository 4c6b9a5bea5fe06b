//! Configuration for the haas CLI.
//!
//! TOML profiles, credential resolution (flag, env, keyring, plaintext),
//! and translation to `haas_core::ProvisionConfig`. Core never reads
//! files or the environment; it receives a finished `ProvisionConfig`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use haas_core::rate_limit::DEFAULT_DATASET_SPACING;
use haas_core::{LookupFailurePolicy, ProvisionConfig, TlsVerification};

/// Keyring service name; entries are `<profile>/password`.
pub const KEYRING_SERVICE: &str = "haas";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "HAAS_CONFIG";

const DEFAULT_URL: &str = "http://localhost:8088";
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' is not defined")]
    UnknownProfile { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named Superset profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named Superset profile. Every field is optional; gaps are filled from
/// `SUPERSET_*` variables and then from the local development defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Superset base URL (e.g., "http://localhost:8088").
    pub url: Option<String>,

    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or `password_env`).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Database connection datasets run against.
    pub database: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Spacing between dataset creations, e.g. "500ms" or "1s".
    pub dataset_spacing: Option<String>,

    /// `fail` or `assume-absent`.
    pub lookup_failure: Option<LookupFailurePolicy>,
}

/// Values given on the command line. They win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub database: Option<String>,
    pub insecure: bool,
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `HAAS_CONFIG`, then platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }

    ProjectDirs::from("com", "haas", "haas").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("haas");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layered the same way as [`load_config`].
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HAAS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

/// Active profile name: flag, then `default_profile`, then "default".
pub fn active_profile_name(flag: Option<&str>, config: &Config) -> String {
    flag.map(ToOwned::to_owned)
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Look up a profile. An undefined "default" profile is an empty one, so
/// the tool runs against a local Superset without any config file.
pub fn profile<'a>(config: &'a Config, name: &str) -> Result<Cow<'a, Profile>, ConfigError> {
    match config.profiles.get(name) {
        Some(profile) => Ok(Cow::Borrowed(profile)),
        None if name == "default" => Ok(Cow::Owned(Profile::default())),
        None => Err(ConfigError::UnknownProfile {
            profile: name.into(),
        }),
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the password.
///
/// Chain: flag, the profile's `password_env` variable, `HAAS_PASSWORD`,
/// the OS keyring, plaintext in the profile, `SUPERSET_PASSWORD`, and
/// finally the Superset development default.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    flag: Option<&SecretString>,
) -> SecretString {
    resolve_password_with(profile, profile_name, flag, &env_var, read_keyring)
}

fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    flag: Option<&SecretString>,
    env: &dyn Fn(&str) -> Option<String>,
    keyring: fn(&str) -> Option<String>,
) -> SecretString {
    if let Some(pw) = flag {
        debug!("password from command line");
        return pw.clone();
    }

    if let Some(pw) = profile.password_env.as_deref().and_then(env) {
        debug!("password from profile password_env");
        return SecretString::from(pw);
    }

    if let Some(pw) = env("HAAS_PASSWORD") {
        debug!("password from HAAS_PASSWORD");
        return SecretString::from(pw);
    }

    if let Some(pw) = keyring(profile_name) {
        debug!(profile = profile_name, "password from keyring");
        return SecretString::from(pw);
    }

    if let Some(ref pw) = profile.password {
        debug!("password from config file");
        return SecretString::from(pw.clone());
    }

    if let Some(pw) = env("SUPERSET_PASSWORD") {
        debug!("password from SUPERSET_PASSWORD");
        return SecretString::from(pw);
    }

    SecretString::from(DEFAULT_PASSWORD.to_owned())
}

/// Store a profile's password in the OS keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(password)?;
    Ok(())
}

fn read_keyring(profile_name: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
        .ok()?
        .get_password()
        .ok()
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ── Translation to core config ──────────────────────────────────────

/// Build a `ProvisionConfig` from a profile, its defaults, and CLI overrides.
///
/// This is the single boundary where config types cross into core types.
pub fn resolve_provision_config(
    config: &Config,
    profile_name: &str,
    overrides: &Overrides,
) -> Result<ProvisionConfig, ConfigError> {
    let profile = profile(config, profile_name)?;
    resolve_with(
        &profile,
        profile_name,
        &config.defaults,
        overrides,
        &env_var,
        read_keyring,
    )
}

fn resolve_with(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    overrides: &Overrides,
    env: &dyn Fn(&str) -> Option<String>,
    keyring: fn(&str) -> Option<String>,
) -> Result<ProvisionConfig, ConfigError> {
    // 1. URL (flag > profile > SUPERSET_URL > localhost)
    let url_str = overrides
        .url
        .clone()
        .or_else(|| profile.url.clone())
        .or_else(|| env("SUPERSET_URL"))
        .unwrap_or_else(|| DEFAULT_URL.into());
    let url: url::Url = url_str.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. Credentials
    let username = overrides
        .username
        .clone()
        .or_else(|| profile.username.clone())
        .or_else(|| env("SUPERSET_USER"))
        .unwrap_or_else(|| DEFAULT_USERNAME.into());
    let password =
        resolve_password_with(profile, profile_name, overrides.password.as_ref(), env, keyring);

    // 3. TLS verification
    let tls = if overrides.insecure || profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    // 4. Pacing
    let timeout = Duration::from_secs(
        overrides
            .timeout
            .or(profile.timeout)
            .unwrap_or(defaults.timeout),
    );
    let dataset_spacing = match profile.dataset_spacing.as_deref() {
        Some(raw) => humantime::parse_duration(raw).map_err(|e| ConfigError::Validation {
            field: "dataset_spacing".into(),
            reason: format!("'{raw}': {e}"),
        })?,
        None => DEFAULT_DATASET_SPACING,
    };

    let database = overrides
        .database
        .clone()
        .or_else(|| profile.database.clone())
        .unwrap_or_else(|| haas_core::model::spec::DEFAULT_DATABASE.into());

    Ok(ProvisionConfig {
        url,
        username,
        password,
        tls,
        timeout,
        database,
        dataset_spacing,
        lookup_failure: profile.lookup_failure.unwrap_or_default(),
    })
}
