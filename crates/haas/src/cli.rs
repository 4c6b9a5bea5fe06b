//! Clap derive structures for the `haas` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// haas -- provision Home Assistant analytics on Apache Superset
#[derive(Debug, Parser)]
#[command(
    name = "haas",
    version,
    about = "Provision Home Assistant datasets, charts, and dashboards on Superset",
    long_about = "Creates the Home Assistant analytics datasets, charts, and dashboards on an\n\
        Apache Superset server. Runs are idempotent: resources that already exist\n\
        (matched by name) are reused, never duplicated or modified.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Superset profile to use
    #[arg(long, short = 'p', env = "HAAS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Superset URL (overrides profile)
    #[arg(long, env = "HAAS_URL", global = true)]
    pub url: Option<String>,

    /// Superset username (overrides profile)
    #[arg(long, short = 'u', env = "HAAS_USERNAME", global = true)]
    pub username: Option<String>,

    /// Superset password
    #[arg(long, env = "HAAS_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HAAS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "HAAS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "HAAS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one tab-separated line per resource (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create missing datasets, charts, and dashboards on the server
    #[command(alias = "up")]
    Provision(ProvisionArgs),

    /// Show what would be provisioned, in order, without contacting the server
    Plan(PlanArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Resource specification file (TOML); defaults to the built-in catalog
    #[arg(long, short = 's', value_name = "FILE")]
    pub spec: Option<PathBuf>,

    /// Database connection for the built-in catalog (overrides profile)
    #[arg(long, short = 'd', value_name = "NAME")]
    pub database: Option<String>,

    /// Exit non-zero if any resource failed or was skipped
    #[arg(long)]
    pub fail_on_error: bool,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Resource specification file (TOML); defaults to the built-in catalog
    #[arg(long, short = 's', value_name = "FILE")]
    pub spec: Option<PathBuf>,

    /// Database connection for the built-in catalog (overrides profile)
    #[arg(long, short = 'd', value_name = "NAME")]
    pub database: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display current configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (url, username, password_env, database, ca_cert,
        /// insecure, timeout, dataset_spacing, lookup_failure)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the active profile's password in the system keyring
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
