//! Command handlers.

pub mod config_cmd;
pub mod plan;
pub mod provision;

use std::path::Path;

use haas_config::Overrides;
use haas_core::{SpecSet, catalog};
use secrecy::SecretString;
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load a spec file, or the built-in catalog. Datasets that don't name a
/// database run against `database`.
pub fn load_spec(path: Option<&Path>, database: &str) -> Result<SpecSet, CliError> {
    let spec = match path {
        Some(path) => {
            debug!(path = %path.display(), database, "loading specification file");
            SpecSet::from_file_on(path, database)?
        }
        None => {
            debug!(database, "using built-in Home Assistant catalog");
            catalog::home_assistant_on(database)?
        }
    };
    Ok(spec)
}

/// Command-line values that override the active profile.
pub fn overrides(global: &GlobalOpts, database: Option<String>) -> Overrides {
    Overrides {
        url: global.url.clone(),
        username: global.username.clone(),
        password: global.password.clone().map(SecretString::from),
        database,
        insecure: global.insecure,
        timeout: global.timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_file_datasets_follow_the_selected_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("spec.toml");
        std::fs::write(&path, "[[datasets]]\nname = \"Temp\"\nsql = \"SELECT 1\"\n")
            .expect("write spec");

        let spec = load_spec(Some(&path), "Recorder").expect("valid spec");
        let dataset = spec.datasets().next().expect("one dataset");
        assert_eq!(dataset.database, "Recorder");
    }
}
