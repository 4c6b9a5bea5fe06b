//! `haas plan`: show the processing order offline.

use serde::Serialize;
use tabled::Tabled;

use haas_core::{ResourceKind, SpecSet};

use crate::cli::{GlobalOpts, PlanArgs};
use crate::error::CliError;
use crate::output;

/// One resource in the order the reconciler visits it.
#[derive(Debug, Serialize)]
struct PlanStep {
    step: usize,
    kind: ResourceKind,
    name: String,
    depends_on: Vec<String>,
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "#")]
    step: usize,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Depends On")]
    depends_on: String,
}

impl From<&PlanStep> for PlanRow {
    fn from(s: &PlanStep) -> Self {
        Self {
            step: s.step,
            kind: s.kind.to_string(),
            name: s.name.clone(),
            depends_on: s.depends_on.join(", "),
        }
    }
}

fn steps(spec: &SpecSet) -> Vec<PlanStep> {
    spec.processing_order()
        .enumerate()
        .map(|(index, resource)| PlanStep {
            step: index + 1,
            kind: resource.kind(),
            name: resource.natural_key().to_owned(),
            depends_on: resource.depends_on().into_iter().map(|r| r.key).collect(),
        })
        .collect()
}

pub fn handle(args: &PlanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let database = match args.database.clone() {
        Some(name) => name,
        None => {
            let cfg = haas_config::load_config()?;
            let profile_name = haas_config::active_profile_name(global.profile.as_deref(), &cfg);
            haas_config::profile(&cfg, &profile_name)?
                .database
                .clone()
                .unwrap_or_else(|| haas_core::model::spec::DEFAULT_DATABASE.into())
        }
    };
    let spec = super::load_spec(args.spec.as_deref(), &database)?;

    let steps = steps(&spec);
    let out = output::render_list(
        global.output,
        &steps,
        |s| PlanRow::from(s),
        |s| format!("{}\t{}", s.kind, s.name),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
