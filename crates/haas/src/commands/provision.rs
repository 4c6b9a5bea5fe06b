//! `haas provision`: reconcile the Specification Set against Superset.

use tabled::Tabled;
use tracing::debug;

use haas_core::{Report, ReportEntry};

use crate::cli::{GlobalOpts, ProvisionArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Outcome")]
    outcome: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl ReportRow {
    fn new(entry: &ReportEntry, color: bool) -> Self {
        Self {
            kind: entry.kind.to_string(),
            name: entry.natural_key.clone(),
            outcome: output::outcome_label(entry.outcome.label(), color),
            id: entry
                .resolved_id
                .map_or_else(|| "-".into(), |id| id.to_string()),
            notes: notes(entry),
        }
    }
}

fn notes(entry: &ReportEntry) -> String {
    let mut notes = Vec::new();
    if let Some(reason) = entry.outcome.reason() {
        notes.push(reason.to_string());
    }
    if !entry.dropped_charts.is_empty() {
        notes.push(format!("without {}", entry.dropped_charts.join(", ")));
    }
    for issue in &entry.attach_issues {
        notes.push(format!("chart {} not attached: {}", issue.chart, issue.error));
    }
    notes.join("; ")
}

fn plain_line(entry: &ReportEntry) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        entry.kind,
        entry.natural_key,
        entry.outcome.label(),
        entry
            .resolved_id
            .map_or_else(|| "-".into(), |id| id.to_string())
    )
}

fn summary_line(report: &Report) -> String {
    let summary = report.summary();
    format!(
        "{} created, {} reused, {} skipped, {} failed in {}ms",
        summary.created,
        summary.reused,
        summary.skipped,
        summary.failed,
        report.elapsed().num_milliseconds()
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ProvisionArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = haas_config::load_config()?;
    let profile_name = haas_config::active_profile_name(global.profile.as_deref(), &cfg);
    let config = haas_config::resolve_provision_config(
        &cfg,
        &profile_name,
        &super::overrides(global, args.database),
    )?;
    let spec = super::load_spec(args.spec.as_deref(), &config.database)?;

    debug!(profile = %profile_name, url = %config.url, resources = spec.len(), "provisioning");
    let report = haas_core::provision(&config, &spec)
        .await
        .map_err(|e| CliError::from(e).for_profile(&profile_name))?;

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &report,
        |r| {
            let rows: Vec<ReportRow> = r.entries.iter().map(|e| ReportRow::new(e, color)).collect();
            output::render_table(&rows)
        },
        |r| r.entries.iter().map(plain_line).collect::<Vec<_>>().join("\n"),
    );
    output::print_output(&out, global.quiet);

    if !global.quiet {
        eprintln!("{}", summary_line(&report));
    }

    let summary = report.summary();
    if args.fail_on_error && report.is_degraded() {
        return Err(CliError::Partial {
            failed: summary.failed,
            skipped: summary.skipped,
        });
    }
    Ok(())
}
