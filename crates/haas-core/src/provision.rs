// ── One-shot provisioning run ──
//
// Session lifecycle around a single reconciliation: connect, check the
// backing database, reconcile, log out.

use tracing::info;

use crate::config::ProvisionConfig;
use crate::error::CoreError;
use crate::reconciler::Reconciler;
use crate::report::Report;
use crate::spec_set::SpecSet;
use crate::superset::SupersetResources;

/// Provision `spec` on the server described by `config`.
///
/// Returns `Err` only if the run could not start. Per-resource failures
/// are in the returned [`Report`].
pub async fn provision(config: &ProvisionConfig, spec: &SpecSet) -> Result<Report, CoreError> {
    let resources = SupersetResources::connect(config).await?;

    match resources.verify_database(&config.database).await {
        Ok(id) => info!(database = %config.database, %id, "using database connection"),
        Err(e) => {
            resources.release().await;
            return Err(e);
        }
    }

    let mut reconciler = Reconciler::new(resources)
        .with_rate_limiter(config.rate_limiter())
        .with_lookup_policy(config.lookup_failure);
    let report = reconciler.run(spec).await;

    reconciler.into_client().release().await;
    Ok(report)
}
