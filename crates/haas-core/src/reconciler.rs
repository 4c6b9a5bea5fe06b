// ── Reconciler ──
//
// Drives every resource of a `SpecSet` to a `RemoteId` using get-or-create
// semantics. Kinds are processed in dependency order, resources within a
// kind in declared order. Failures stay local to the resource: the run
// always drains the whole set and the `Report` carries the damage.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::client::{CreateRequest, ResourceClient};
use crate::config::LookupFailurePolicy;
use crate::error::ProvisionError;
use crate::layout::{self, GRID_COLUMNS};
use crate::model::{
    ChartSpec, DashboardSpec, DatasetSpec, RemoteId, ResourceKind, ResourceRef, ResourceSpec,
};
use crate::rate_limit::RateLimiter;
use crate::report::{AttachIssue, Outcome, Report, ReportEntry};
use crate::spec_set::SpecSet;

/// Identifiers resolved so far in the current run. Each key is written at
/// most once.
#[derive(Debug, Default)]
struct Resolutions {
    ids: HashMap<ResourceKind, HashMap<String, RemoteId>>,
}

impl Resolutions {
    fn get(&self, kind: ResourceKind, key: &str) -> Option<RemoteId> {
        self.ids.get(&kind).and_then(|ids| ids.get(key)).copied()
    }

    fn set(&mut self, kind: ResourceKind, key: &str, id: RemoteId) {
        let ids = self.ids.entry(kind).or_default();
        if let Some(existing) = ids.get(key) {
            warn!(%kind, key, %existing, ignored = %id, "resource already resolved");
            return;
        }
        ids.insert(key.to_owned(), id);
    }
}

/// Result of the existence check for one resource.
enum Lookup {
    Found(RemoteId),
    Absent,
    Failed(ProvisionError),
}

/// Sequential get-or-create driver over a [`ResourceClient`].
#[derive(Debug)]
pub struct Reconciler<C> {
    client: C,
    limiter: RateLimiter,
    lookup_policy: LookupFailurePolicy,
    columns: usize,
}

impl<C: ResourceClient> Reconciler<C> {
    /// Reconciler with the default dataset spacing, `Fail` lookup policy,
    /// and a two-column grid.
    pub fn new(client: C) -> Self {
        Self {
            client,
            limiter: RateLimiter::default(),
            lookup_policy: LookupFailurePolicy::default(),
            columns: GRID_COLUMNS,
        }
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    #[must_use]
    pub fn with_lookup_policy(mut self, policy: LookupFailurePolicy) -> Self {
        self.lookup_policy = policy;
        self
    }

    #[must_use]
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_client(self) -> C {
        self.client
    }

    /// Reconcile `spec` against the remote server.
    ///
    /// Never fails as a whole: every resource ends up with exactly one
    /// report entry, in processing order.
    pub async fn run(&mut self, spec: &SpecSet) -> Report {
        let started_at = Utc::now();
        let mut resolved = Resolutions::default();
        let mut entries = Vec::with_capacity(spec.len());

        info!(
            datasets = spec.count(ResourceKind::Dataset),
            charts = spec.count(ResourceKind::Chart),
            dashboards = spec.count(ResourceKind::Dashboard),
            "reconciliation started"
        );

        for resource in spec.processing_order() {
            let entry = match resource {
                ResourceSpec::Dataset(dataset) => self.dataset(dataset).await,
                ResourceSpec::Chart(chart) => self.chart(chart, &resolved).await,
                ResourceSpec::Dashboard(dashboard) => self.dashboard(dashboard, &resolved).await,
            };

            log_entry(&entry);
            if let Some(id) = entry.resolved_id {
                resolved.set(entry.kind, &entry.natural_key, id);
            }
            entries.push(entry);
        }

        let report = Report {
            started_at,
            finished_at: Utc::now(),
            entries,
        };
        let summary = report.summary();
        info!(
            reused = summary.reused,
            created = summary.created,
            skipped = summary.skipped,
            failed = summary.failed,
            "reconciliation finished"
        );
        report
    }

    async fn dataset(&mut self, dataset: &DatasetSpec) -> ReportEntry {
        let kind = ResourceKind::Dataset;
        match self.lookup(kind, &dataset.name).await {
            Lookup::Found(id) => {
                return ReportEntry::resolved(kind, &dataset.name, Outcome::Reused, id);
            }
            Lookup::Failed(reason) => {
                return ReportEntry::new(kind, &dataset.name, Outcome::Failed { reason });
            }
            Lookup::Absent => {}
        }

        let request = CreateRequest::Dataset {
            name: &dataset.name,
            sql: &dataset.sql,
            database: &dataset.database,
            schema: dataset.schema.as_deref(),
        };
        self.create(&request).await
    }

    async fn chart(&mut self, chart: &ChartSpec, resolved: &Resolutions) -> ReportEntry {
        let kind = ResourceKind::Chart;
        match self.lookup(kind, &chart.name).await {
            Lookup::Found(id) => {
                return ReportEntry::resolved(kind, &chart.name, Outcome::Reused, id);
            }
            Lookup::Failed(reason) => {
                return ReportEntry::new(kind, &chart.name, Outcome::Failed { reason });
            }
            Lookup::Absent => {}
        }

        let Some(dataset) = resolved.get(ResourceKind::Dataset, &chart.dataset) else {
            let reason = ProvisionError::MissingDependency {
                dependency: ResourceRef::dataset(&chart.dataset),
            };
            return ReportEntry::new(kind, &chart.name, Outcome::Skipped { reason });
        };

        let request = CreateRequest::Chart {
            name: &chart.name,
            viz_type: &chart.viz_type,
            params: &chart.params,
            dataset,
        };
        self.create(&request).await
    }

    async fn dashboard(
        &mut self,
        dashboard: &DashboardSpec,
        resolved: &Resolutions,
    ) -> ReportEntry {
        let kind = ResourceKind::Dashboard;
        match self.lookup(kind, &dashboard.title).await {
            Lookup::Found(id) => {
                return ReportEntry::resolved(kind, &dashboard.title, Outcome::Reused, id);
            }
            Lookup::Failed(reason) => {
                return ReportEntry::new(kind, &dashboard.title, Outcome::Failed { reason });
            }
            Lookup::Absent => {}
        }

        let mut chart_ids = Vec::with_capacity(dashboard.charts.len());
        let mut dropped = Vec::new();
        for name in &dashboard.charts {
            match resolved.get(ResourceKind::Chart, name) {
                Some(id) => chart_ids.push(id),
                None => dropped.push(name.clone()),
            }
        }
        if !dropped.is_empty() {
            warn!(
                dashboard = %dashboard.title,
                dropped = ?dropped,
                "creating dashboard without unresolved charts"
            );
        }

        let placements = layout::assign(&chart_ids, self.columns);
        let request = CreateRequest::Dashboard {
            title: &dashboard.title,
            slug: dashboard.slug.as_deref(),
            published: dashboard.published,
            layout: &placements,
        };

        let mut entry = self.create(&request).await;
        entry.dropped_charts = dropped;

        if let (Some(id), false) = (entry.resolved_id, chart_ids.is_empty()) {
            let attach_order: Vec<RemoteId> = placements.iter().map(|p| p.chart).collect();
            let failures = self.client.attach_children(id, &attach_order).await;
            for failure in &failures {
                warn!(
                    dashboard = %dashboard.title,
                    chart = %failure.chart,
                    error = %failure.error,
                    "failed to attach chart"
                );
            }
            entry.attach_issues = failures.into_iter().map(AttachIssue::from).collect();
        }
        entry
    }

    async fn lookup(&self, kind: ResourceKind, key: &str) -> Lookup {
        match self.client.find(kind, key).await {
            Ok(Some(id)) => {
                debug!(%kind, key, %id, "found existing resource");
                Lookup::Found(id)
            }
            Ok(None) => Lookup::Absent,
            Err(err) => match self.lookup_policy {
                LookupFailurePolicy::Fail => Lookup::Failed(ProvisionError::LookupFailed {
                    message: err.to_string(),
                }),
                LookupFailurePolicy::AssumeAbsent => {
                    warn!(%kind, key, error = %err, "lookup failed, treating resource as absent");
                    Lookup::Absent
                }
            },
        }
    }

    async fn create(&mut self, request: &CreateRequest<'_>) -> ReportEntry {
        let kind = request.kind();
        let key = request.natural_key();

        self.limiter.acquire(kind).await;
        debug!(%kind, key, "creating resource");

        match self.client.create(request).await {
            Ok(id) => ReportEntry::resolved(kind, key, Outcome::Created, id),
            Err(err) => ReportEntry::new(
                kind,
                key,
                Outcome::Failed {
                    reason: err.into(),
                },
            ),
        }
    }
}

fn log_entry(entry: &ReportEntry) {
    let kind = entry.kind;
    let key = entry.natural_key.as_str();
    match (&entry.outcome, entry.resolved_id) {
        (Outcome::Reused | Outcome::Created, Some(id)) => {
            info!(%kind, key, %id, outcome = entry.outcome.label(), "resource resolved");
        }
        (outcome, _) => {
            let reason = outcome
                .reason()
                .map_or_else(String::new, ToString::to_string);
            warn!(%kind, key, outcome = outcome.label(), %reason, "resource not resolved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolutions_are_set_once() {
        let mut resolved = Resolutions::default();
        resolved.set(ResourceKind::Dataset, "Temp", RemoteId(1));
        resolved.set(ResourceKind::Dataset, "Temp", RemoteId(2));

        assert_eq!(resolved.get(ResourceKind::Dataset, "Temp"), Some(RemoteId(1)));
        assert_eq!(resolved.get(ResourceKind::Chart, "Temp"), None);
    }
}
