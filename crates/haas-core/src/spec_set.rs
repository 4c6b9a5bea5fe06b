// ── Specification Set ──
//
// The immutable, validated description of everything one run provisions.
// Built once, read by the reconciler, discarded at exit. Dependency edges
// are checked at construction, so a built set is always a three-tier DAG.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use indexmap::map::Entry;
use serde::Deserialize;

use crate::error::SpecError;
use crate::model::spec::DEFAULT_DATABASE;
use crate::model::{ChartSpec, DashboardSpec, DatasetSpec, ResourceKind, ResourceRef, ResourceSpec};

/// Validated set of datasets, charts, and dashboards keyed by natural key.
///
/// Each kind keeps its declaration order; [`processing_order`](Self::processing_order)
/// yields all datasets, then all charts, then all dashboards.
#[derive(Debug, Clone, Default)]
pub struct SpecSet {
    datasets: IndexMap<String, DatasetSpec>,
    charts: IndexMap<String, ChartSpec>,
    dashboards: IndexMap<String, DashboardSpec>,
}

impl SpecSet {
    pub fn builder() -> SpecSetBuilder {
        SpecSetBuilder::default()
    }

    /// Parse a TOML document with `[[datasets]]`, `[[charts]]` and
    /// `[[dashboards]]` tables.
    pub fn from_toml_str(source: &str) -> Result<Self, SpecError> {
        Self::from_toml_str_on(source, DEFAULT_DATABASE)
    }

    /// Like [`from_toml_str`](Self::from_toml_str), but datasets that don't
    /// name a database run against `database`.
    pub fn from_toml_str_on(source: &str, database: &str) -> Result<Self, SpecError> {
        let file: SpecFile = toml::from_str(source)?;
        let mut builder = Self::builder();
        builder.datasets = file
            .datasets
            .into_iter()
            .map(|entry| entry.into_spec(database))
            .collect();
        builder.charts = file.charts;
        builder.dashboards = file.dashboards;
        builder.build()
    }

    /// Read and parse a TOML specification file.
    pub fn from_file(path: &Path) -> Result<Self, SpecError> {
        Self::from_file_on(path, DEFAULT_DATABASE)
    }

    /// Read a specification file, defaulting dataset databases to `database`.
    pub fn from_file_on(path: &Path, database: &str) -> Result<Self, SpecError> {
        let source = std::fs::read_to_string(path).map_err(|source| SpecError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str_on(&source, database)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn datasets(&self) -> impl Iterator<Item = &DatasetSpec> {
        self.datasets.values()
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.charts.values()
    }

    pub fn dashboards(&self) -> impl Iterator<Item = &DashboardSpec> {
        self.dashboards.values()
    }

    pub fn len(&self) -> usize {
        self.datasets.len() + self.charts.len() + self.dashboards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Dataset => self.datasets.len(),
            ResourceKind::Chart => self.charts.len(),
            ResourceKind::Dashboard => self.dashboards.len(),
        }
    }

    /// Look up a resource by reference.
    pub fn get(&self, resource: &ResourceRef) -> Option<ResourceSpec<'_>> {
        match resource.kind {
            ResourceKind::Dataset => self.datasets.get(&resource.key).map(ResourceSpec::Dataset),
            ResourceKind::Chart => self.charts.get(&resource.key).map(ResourceSpec::Chart),
            ResourceKind::Dashboard => self
                .dashboards
                .get(&resource.key)
                .map(ResourceSpec::Dashboard),
        }
    }

    // ── Graph views ──────────────────────────────────────────────────

    /// Every resource in dependency order: datasets, charts, dashboards,
    /// each in declaration order.
    pub fn processing_order(&self) -> impl Iterator<Item = ResourceSpec<'_>> {
        self.datasets
            .values()
            .map(ResourceSpec::Dataset)
            .chain(self.charts.values().map(ResourceSpec::Chart))
            .chain(self.dashboards.values().map(ResourceSpec::Dashboard))
    }

    /// Explicit edge list as `(dependency, dependent)` pairs.
    pub fn edges(&self) -> Vec<(ResourceRef, ResourceRef)> {
        self.processing_order()
            .flat_map(|node| {
                let dependent = node.to_ref();
                node.depends_on()
                    .into_iter()
                    .map(move |dependency| (dependency, dependent.clone()))
            })
            .collect()
    }

    /// Resources that depend directly on `resource`.
    pub fn dependents(&self, resource: &ResourceRef) -> Vec<ResourceRef> {
        self.edges()
            .into_iter()
            .filter(|(dependency, _)| dependency == resource)
            .map(|(_, dependent)| dependent)
            .collect()
    }
}

// ── Builder ──────────────────────────────────────────────────────────

/// Collects resource declarations and validates them into a [`SpecSet`].
#[derive(Debug, Default)]
pub struct SpecSetBuilder {
    datasets: Vec<DatasetSpec>,
    charts: Vec<ChartSpec>,
    dashboards: Vec<DashboardSpec>,
}

impl SpecSetBuilder {
    #[must_use]
    pub fn dataset(mut self, dataset: DatasetSpec) -> Self {
        self.datasets.push(dataset);
        self
    }

    #[must_use]
    pub fn chart(mut self, chart: ChartSpec) -> Self {
        self.charts.push(chart);
        self
    }

    #[must_use]
    pub fn dashboard(mut self, dashboard: DashboardSpec) -> Self {
        self.dashboards.push(dashboard);
        self
    }

    /// Validate keys and references.
    ///
    /// Rejects empty or duplicate natural keys within a kind, charts naming
    /// an undeclared dataset, and dashboards naming an undeclared (or the
    /// same) chart. A dashboard with no charts is valid.
    pub fn build(self) -> Result<SpecSet, SpecError> {
        let datasets = index_unique(self.datasets, ResourceKind::Dataset, |d| &d.name)?;
        let charts = index_unique(self.charts, ResourceKind::Chart, |c| &c.name)?;
        let dashboards = index_unique(self.dashboards, ResourceKind::Dashboard, |d| &d.title)?;

        for chart in charts.values() {
            if !datasets.contains_key(&chart.dataset) {
                return Err(SpecError::UnknownDataset {
                    chart: chart.name.clone(),
                    dataset: chart.dataset.clone(),
                });
            }
        }

        for dashboard in dashboards.values() {
            let mut seen = HashSet::new();
            for chart in &dashboard.charts {
                if !charts.contains_key(chart) {
                    return Err(SpecError::UnknownChart {
                        dashboard: dashboard.title.clone(),
                        chart: chart.clone(),
                    });
                }
                if !seen.insert(chart.as_str()) {
                    return Err(SpecError::RepeatedChart {
                        dashboard: dashboard.title.clone(),
                        chart: chart.clone(),
                    });
                }
            }
        }

        Ok(SpecSet {
            datasets,
            charts,
            dashboards,
        })
    }
}

fn index_unique<T>(
    items: Vec<T>,
    kind: ResourceKind,
    key: impl Fn(&T) -> &String,
) -> Result<IndexMap<String, T>, SpecError> {
    let mut map = IndexMap::with_capacity(items.len());
    for item in items {
        let k = key(&item).clone();
        if k.trim().is_empty() {
            return Err(SpecError::EmptyKey { kind });
        }
        match map.entry(k) {
            Entry::Occupied(entry) => {
                return Err(SpecError::DuplicateKey {
                    kind,
                    key: entry.key().clone(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(item);
            }
        }
    }
    Ok(map)
}

#[derive(Debug, Deserialize)]
struct SpecFile {
    #[serde(default)]
    datasets: Vec<DatasetEntry>,
    #[serde(default)]
    charts: Vec<ChartSpec>,
    #[serde(default)]
    dashboards: Vec<DashboardSpec>,
}

/// A `[[datasets]]` table; `database` is optional in files.
#[derive(Debug, Deserialize)]
struct DatasetEntry {
    name: String,
    sql: String,
    #[serde(default)]
    database: Option<String>,
    #[serde(default)]
    schema: Option<String>,
}

impl DatasetEntry {
    fn into_spec(self, fallback_database: &str) -> DatasetSpec {
        DatasetSpec {
            name: self.name,
            sql: self.sql,
            database: self.database.unwrap_or_else(|| fallback_database.to_owned()),
            schema: self.schema,
        }
    }
}
