// ── Declarative resource shapes ──
//
// What a Specification Set is made of. Dependencies are named by natural
// key; `SpecSet` validates them when the set is built.

use serde::{Deserialize, Serialize};

use super::resource::{ResourceKind, ResourceRef};

/// Default backing connection for datasets.
pub const DEFAULT_DATABASE: &str = "Home Assistant";

/// A SQL-backed virtual dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Natural key (`table_name` on the server).
    pub name: String,
    pub sql: String,
    /// Name of the database connection the query runs against.
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl DatasetSpec {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
            database: default_database(),
            schema: None,
        }
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }
}

/// A chart over exactly one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    /// Natural key (`slice_name` on the server).
    pub name: String,
    pub viz_type: String,
    /// Visualization parameter bag, passed through untouched.
    #[serde(default = "empty_params")]
    pub params: serde_json::Value,
    /// Natural key of the owning dataset.
    pub dataset: String,
}

impl ChartSpec {
    pub fn new(
        name: impl Into<String>,
        dataset: impl Into<String>,
        viz_type: impl Into<String>,
        params: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            viz_type: viz_type.into(),
            params,
            dataset: dataset.into(),
        }
    }
}

/// A dashboard showing an ordered list of charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSpec {
    /// Natural key (`dashboard_title` on the server).
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Natural keys of the charts, in display order.
    #[serde(default)]
    pub charts: Vec<String>,
    #[serde(default = "default_published")]
    pub published: bool,
}

impl DashboardSpec {
    pub fn new<I, S>(title: impl Into<String>, slug: impl Into<String>, charts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            slug: Some(slug.into()),
            charts: charts.into_iter().map(Into::into).collect(),
            published: true,
        }
    }
}

fn default_database() -> String {
    DEFAULT_DATABASE.into()
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_published() -> bool {
    true
}

/// One node of the dependency DAG, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResourceSpec<'a> {
    Dataset(&'a DatasetSpec),
    Chart(&'a ChartSpec),
    Dashboard(&'a DashboardSpec),
}

impl ResourceSpec<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Dataset(_) => ResourceKind::Dataset,
            Self::Chart(_) => ResourceKind::Chart,
            Self::Dashboard(_) => ResourceKind::Dashboard,
        }
    }

    pub fn natural_key(&self) -> &str {
        match self {
            Self::Dataset(d) => &d.name,
            Self::Chart(c) => &c.name,
            Self::Dashboard(d) => &d.title,
        }
    }

    pub fn to_ref(&self) -> ResourceRef {
        ResourceRef::new(self.kind(), self.natural_key())
    }

    /// Outgoing dependency edges, in declared order.
    pub fn depends_on(&self) -> Vec<ResourceRef> {
        match self {
            Self::Dataset(_) => Vec::new(),
            Self::Chart(c) => vec![ResourceRef::dataset(&c.dataset)],
            Self::Dashboard(d) => d.charts.iter().map(ResourceRef::chart).collect(),
        }
    }
}
