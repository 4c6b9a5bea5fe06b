// ── Run report ──
//
// Per-resource outcome of one reconciliation run. The report is how
// partial failure reaches the operator; the run itself always completes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::AttachFailure;
use crate::error::ProvisionError;
use crate::model::{RemoteId, ResourceKind};

/// Terminal state of one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Found on the server; nothing was created.
    Reused,
    /// Created during this run.
    Created,
    /// Creation not attempted because a dependency is unresolved.
    Skipped { reason: ProvisionError },
    /// Lookup or creation failed.
    Failed { reason: ProvisionError },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Reused => "reused",
            Self::Created => "created",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }

    /// `true` for Reused and Created.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Reused | Self::Created)
    }

    pub fn reason(&self) -> Option<&ProvisionError> {
        match self {
            Self::Skipped { reason } | Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// A chart that could not be attached, as reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachIssue {
    pub chart: RemoteId,
    pub error: String,
}

impl From<AttachFailure> for AttachIssue {
    fn from(failure: AttachFailure) -> Self {
        Self {
            chart: failure.chart,
            error: failure.error.to_string(),
        }
    }
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub kind: ResourceKind,
    pub natural_key: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub resolved_id: Option<RemoteId>,
    /// Dashboard charts left out because they never resolved.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped_charts: Vec<String>,
    /// Dashboard charts that resolved but failed to attach.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attach_issues: Vec<AttachIssue>,
}

impl ReportEntry {
    pub(crate) fn new(kind: ResourceKind, natural_key: &str, outcome: Outcome) -> Self {
        Self {
            kind,
            natural_key: natural_key.to_owned(),
            outcome,
            resolved_id: None,
            dropped_charts: Vec::new(),
            attach_issues: Vec::new(),
        }
    }

    pub(crate) fn resolved(
        kind: ResourceKind,
        natural_key: &str,
        outcome: Outcome,
        id: RemoteId,
    ) -> Self {
        Self {
            resolved_id: Some(id),
            ..Self::new(kind, natural_key, outcome)
        }
    }
}

/// Outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub reused: usize,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.reused + self.created + self.skipped + self.failed
    }
}

/// Everything one run did, in processing order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entries: Vec<ReportEntry>,
}

impl Report {
    pub fn summary(&self) -> Summary {
        self.entries
            .iter()
            .fold(Summary::default(), |mut acc, entry| {
                match entry.outcome {
                    Outcome::Reused => acc.reused += 1,
                    Outcome::Created => acc.created += 1,
                    Outcome::Skipped { .. } => acc.skipped += 1,
                    Outcome::Failed { .. } => acc.failed += 1,
                }
                acc
            })
    }

    /// `true` if any resource was skipped or failed.
    pub fn is_degraded(&self) -> bool {
        self.entries.iter().any(|e| !e.outcome.is_resolved())
    }

    pub fn entry(&self, kind: ResourceKind, natural_key: &str) -> Option<&ReportEntry> {
        self.entries
            .iter()
            .find(|e| e.kind == kind && e.natural_key == natural_key)
    }

    pub fn resolved_id(&self, kind: ResourceKind, natural_key: &str) -> Option<RemoteId> {
        self.entry(kind, natural_key).and_then(|e| e.resolved_id)
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::ResourceRef;

    #[test]
    fn entry_serializes_flat() {
        let entry = ReportEntry::resolved(
            ResourceKind::Dataset,
            "Temp",
            Outcome::Created,
            RemoteId(101),
        );
        let value = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(
            value,
            json!({
                "kind": "dataset",
                "natural_key": "Temp",
                "outcome": "created",
                "resolved_id": 101,
            })
        );
    }

    #[test]
    fn skipped_entry_carries_reason() {
        let entry = ReportEntry::new(
            ResourceKind::Chart,
            "C1",
            Outcome::Skipped {
                reason: ProvisionError::MissingDependency {
                    dependency: ResourceRef::dataset("Temp"),
                },
            },
        );
        let value = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(value["outcome"], "skipped");
        assert_eq!(value["reason"]["error"], "missing_dependency");
        assert_eq!(value["reason"]["dependency"]["key"], "Temp");
        assert_eq!(value["resolved_id"], serde_json::Value::Null);
    }

    #[test]
    fn summary_counts_outcomes() {
        let report = Report {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            entries: vec![
                ReportEntry::resolved(ResourceKind::Dataset, "A", Outcome::Reused, RemoteId(1)),
                ReportEntry::resolved(ResourceKind::Dataset, "B", Outcome::Created, RemoteId(2)),
                ReportEntry::new(
                    ResourceKind::Dataset,
                    "C",
                    Outcome::Failed {
                        reason: ProvisionError::RemoteUnavailable {
                            message: "connection refused".into(),
                        },
                    },
                ),
            ],
        };

        let summary = report.summary();
        assert_eq!(summary.reused, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);
        assert!(report.is_degraded());
        assert_eq!(report.resolved_id(ResourceKind::Dataset, "B"), Some(RemoteId(2)));
        assert_eq!(report.resolved_id(ResourceKind::Dataset, "C"), None);
    }
}
