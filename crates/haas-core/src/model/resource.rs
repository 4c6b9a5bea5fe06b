// ── Resource identity ──
//
// A resource is identified two ways: by its natural key (human name,
// unique within its kind) before it exists, and by the server-assigned
// `RemoteId` once resolved.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// The three tiers of the dependency DAG.
///
/// Variant order is the processing order: every kind only depends on
/// kinds declared before it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    Dataset,
    Chart,
    Dashboard,
}

impl ResourceKind {
    /// Topological order of the kinds.
    pub const PROCESSING_ORDER: [Self; 3] = [Self::Dataset, Self::Chart, Self::Dashboard];
}

/// Server-assigned identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(pub i64);

impl RemoteId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RemoteId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Reference to a resource by kind and natural key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub key: String,
}

impl ResourceRef {
    pub fn new(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    pub fn dataset(key: impl Into<String>) -> Self {
        Self::new(ResourceKind::Dataset, key)
    }

    pub fn chart(key: impl Into<String>) -> Self {
        Self::new(ResourceKind::Chart, key)
    }

    pub fn dashboard(key: impl Into<String>) -> Self {
        Self::new(ResourceKind::Dashboard, key)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.key)
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn processing_order_matches_declaration_order() {
        let iterated: Vec<ResourceKind> = ResourceKind::iter().collect();
        assert_eq!(iterated, ResourceKind::PROCESSING_ORDER);
        assert!(ResourceKind::Dataset < ResourceKind::Chart);
        assert!(ResourceKind::Chart < ResourceKind::Dashboard);
    }

    #[test]
    fn display_forms() {
        assert_eq!(ResourceKind::Dashboard.to_string(), "dashboard");
        assert_eq!(ResourceRef::chart("C1").to_string(), "chart 'C1'");
        assert_eq!(RemoteId(301).to_string(), "301");
    }
}
