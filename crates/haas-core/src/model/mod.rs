// ── Domain model ──
//
// Identity types shared by every layer, plus the declarative shapes a
// Specification Set is built from.

pub mod resource;
pub mod spec;

pub use resource::{RemoteId, ResourceKind, ResourceRef};
pub use spec::{ChartSpec, DashboardSpec, DatasetSpec, ResourceSpec};
