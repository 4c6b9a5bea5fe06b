// haas-core: Idempotent Superset provisioning engine.
//
// A `SpecSet` declares datasets, charts, and dashboards; the `Reconciler`
// drives each one to a remote id through a `ResourceClient`, reusing what
// already exists and creating the rest.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod provision;
pub mod rate_limit;
pub mod reconciler;
pub mod report;
pub mod spec_set;
pub mod superset;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{AttachFailure, CreateRequest, ResourceClient};
pub use config::{LookupFailurePolicy, ProvisionConfig, TlsVerification};
pub use error::{CoreError, ProvisionError, RemoteError, SpecError};
pub use layout::{Placement, assign};
pub use provision::provision;
pub use rate_limit::RateLimiter;
pub use reconciler::Reconciler;
pub use report::{AttachIssue, Outcome, Report, ReportEntry, Summary};
pub use spec_set::{SpecSet, SpecSetBuilder};
pub use superset::SupersetResources;

pub use model::{
    ChartSpec, DashboardSpec, DatasetSpec, RemoteId, ResourceKind, ResourceRef, ResourceSpec,
};
