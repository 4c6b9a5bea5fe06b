// ── Remote resource capability ──
//
// The narrow interface the reconciler drives. The Superset adapter in
// `superset.rs` is the production implementation; tests use an in-memory
// fake. Implementations hold no resource cache.

use std::future::Future;

use crate::error::RemoteError;
use crate::layout::Placement;
use crate::model::{RemoteId, ResourceKind};

/// Creation payload with every dependency already resolved to a `RemoteId`.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateRequest<'a> {
    Dataset {
        name: &'a str,
        sql: &'a str,
        /// Backing connection, by name.
        database: &'a str,
        schema: Option<&'a str>,
    },
    Chart {
        name: &'a str,
        viz_type: &'a str,
        params: &'a serde_json::Value,
        dataset: RemoteId,
    },
    Dashboard {
        title: &'a str,
        slug: Option<&'a str>,
        published: bool,
        layout: &'a [Placement],
    },
}

impl CreateRequest<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Dataset { .. } => ResourceKind::Dataset,
            Self::Chart { .. } => ResourceKind::Chart,
            Self::Dashboard { .. } => ResourceKind::Dashboard,
        }
    }

    pub fn natural_key(&self) -> &str {
        match self {
            Self::Dataset { name, .. } | Self::Chart { name, .. } => name,
            Self::Dashboard { title, .. } => title,
        }
    }
}

/// One chart that could not be attached to its dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachFailure {
    pub chart: RemoteId,
    pub error: RemoteError,
}

/// Get-or-create capability over a remote analytics server.
pub trait ResourceClient {
    /// Identifier of the resource of `kind` named `natural_key`, if one
    /// exists. Must not have side effects.
    fn find(
        &self,
        kind: ResourceKind,
        natural_key: &str,
    ) -> impl Future<Output = Result<Option<RemoteId>, RemoteError>> + Send;

    /// Create a resource and return its identifier.
    fn create(
        &self,
        request: &CreateRequest<'_>,
    ) -> impl Future<Output = Result<RemoteId, RemoteError>> + Send;

    /// Attach charts to a freshly created dashboard, in order.
    ///
    /// Each attach is independent: a failing chart is reported and the
    /// remaining ones are still attached. Nothing is rolled back.
    fn attach_children(
        &self,
        dashboard: RemoteId,
        children: &[RemoteId],
    ) -> impl Future<Output = Vec<AttachFailure>> + Send;
}
