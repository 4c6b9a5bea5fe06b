// ── Superset adapter ──
//
// Production `ResourceClient`: maps kinds and payloads onto the Superset
// REST API. Owns one authenticated session, from `connect` to `release`.

use tracing::{debug, info};

use haas_api::{NewChart, NewDashboard, NewDataset, SupersetClient};

use crate::client::{AttachFailure, CreateRequest, ResourceClient};
use crate::config::ProvisionConfig;
use crate::error::{CoreError, RemoteError};
use crate::layout::to_chart_positions;
use crate::model::{RemoteId, ResourceKind};

/// Chart datasources are always tables (virtual datasets included).
const DATASOURCE_TYPE: &str = "table";

/// An authenticated Superset session exposed as a [`ResourceClient`].
#[derive(Debug)]
pub struct SupersetResources {
    client: SupersetClient,
}

impl SupersetResources {
    /// Open a session: build the HTTP client and log in.
    pub async fn connect(config: &ProvisionConfig) -> Result<Self, CoreError> {
        let client = SupersetClient::new(config.url.clone(), &config.transport())?;

        info!(url = %config.url, username = %config.username, "connecting to Superset");
        client.login(&config.username, &config.password).await?;
        debug!("session established");

        Ok(Self { client })
    }

    /// Wrap a client that is already authenticated (or needs no auth).
    pub fn from_client(client: SupersetClient) -> Self {
        Self { client }
    }

    pub fn api(&self) -> &SupersetClient {
        &self.client
    }

    /// Check that the backing database connection exists.
    pub async fn verify_database(&self, name: &str) -> Result<RemoteId, CoreError> {
        self.client
            .find_database(name)
            .await?
            .map(RemoteId)
            .ok_or_else(|| CoreError::DatabaseNotFound { name: name.into() })
    }

    /// End the session. Failures are logged by the API layer.
    pub async fn release(self) {
        if let Err(e) = self.client.logout().await {
            debug!(error = %e, "logout failed");
        }
    }

    async fn create_dataset(
        &self,
        name: &str,
        sql: &str,
        database: &str,
        schema: Option<&str>,
    ) -> Result<RemoteId, RemoteError> {
        let Some(database_id) = self.client.find_database(database).await? else {
            return Err(RemoteError::Rejected {
                status: None,
                message: format!("database connection '{database}' not found"),
            });
        };

        let body = NewDataset {
            database: database_id,
            table_name: name,
            sql,
            schema,
        };
        Ok(RemoteId(self.client.create_dataset(&body).await?))
    }
}

impl ResourceClient for SupersetResources {
    async fn find(
        &self,
        kind: ResourceKind,
        natural_key: &str,
    ) -> Result<Option<RemoteId>, RemoteError> {
        let id = match kind {
            ResourceKind::Dataset => self.client.find_dataset(natural_key).await?,
            ResourceKind::Chart => self.client.find_chart(natural_key).await?,
            ResourceKind::Dashboard => self.client.find_dashboard(natural_key).await?,
        };
        Ok(id.map(RemoteId))
    }

    async fn create(&self, request: &CreateRequest<'_>) -> Result<RemoteId, RemoteError> {
        match *request {
            CreateRequest::Dataset {
                name,
                sql,
                database,
                schema,
            } => self.create_dataset(name, sql, database, schema).await,
            CreateRequest::Chart {
                name,
                viz_type,
                params,
                dataset,
            } => {
                let body = NewChart {
                    slice_name: name,
                    datasource_id: dataset.get(),
                    datasource_type: DATASOURCE_TYPE,
                    viz_type,
                    params: params.to_string(),
                };
                Ok(RemoteId(self.client.create_chart(&body).await?))
            }
            CreateRequest::Dashboard {
                title,
                slug,
                published,
                layout,
            } => {
                let position = haas_api::position_json(&to_chart_positions(layout)).to_string();
                let body = NewDashboard {
                    dashboard_title: title,
                    slug,
                    published,
                    position_json: Some(position),
                };
                Ok(RemoteId(self.client.create_dashboard(&body).await?))
            }
        }
    }

    async fn attach_children(
        &self,
        dashboard: RemoteId,
        children: &[RemoteId],
    ) -> Vec<AttachFailure> {
        let mut failures = Vec::new();
        for &chart in children {
            if let Err(e) = self
                .client
                .add_dashboard_chart(dashboard.get(), chart.get())
                .await
            {
                failures.push(AttachFailure {
                    chart,
                    error: e.into(),
                });
            }
        }
        failures
    }
}
