// Dashboard endpoints

use serde_json::json;
use tracing::debug;

use crate::client::SupersetClient;
use crate::error::Error;
use crate::models::{CreatedResponse, NewDashboard};

impl SupersetClient {
    /// Find a dashboard by its `dashboard_title`.
    pub async fn find_dashboard(&self, title: &str) -> Result<Option<i64>, Error> {
        self.find_by("dashboard", "dashboard_title", title).await
    }

    /// Create a dashboard.
    ///
    /// `POST /api/v1/dashboard/`
    pub async fn create_dashboard(&self, dashboard: &NewDashboard<'_>) -> Result<i64, Error> {
        let url = self.api_url("dashboard/")?;
        debug!(title = dashboard.dashboard_title, slug = ?dashboard.slug, "creating dashboard");
        let created: CreatedResponse = self.post(url, dashboard).await?;
        Ok(created.id)
    }

    /// Associate one chart with a dashboard.
    ///
    /// `POST /api/v1/dashboard/{id}/charts` with `{"chart_id": ...}`
    pub async fn add_dashboard_chart(&self, dashboard_id: i64, chart_id: i64) -> Result<(), Error> {
        let url = self.api_url(&format!("dashboard/{dashboard_id}/charts"))?;
        debug!(dashboard_id, chart_id, "attaching chart");
        self.post_no_response(url, &json!({ "chart_id": chart_id }))
            .await
    }
}
