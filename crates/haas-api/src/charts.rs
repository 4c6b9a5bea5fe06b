// Chart ("slice") endpoints

use tracing::debug;

use crate::client::SupersetClient;
use crate::error::Error;
use crate::models::{CreatedResponse, NewChart};

impl SupersetClient {
    /// Find a chart by its `slice_name`.
    pub async fn find_chart(&self, name: &str) -> Result<Option<i64>, Error> {
        self.find_by("chart", "slice_name", name).await
    }

    /// Create a chart bound to a table datasource.
    ///
    /// `POST /api/v1/chart/`
    pub async fn create_chart(&self, chart: &NewChart<'_>) -> Result<i64, Error> {
        let url = self.api_url("chart/")?;
        debug!(
            name = chart.slice_name,
            dataset = chart.datasource_id,
            viz = chart.viz_type,
            "creating chart"
        );
        let created: CreatedResponse = self.post(url, chart).await?;
        Ok(created.id)
    }
}
