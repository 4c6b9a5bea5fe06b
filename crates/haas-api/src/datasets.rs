// Dataset endpoints
//
// Virtual datasets only: each one is a named SQL query over an existing
// database connection.

use tracing::debug;

use crate::client::SupersetClient;
use crate::error::Error;
use crate::models::{CreatedResponse, NewDataset};

impl SupersetClient {
    /// Find a dataset by its `table_name`.
    pub async fn find_dataset(&self, name: &str) -> Result<Option<i64>, Error> {
        self.find_by("dataset", "table_name", name).await
    }

    /// Create a virtual dataset.
    ///
    /// `POST /api/v1/dataset/`
    pub async fn create_dataset(&self, dataset: &NewDataset<'_>) -> Result<i64, Error> {
        let url = self.api_url("dataset/")?;
        debug!(name = dataset.table_name, database = dataset.database, "creating dataset");
        let created: CreatedResponse = self.post(url, dataset).await?;
        Ok(created.id)
    }
}
