// Database connection lookup

use crate::client::SupersetClient;
use crate::error::Error;

impl SupersetClient {
    /// Find a database connection by its `database_name`.
    pub async fn find_database(&self, name: &str) -> Result<Option<i64>, Error> {
        self.find_by("database", "database_name", name).await
    }
}
