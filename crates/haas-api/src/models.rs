// Superset REST request and response shapes
//
// Only the fields the provisioner reads or writes are modelled; everything
// else in Superset's responses is ignored.

use serde::{Deserialize, Serialize};

/// `GET /api/v1/<resource>/` list envelope.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
}

/// Minimal list row: every Superset resource carries an integer `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceRow {
    pub id: i64,
}

/// `POST /api/v1/<resource>/` success body.
#[derive(Debug, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
    #[serde(default)]
    pub result: serde_json::Value,
}

/// `POST /api/v1/security/login` success body.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// `GET /api/v1/security/csrf_token/` body.
#[derive(Debug, Deserialize)]
pub struct CsrfResponse {
    pub result: String,
}

/// Error body. `message` is a string for most failures and an object of
/// field errors for validation failures.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorResponse {
    pub(crate) fn into_message(self) -> Option<String> {
        match self.message {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
            None => self.msg,
        }
    }
}

/// Virtual (SQL-backed) dataset creation body.
#[derive(Debug, Clone, Serialize)]
pub struct NewDataset<'a> {
    /// Database connection id.
    pub database: i64,
    pub table_name: &'a str,
    pub sql: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<&'a str>,
}

/// Chart creation body. `params` is the form-data bag, sent as a JSON string.
#[derive(Debug, Clone, Serialize)]
pub struct NewChart<'a> {
    pub slice_name: &'a str,
    pub datasource_id: i64,
    pub datasource_type: &'static str,
    pub viz_type: &'a str,
    pub params: String,
}

/// Dashboard creation body. `position_json` carries the grid layout tree.
#[derive(Debug, Clone, Serialize)]
pub struct NewDashboard<'a> {
    pub dashboard_title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<&'a str>,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_json: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListQuery<'a> {
    pub filters: [Filter<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct Filter<'a> {
    pub col: &'a str,
    pub opr: &'static str,
    pub value: &'a str,
}
