// haas-api: Async Rust client for the Apache Superset REST API

pub mod auth;
pub mod charts;
pub mod client;
pub mod dashboards;
pub mod databases;
pub mod datasets;
pub mod error;
pub mod layout;
pub mod models;
pub mod transport;

pub use client::SupersetClient;
pub use error::Error;
pub use layout::{ChartPosition, position_json};
pub use models::{NewChart, NewDashboard, NewDataset};
pub use transport::{TlsMode, TransportConfig};
