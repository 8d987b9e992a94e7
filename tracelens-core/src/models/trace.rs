use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Observation;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub project_id: String,
    pub metadata: Option<serde_json::Value>,
    pub release: Option<String>,
    pub version: Option<String>,
}

/// A trace together with every observation recorded under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceWithObservations {
    #[serde(flatten)]
    pub trace: Trace,
    pub observations: Vec<Observation>,
}
