use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::platform::schema::USAGE_MODEL;
use crate::modules::platform::Model;

/// Usage window for one database, written by the gateway's accounting job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub id: String,
    pub database_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_id: Option<String>,
    #[serde(default)]
    pub request_count: u64,
    #[serde(default)]
    pub token_count: u64,
    /// Bytes
    #[serde(default)]
    pub storage_used: f64,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

impl Model for Usage {
    const NAME: &'static str = USAGE_MODEL;

    fn id(&self) -> &str {
        &self.id
    }
}
