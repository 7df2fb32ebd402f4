use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::platform::schema::API_KEY_MODEL;
use crate::modules::platform::Model;

/// API key record on the managed platform (owner-only read and write)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: String,
    pub database_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Opaque secret
    pub key: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Requests per minute
    #[serde(default)]
    pub rate_limit: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

impl Model for ApiKey {
    const NAME: &'static str = API_KEY_MODEL;

    fn id(&self) -> &str {
        &self.id
    }
}
