use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response of `GET /api/v1/database/usage/{user_id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSummaryDto {
    #[serde(default)]
    pub total_queries: u64,
    /// database id -> query count
    #[serde(default)]
    pub databases: HashMap<String, u64>,
    /// Oldest first
    #[serde(default)]
    pub history: Vec<UsageEventDto>,
}

/// One tracked query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEventDto {
    pub timestamp: String,
    pub database_id: String,
    pub api_key: String,
}
