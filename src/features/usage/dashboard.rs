//! Aggregations behind the usage screen

use std::cmp::Reverse;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

use crate::core::error::Result;
use crate::features::databases::dtos::DatabaseListEntry;
use crate::features::usage::dtos::UsageSummaryDto;
use crate::shared::constants::{
    API_KEY_PREVIEW_LEN, RECENT_ACTIVITY_LIMIT, RECENT_QUERY_WINDOW, UNKNOWN_DATABASE_NAME,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageStats {
    pub total_databases: usize,
    pub total_queries: u64,
    /// Events among the last few history entries
    pub recent_queries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseUsageRow {
    pub id: String,
    pub name: String,
    pub queries: u64,
    pub last_used: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub timestamp: String,
    pub database_id: String,
    pub database_name: String,
    /// Key prefix followed by `...`
    pub api_key_preview: String,
}

/// One usage summary joined with the already fetched database list
pub struct UsageDashboard<'a> {
    usage: &'a UsageSummaryDto,
    databases: &'a [DatabaseListEntry],
}

impl<'a> UsageDashboard<'a> {
    pub fn new(usage: &'a UsageSummaryDto, databases: &'a [DatabaseListEntry]) -> Self {
        Self { usage, databases }
    }

    pub fn stats(&self) -> UsageStats {
        let history = &self.usage.history;
        UsageStats {
            total_databases: self.databases.len(),
            total_queries: self.usage.total_queries,
            recent_queries: history.len().min(RECENT_QUERY_WINDOW),
        }
    }

    /// Per-database query counts, busiest first
    pub fn database_rows(&self) -> Vec<DatabaseUsageRow> {
        let mut rows: Vec<DatabaseUsageRow> = self
            .usage
            .databases
            .iter()
            .map(|(id, &queries)| DatabaseUsageRow {
                id: id.clone(),
                name: self.database_name(id).to_string(),
                queries,
                last_used: self
                    .usage
                    .history
                    .iter()
                    .find(|event| &event.database_id == id)
                    .map(|event| event.timestamp.clone()),
            })
            .collect();

        // Ties are ordered by id so the table does not reshuffle between renders
        rows.sort_by(|a, b| {
            Reverse(a.queries)
                .cmp(&Reverse(b.queries))
                .then_with(|| a.id.cmp(&b.id))
        });
        rows
    }

    /// Latest history events, newest first
    pub fn recent_activity(&self) -> Vec<ActivityEntry> {
        self.usage
            .history
            .iter()
            .rev()
            .take(RECENT_ACTIVITY_LIMIT)
            .map(|event| ActivityEntry {
                timestamp: event.timestamp.clone(),
                database_id: event.database_id.clone(),
                database_name: self.database_name(&event.database_id).to_string(),
                api_key_preview: preview_key(&event.api_key),
            })
            .collect()
    }

    /// Downloadable report of the raw summary and database list
    pub fn export_report(&self, now: DateTime<Utc>) -> Result<String> {
        let report = json!({
            "timestamp": now.to_rfc3339_opts(SecondsFormat::Millis, true),
            "usage": self.usage,
            "databases": self.databases,
        });
        Ok(serde_json::to_string_pretty(&report)?)
    }

    fn database_name(&self, id: &str) -> &str {
        self.databases
            .iter()
            .find(|db| db.id == id)
            .map_or(UNKNOWN_DATABASE_NAME, |db| db.name.as_str())
    }
}

/// Suggested filename for [`UsageDashboard::export_report`]
pub fn report_filename(now: DateTime<Utc>) -> String {
    format!("usage-report-{}.json", now.format("%Y-%m-%d"))
}

fn preview_key(key: &str) -> String {
    let prefix: String = key.chars().take(API_KEY_PREVIEW_LEN).collect();
    format!("{}...", prefix)
}
