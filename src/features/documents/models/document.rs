use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::platform::schema::DOCUMENT_MODEL;
use crate::modules::platform::Model;

/// Processing state of an uploaded document.
///
/// Documents start in `Processing`; the ingestion pipeline moves them to
/// `Completed` or `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    #[serde(alias = "PROCESSING")]
    Processing,
    #[serde(alias = "COMPLETED")]
    Completed,
    #[serde(alias = "ERROR")]
    Error,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStatus::Processing => write!(f, "processing"),
            DocumentStatus::Completed => write!(f, "completed"),
            DocumentStatus::Error => write!(f, "error"),
        }
    }
}

/// Document record on the managed platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub database_id: String,
    pub filename: String,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default)]
    pub file_type: String,
    /// Object key in the uploads bucket
    pub s3_key: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_error: Option<String>,
    /// Unset until processed
    #[serde(default)]
    pub vector_count: Option<i64>,
    #[serde(default)]
    pub vector_dimensions: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Document {
    const NAME: &'static str = DOCUMENT_MODEL;

    fn id(&self) -> &str {
        &self.id
    }
}
