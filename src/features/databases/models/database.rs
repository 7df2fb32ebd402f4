use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::AppError;
use crate::modules::platform::schema::DATABASE_MODEL;
use crate::modules::platform::Model;

/// Subject area of a vector database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Finance,
    Health,
    Technology,
    Education,
    Articles,
    #[default]
    #[serde(other)]
    Other,
}

impl Sector {
    pub const ALL: [Sector; 6] = [
        Sector::Finance,
        Sector::Health,
        Sector::Technology,
        Sector::Education,
        Sector::Articles,
        Sector::Other,
    ];

    /// Wire value
    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Finance => "finance",
            Sector::Health => "health",
            Sector::Technology => "technology",
            Sector::Education => "education",
            Sector::Articles => "articles",
            Sector::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Sector::Finance => "Finance",
            Sector::Health => "Healthcare",
            Sector::Technology => "Technology",
            Sector::Education => "Education",
            Sector::Articles => "Articles",
            Sector::Other => "Other",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sector {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Sector::ALL
            .into_iter()
            .find(|sector| sector.as_str() == normalized)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Unknown sector '{}', expected one of: finance, health, technology, education, articles, other",
                    s
                ))
            })
    }
}

/// Database record on the managed platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sector: Sector,
    #[serde(default)]
    pub status: String,

    // Configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_metric: Option<String>,

    // Metrics
    #[serde(default)]
    pub document_count: i64,
    /// Size in bytes
    #[serde(default)]
    pub database_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<i64>,

    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Database {
    const NAME: &'static str = DATABASE_MODEL;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_parsing() {
        assert_eq!("finance".parse::<Sector>().unwrap(), Sector::Finance);
        assert_eq!(" Health ".parse::<Sector>().unwrap(), Sector::Health);
        assert!(matches!(
            "astrology".parse::<Sector>(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_sector_deserializes_as_other() {
        let sector: Sector = serde_json::from_str("\"legal\"").unwrap();
        assert_eq!(sector, Sector::Other);
        assert_eq!(serde_json::to_string(&Sector::Health).unwrap(), "\"health\"");
    }

    #[test]
    fn test_database_tolerates_sparse_record() {
        let db: Database = serde_json::from_value(serde_json::json!({
            "id": "db1",
            "name": "Docs",
            "owner": "user123"
        }))
        .unwrap();
        assert_eq!(db.document_count, 0);
        assert_eq!(db.sector, Sector::Other);
        assert!(db.created_at.is_none());
    }
}
