use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::features::documents::models::DocumentStatus;
use crate::shared::validation::validate_not_blank;

/// Input for registering an uploaded file as a Document
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentDto {
    #[validate(custom(function = "validate_not_blank", message = "databaseId is required"))]
    pub database_id: String,

    #[validate(custom(function = "validate_not_blank", message = "filename is required"))]
    pub filename: String,

    #[validate(range(min = 0, message = "fileSize must not be negative"))]
    pub file_size: i64,

    pub file_type: String,

    #[validate(custom(function = "validate_not_blank", message = "s3Key is required"))]
    pub s3_key: String,
}

/// Partial update of a Document record
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentDto {
    #[validate(length(min = 1, message = "filename must not be empty"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_dimensions: Option<i64>,
}

/// Location of a file stored in the uploads bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFileDto {
    pub key: String,
    pub url: String,
    pub size: u64,
    pub content_type: String,
}
