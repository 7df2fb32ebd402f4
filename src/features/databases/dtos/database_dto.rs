use std::fmt;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::databases::models::Sector;
use crate::shared::types::FileUpload;
use crate::shared::validation::validate_not_blank;

// =============================================================================
// PLATFORM
// =============================================================================

/// Input for creating a Database record on the platform
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseDto {
    #[validate(
        custom(function = "validate_not_blank", message = "Name is required"),
        length(max = 255, message = "Name must not exceed 255 characters")
    )]
    pub name: String,

    #[validate(custom(function = "validate_not_blank", message = "Description is required"))]
    pub description: String,

    pub sector: Sector,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_metric: Option<String>,
}

/// Partial update of a Database record; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatabaseDto {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<Sector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_metric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<i64>,
}

// =============================================================================
// GATEWAY
// =============================================================================

/// One row of `GET /api/v1/database/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseListEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<Sector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_file_size: Option<f64>,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Embedding model the gateway uses for ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EmbeddingModel {
    #[default]
    #[serde(rename = "text-embedding-ada-002")]
    OpenAiAda002,
    #[serde(rename = "huggingface")]
    HuggingFace,
}

impl EmbeddingModel {
    pub const ALL: [EmbeddingModel; 2] = [EmbeddingModel::OpenAiAda002, EmbeddingModel::HuggingFace];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingModel::OpenAiAda002 => "text-embedding-ada-002",
            EmbeddingModel::HuggingFace => "huggingface",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EmbeddingModel::OpenAiAda002 => "OpenAI Embeddings",
            EmbeddingModel::HuggingFace => "HuggingFace",
        }
    }
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmbeddingModel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        EmbeddingModel::ALL
            .into_iter()
            .find(|model| model.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::Validation(format!("Unknown embedding model '{}'", s)))
    }
}

/// Tokens per ingestion chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkSize {
    Tokens256,
    #[default]
    Tokens512,
    Tokens1024,
}

impl ChunkSize {
    pub fn tokens(&self) -> u32 {
        match self {
            ChunkSize::Tokens256 => 256,
            ChunkSize::Tokens512 => 512,
            ChunkSize::Tokens1024 => 1024,
        }
    }
}

impl TryFrom<u32> for ChunkSize {
    type Error = AppError;

    fn try_from(tokens: u32) -> Result<Self> {
        match tokens {
            256 => Ok(ChunkSize::Tokens256),
            512 => Ok(ChunkSize::Tokens512),
            1024 => Ok(ChunkSize::Tokens1024),
            other => Err(AppError::Validation(format!(
                "Chunk size must be 256, 512 or 1024 tokens, got {}",
                other
            ))),
        }
    }
}

/// Form submitted to `POST /api/v1/database/create`
#[derive(Debug, Clone, Validate)]
pub struct CreateDatabaseForm {
    #[validate(custom(function = "validate_not_blank", message = "Name is required"))]
    pub name: String,

    #[validate(custom(function = "validate_not_blank", message = "Description is required"))]
    pub description: String,

    pub sector: Sector,
    pub model: EmbeddingModel,
    pub chunk_size: ChunkSize,

    #[validate(length(min = 1, message = "At least one file is required"))]
    pub files: Vec<FileUpload>,
}

impl CreateDatabaseForm {
    /// Multipart body with the owner's id and one `files` part per upload
    pub fn to_multipart(&self, user_id: &str) -> Result<Form> {
        let mut form = Form::new()
            .text("name", self.name.clone())
            .text("description", self.description.clone())
            .text("sector", self.sector.as_str())
            .text("model", self.model.as_str())
            .text("chunk_size", self.chunk_size.tokens().to_string())
            .text("user_id", user_id.to_string());

        for file in &self.files {
            let part = Part::bytes(file.data.clone())
                .file_name(file.filename.clone())
                .mime_str(&file.content_type)
                .map_err(|e| {
                    AppError::Validation(format!(
                        "Invalid content type '{}' for {}: {}",
                        file.content_type, file.filename, e
                    ))
                })?;
            form = form.part("files", part);
        }

        Ok(form)
    }
}

/// Response of `POST /api/v1/database/create`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDatabaseResponseDto {
    pub database_id: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response of `GET /api/v1/database/{id}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseStatusDto {
    pub status: String,
}

/// Response of `DELETE /api/v1/database/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDatabaseResponseDto {
    pub status: String,
}
