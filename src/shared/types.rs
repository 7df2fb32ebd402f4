use std::path::Path;

use crate::core::error::{AppError, Result};

/// Fallback MIME type for unrecognised extensions
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Extension to MIME type mapping for the document formats the ingestion
/// pipeline accepts
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("json", "application/json"),
    ("html", "text/html"),
    ("htm", "text/html"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("doc", "application/msword"),
];

/// Guess the MIME type from a filename's extension
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return DEFAULT_CONTENT_TYPE,
    };

    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// A file selected for upload, held in memory
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl FileUpload {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        Self {
            content_type: content_type_for(&filename).to_string(),
            filename,
            data,
        }
    }

    /// Read a file from disk
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AppError::Validation(format!("Invalid file path: {}", path.display()))
            })?
            .to_string();

        let data = tokio::fs::read(path).await.map_err(|e| {
            tracing::error!("Failed to read {}: {}", path.display(), e);
            AppError::Validation(format!("Cannot read file {}: {}", path.display(), e))
        })?;

        Ok(Self::new(filename, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("report.PDF"), "application/pdf");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("archive.tar.gz"), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for("README"), DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let path = std::env::temp_dir().join(format!("vdb-upload-{}.md", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, b"# Title").await.unwrap();

        let upload = FileUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.data, b"# Title");
        assert_eq!(upload.content_type, "text/markdown");
        assert_eq!(upload.size(), 7);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let result = FileUpload::from_path("/nonexistent/vdb/file.pdf").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
