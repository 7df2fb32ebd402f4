use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};
use validator::Validate;

use crate::core::context::RequestContext;
use crate::core::error::{AppError, Result};
use crate::features::documents::dtos::{CreateDocumentDto, StoredFileDto, UpdateDocumentDto};
use crate::features::documents::models::{Document, DocumentStatus};
use crate::modules::platform::{from_record, to_record, DataPlatform, Filter, LiveQuery, Model};
use crate::modules::storage::{generate_document_key, ObjectStore};
use crate::shared::types::FileUpload;
use crate::shared::validation::require_identifier;

/// Store `file` in the uploads bucket under a freshly generated key
pub async fn store_file(store: &dyn ObjectStore, file: &FileUpload) -> Result<StoredFileDto> {
    if file.filename.trim().is_empty() {
        return Err(AppError::Validation("filename is required".to_string()));
    }

    let key = generate_document_key(&file.filename);
    store
        .put(&key, file.data.clone(), &file.content_type)
        .await?;

    Ok(StoredFileDto {
        url: store.object_url(&key),
        key,
        size: file.size(),
        content_type: file.content_type.clone(),
    })
}

/// Service for Document records and their stored files
pub struct DocumentService {
    platform: Arc<dyn DataPlatform>,
    store: Arc<dyn ObjectStore>,
}

impl DocumentService {
    pub fn new(platform: Arc<dyn DataPlatform>, store: Arc<dyn ObjectStore>) -> Self {
        Self { platform, store }
    }

    /// Register a stored file; the document starts in `processing`
    pub async fn create(&self, ctx: &RequestContext, dto: CreateDocumentDto) -> Result<Document> {
        dto.validate()?;
        require_identifier(&dto.database_id, "databaseId")?;

        let now = Utc::now();
        let mut record = to_record(&dto)?;
        record.insert("status".into(), json!(DocumentStatus::Processing));
        record.insert("createdAt".into(), json!(now));
        record.insert("updatedAt".into(), json!(now));

        let created = self
            .platform
            .create(ctx, Document::NAME, record)
            .await
            .map_err(|e| {
                error!("Failed to create document '{}': {}", dto.filename, e);
                e
            })?;

        let document: Document = from_record(created)?;
        info!(
            "Document created: id={}, database={}, key={}",
            document.id, document.database_id, document.s3_key
        );
        Ok(document)
    }

    /// Upload `file` to storage and register it under `database_id`.
    ///
    /// If the record cannot be created the stored object is removed again.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        database_id: &str,
        file: FileUpload,
    ) -> Result<Document> {
        require_identifier(database_id, "databaseId")?;

        let stored = store_file(self.store.as_ref(), &file).await?;
        let dto = CreateDocumentDto {
            database_id: database_id.to_string(),
            filename: file.filename,
            file_size: stored.size as i64,
            file_type: stored.content_type.clone(),
            s3_key: stored.key.clone(),
        };

        match self.create(ctx, dto).await {
            Ok(document) => Ok(document),
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&stored.key).await {
                    warn!("Failed to remove orphaned upload {}: {}", stored.key, cleanup);
                }
                Err(e)
            }
        }
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        dto: UpdateDocumentDto,
    ) -> Result<Document> {
        require_identifier(id, "document id")?;
        dto.validate()?;

        let mut patch = to_record(&dto)?;
        patch.insert("updatedAt".into(), json!(Utc::now()));

        let updated = self.platform.update(ctx, Document::NAME, id, patch).await?;
        from_record(updated)
    }

    /// Delete a document record and its stored file
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<Option<Document>> {
        require_identifier(id, "document id")?;

        let Some(removed) = self.platform.delete(ctx, Document::NAME, id).await? else {
            return Ok(None);
        };
        let document: Document = from_record(removed)?;

        if let Err(e) = self.store.delete(&document.s3_key).await {
            warn!("Document {} deleted but its file was not: {}", id, e);
        }
        info!("Document deleted: id={}", id);
        Ok(Some(document))
    }

    /// Live query over the documents of one database
    pub fn observe(&self, ctx: &RequestContext, database_id: &str) -> Result<LiveQuery<Document>> {
        require_identifier(database_id, "databaseId")?;
        Ok(LiveQuery::new(
            Arc::clone(&self.platform),
            ctx.clone(),
            Some(Filter::eq("databaseId", database_id)),
        ))
    }
}
