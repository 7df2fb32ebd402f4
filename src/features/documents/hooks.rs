use std::sync::Arc;

use tokio::sync::watch;

use crate::core::context::RequestContext;
use crate::core::error::Result;
use crate::features::documents::dtos::{CreateDocumentDto, UpdateDocumentDto};
use crate::features::documents::models::Document;
use crate::features::documents::services::DocumentService;
use crate::hooks::{LiveCollectionHook, QueryState};
use crate::shared::types::FileUpload;

type DocumentsKey = (RequestContext, String);

/// Fields of a new document; the database comes from the hook
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub filename: String,
    pub file_size: i64,
    pub file_type: String,
    pub s3_key: String,
}

/// Live documents of one database, with mutations bound to that database.
///
/// A failed mutation is reported in the hook's error state and returned to the
/// caller.
pub struct DocumentsHook {
    live: LiveCollectionHook<DocumentsKey, Document>,
    service: Arc<DocumentService>,
    ctx: RequestContext,
    database_id: String,
}

/// Subscribe to the documents of `database_id`.
///
/// An empty id yields an empty, settled collection without subscribing.
pub fn use_documents(
    service: Arc<DocumentService>,
    ctx: RequestContext,
    database_id: &str,
) -> DocumentsHook {
    let opener_service = Arc::clone(&service);
    let live = LiveCollectionHook::new(move |(ctx, database_id): DocumentsKey| {
        let service = Arc::clone(&opener_service);
        async move { service.observe(&ctx, &database_id)?.subscribe().await }
    });

    let mut hook = DocumentsHook {
        live,
        service,
        ctx,
        database_id: String::new(),
    };
    hook.set_database(database_id);
    hook
}

impl DocumentsHook {
    /// Switch to another database; the previous subscription is closed
    pub fn set_database(&mut self, database_id: &str) {
        self.database_id = database_id.trim().to_string();
        if self.database_id.is_empty() {
            self.live.clear();
        } else {
            self.live
                .mount((self.ctx.clone(), self.database_id.clone()));
        }
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    pub fn state(&self) -> QueryState<Vec<Document>> {
        self.live.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<Vec<Document>>> {
        self.live.subscribe()
    }

    pub fn refresh(&self) {
        self.live.restart_subscription();
    }

    pub async fn create(&self, input: NewDocument) -> Result<Document> {
        let dto = CreateDocumentDto {
            database_id: self.database_id.clone(),
            filename: input.filename,
            file_size: input.file_size,
            file_type: input.file_type,
            s3_key: input.s3_key,
        };
        self.report(self.service.create(&self.ctx, dto).await)
    }

    pub async fn upload(&self, file: FileUpload) -> Result<Document> {
        self.report(
            self.service
                .upload(&self.ctx, &self.database_id, file)
                .await,
        )
    }

    pub async fn update(&self, id: &str, dto: UpdateDocumentDto) -> Result<Document> {
        self.report(self.service.update(&self.ctx, id, dto).await)
    }

    pub async fn delete(&self, id: &str) -> Result<Option<Document>> {
        self.report(self.service.delete(&self.ctx, id).await)
    }

    fn report<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.live.report_error(e.clone());
        }
        result
    }
}
