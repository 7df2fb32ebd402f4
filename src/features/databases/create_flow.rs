use std::sync::Arc;

use tracing::info;

use crate::core::context::RequestContext;
use crate::core::error::Result;
use crate::features::databases::dtos::{
    CreateDatabaseForm, CreateDatabaseResponseDto, DatabaseListEntry,
};
use crate::features::databases::hooks::DatabaseListHook;
use crate::features::databases::services::DatabaseGateway;
use crate::shared::constants::DATABASE_STATUS_PROCESSING;

/// List entry shown for a database the gateway has just accepted.
///
/// `document_count` stays unset until the authoritative list reports it.
pub fn optimistic_entry(
    ctx: &RequestContext,
    form: &CreateDatabaseForm,
    response: &CreateDatabaseResponseDto,
) -> DatabaseListEntry {
    DatabaseListEntry {
        id: response.database_id.clone(),
        name: form.name.clone(),
        description: Some(form.description.clone()),
        sector: Some(form.sector),
        file_count: None,
        document_count: None,
        total_file_size: None,
        database_size: None,
        status: Some(
            response
                .status
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DATABASE_STATUS_PROCESSING.to_string()),
        ),
        created_by: Some(ctx.user_id().to_string()),
        created_at: None,
        updated_at: None,
    }
}

/// Append `entry` to `list` unless the list already has that id
pub fn merge_created(list: &mut Vec<DatabaseListEntry>, entry: DatabaseListEntry) {
    if list.iter().any(|existing| existing.id == entry.id) {
        return;
    }
    list.push(entry);
}

/// "Create database" dialog: submit, then show the new entry immediately
pub struct CreateDatabaseFlow {
    gateway: Arc<DatabaseGateway>,
}

impl CreateDatabaseFlow {
    pub fn new(gateway: Arc<DatabaseGateway>) -> Self {
        Self { gateway }
    }

    /// Submit `form` and merge the resulting entry into the rendered list.
    ///
    /// Nothing is merged when validation or the request fails.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        form: &CreateDatabaseForm,
        list: &DatabaseListHook,
    ) -> Result<DatabaseListEntry> {
        let response = self.gateway.create(ctx, form).await?;
        let entry = optimistic_entry(ctx, form, &response);

        list.mutate(|data| merge_created(data.get_or_insert_with(Vec::new), entry.clone()));
        info!("Merged new database {} into the list", entry.id);
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::features::databases::dtos::{ChunkSize, EmbeddingModel};
    use crate::features::databases::hooks::{use_databases, UseDatabasesOptions};
    use crate::features::databases::models::Sector;
    use crate::shared::test_helpers::{spawn_gateway, test_context};
    use crate::shared::types::FileUpload;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    fn docs_form(files: usize) -> CreateDatabaseForm {
        CreateDatabaseForm {
            name: "Docs".to_string(),
            description: "Finance documents".to_string(),
            sector: Sector::Finance,
            model: EmbeddingModel::default(),
            chunk_size: ChunkSize::default(),
            files: (0..files)
                .map(|i| FileUpload::new(format!("file{}.pdf", i), vec![0u8; 16]))
                .collect(),
        }
    }

    fn gateway_router(create_status: StatusCode) -> Router {
        Router::new()
            .route(
                "/api/v1/database/list",
                get(|| async { Json(json!([{"id": "db1", "name": "Existing"}])) }),
            )
            .route(
                "/api/v1/database/create",
                post(move || async move {
                    if create_status.is_success() {
                        Ok(Json(json!({"database_id": "db2"})))
                    } else {
                        Err((create_status, Json(json!({"detail": "Ingestion queue full"}))))
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_created_database_appears_before_refresh() {
        let gateway = Arc::new(DatabaseGateway::new(
            spawn_gateway(gateway_router(StatusCode::OK)).await,
        ));
        let ctx = test_context();
        let list = use_databases(Arc::clone(&gateway), ctx.clone(), UseDatabasesOptions::default());
        list.subscribe().wait_for(|s| s.data.is_some()).await.unwrap();

        let flow = CreateDatabaseFlow::new(gateway);
        let entry = flow.submit(&ctx, &docs_form(2), &list).await.unwrap();

        assert_eq!(entry.status.as_deref(), Some("processing"));
        assert_eq!(entry.sector, Some(Sector::Finance));
        assert!(entry.document_count.is_none());
        assert_eq!(entry.created_by.as_deref(), Some("user123"));

        let data = list.state().data.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].id, "db1");
        assert_eq!(data[1], entry);
    }

    #[tokio::test]
    async fn test_failed_submit_leaves_list_untouched() {
        let gateway = Arc::new(DatabaseGateway::new(
            spawn_gateway(gateway_router(StatusCode::SERVICE_UNAVAILABLE)).await,
        ));
        let ctx = test_context();
        let list = use_databases(Arc::clone(&gateway), ctx.clone(), UseDatabasesOptions::default());
        list.subscribe().wait_for(|s| s.data.is_some()).await.unwrap();

        let flow = CreateDatabaseFlow::new(gateway);
        let err = flow.submit(&ctx, &docs_form(1), &list).await.unwrap_err();
        assert!(matches!(err, AppError::Remote { status: 503, .. }));

        let err = flow.submit(&ctx, &docs_form(0), &list).await.unwrap_err();
        assert!(err.is_local());

        assert_eq!(list.state().data.unwrap().len(), 1);
    }

    #[test]
    fn test_merge_created_skips_known_ids() {
        let ctx = test_context();
        let response = CreateDatabaseResponseDto {
            database_id: "db1".to_string(),
            status: Some(String::new()),
        };
        let entry = optimistic_entry(&ctx, &docs_form(1), &response);
        assert_eq!(entry.status.as_deref(), Some(DATABASE_STATUS_PROCESSING));

        let mut list = vec![entry.clone()];
        merge_created(&mut list, entry);
        assert_eq!(list.len(), 1);
    }
}
