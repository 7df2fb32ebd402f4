use std::sync::Arc;

use tracing::{debug, error};

use crate::core::context::RequestContext;
use crate::core::error::{AppError, Result};
use crate::features::usage::dtos::UsageSummaryDto;
use crate::features::usage::models::Usage;
use crate::modules::gateway::GatewayClient;
use crate::modules::platform::{DataPlatform, Filter, LiveQuery};
use crate::shared::validation::require_identifier;

/// Read-only access to usage accounting.
///
/// The per-user summary comes from the gateway; per-database usage windows are
/// platform records the client never writes.
pub struct UsageService {
    client: Arc<GatewayClient>,
    platform: Arc<dyn DataPlatform>,
}

impl UsageService {
    pub fn new(client: Arc<GatewayClient>, platform: Arc<dyn DataPlatform>) -> Self {
        Self { client, platform }
    }

    pub async fn summary(&self, ctx: &RequestContext) -> Result<UsageSummaryDto> {
        let path = format!("/usage/{}", urlencoding::encode(ctx.user_id()));
        let summary: UsageSummaryDto =
            self.client.get_json(&path, &[]).await.map_err(|e| match e {
                AppError::NotFound(_) => AppError::NotFound("Usage data not found".to_string()),
                other => {
                    error!("Failed to fetch usage for {}: {}", ctx.user_id(), other);
                    other
                }
            })?;

        debug!(
            "Usage for {}: {} queries over {} databases",
            ctx.user_id(),
            summary.total_queries,
            summary.databases.len()
        );
        Ok(summary)
    }

    /// Live query over the caller's usage windows for one database
    pub fn observe(&self, ctx: &RequestContext, database_id: &str) -> Result<LiveQuery<Usage>> {
        require_identifier(database_id, "databaseId")?;
        Ok(LiveQuery::new(
            Arc::clone(&self.platform),
            ctx.clone(),
            Some(Filter::eq("databaseId", database_id)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::RequestContext;
    use crate::modules::platform::schema::USAGE_MODEL;
    use crate::modules::platform::{InMemoryPlatform, Record};
    use crate::shared::test_helpers::{spawn_gateway, test_context, TEST_USER_ID};
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use futures::StreamExt;
    use serde_json::{json, Value};
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_summary_reads_gateway() {
        let router = Router::new().route(
            "/api/v1/database/usage/{user_id}",
            get(|Path(user_id): Path<String>| async move {
                assert_eq!(user_id, TEST_USER_ID);
                Json(json!({
                    "total_queries": 3,
                    "databases": {"db1": 2, "db2": 1},
                    "history": [
                        {"timestamp": "2024-03-01T10:00:00", "database_id": "db1", "api_key": "vdb-a"},
                        {"timestamp": "2024-03-01T11:00:00", "database_id": "db2", "api_key": "vdb-b"},
                        {"timestamp": "2024-03-01T12:00:00", "database_id": "db1", "api_key": "vdb-a"}
                    ]
                }))
            }),
        );
        let service = UsageService::new(
            spawn_gateway(router).await,
            Arc::new(InMemoryPlatform::new()),
        );

        let summary = assert_ok!(service.summary(&test_context()).await);
        assert_eq!(summary.total_queries, 3);
        assert_eq!(summary.databases["db1"], 2);
        assert_eq!(summary.history.len(), 3);
    }

    #[tokio::test]
    async fn test_summary_not_found() {
        let router = Router::new().route(
            "/api/v1/database/usage/{user_id}",
            get(|| async { (StatusCode::NOT_FOUND, "") }),
        );
        let service = UsageService::new(
            spawn_gateway(router).await,
            Arc::new(InMemoryPlatform::new()),
        );

        let err = assert_err!(service.summary(&test_context()).await);
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Usage data not found"));
    }

    #[tokio::test]
    async fn test_observe_is_owner_only() {
        let platform = InMemoryPlatform::new();
        let mut record = Record::new();
        record.insert("databaseId".into(), json!("db1"));
        record.insert("requestCount".into(), json!(5));
        record.insert("periodStart".into(), json!("2024-03-01T00:00:00Z"));
        record.insert("periodEnd".into(), json!("2024-04-01T00:00:00Z"));
        platform
            .ingest(USAGE_MODEL, TEST_USER_ID, record)
            .await
            .unwrap();

        let router = Router::new().route("/", get(|| async { Json(Value::Null) }));
        let service = UsageService::new(spawn_gateway(router).await, Arc::new(platform));

        let mut own = service
            .observe(&test_context(), "db1")
            .unwrap()
            .subscribe()
            .await
            .unwrap();
        let snapshot = own.next().await.unwrap().unwrap();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].request_count, 5);

        let stranger = RequestContext::new("someone-else").unwrap();
        let mut theirs = service
            .observe(&stranger, "db1")
            .unwrap()
            .subscribe()
            .await
            .unwrap();
        assert!(theirs.next().await.unwrap().unwrap().items.is_empty());

        let err = service.observe(&test_context(), " ").err();
        assert!(matches!(err, Some(AppError::Validation(_))));
    }
}
