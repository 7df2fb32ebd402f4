use std::sync::Arc;
use std::time::Duration;

use crate::core::config::HooksConfig;
use crate::core::context::RequestContext;
use crate::features::databases::dtos::DatabaseListEntry;
use crate::features::databases::models::Database;
use crate::features::databases::services::{DatabaseGateway, DatabaseService};
use crate::hooks::{FetchHook, LiveCollectionHook, PollOptions};

pub type DatabaseListHook = FetchHook<RequestContext, Vec<DatabaseListEntry>>;
pub type LiveDatabasesHook = LiveCollectionHook<RequestContext, Database>;

/// Options for [`use_databases`]
#[derive(Debug, Clone, Copy)]
pub struct UseDatabasesOptions {
    pub poll_interval: Duration,
    /// Polling starts paused; screens resume it while an ingestion is running
    pub paused: bool,
}

impl Default for UseDatabasesOptions {
    fn default() -> Self {
        Self::from_config(&HooksConfig::default())
    }
}

impl UseDatabasesOptions {
    pub fn from_config(config: &HooksConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            paused: true,
        }
    }
}

/// The caller's database list from the gateway, optionally polled
pub fn use_databases(
    gateway: Arc<DatabaseGateway>,
    ctx: RequestContext,
    options: UseDatabasesOptions,
) -> DatabaseListHook {
    let hook = FetchHook::new(
        move |ctx: RequestContext| {
            let gateway = Arc::clone(&gateway);
            async move { gateway.list(&ctx).await }
        },
        PollOptions::every(options.poll_interval).paused(options.paused),
    );
    hook.mount(ctx);
    hook
}

/// Live view of the platform's Database collection
pub fn use_live_databases(service: Arc<DatabaseService>, ctx: RequestContext) -> LiveDatabasesHook {
    let hook = LiveCollectionHook::new(move |ctx: RequestContext| {
        let service = Arc::clone(&service);
        async move { service.observe(&ctx).subscribe().await }
    });
    hook.mount(ctx);
    hook
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::databases::dtos::CreateDatabaseDto;
    use crate::features::databases::models::Sector;
    use crate::shared::test_helpers::{spawn_gateway, test_context, CountingPlatform};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_use_databases_fetches_on_mount_with_polling_paused() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let router = Router::new().route(
            "/api/v1/database/list",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Json(json!([{"id": "db1", "name": "Docs"}])) }
            }),
        );
        let gateway = Arc::new(DatabaseGateway::new(spawn_gateway(router).await));

        let hook = use_databases(gateway, test_context(), UseDatabasesOptions::default());
        let state = hook
            .subscribe()
            .wait_for(|s| s.data.is_some())
            .await
            .unwrap()
            .clone();

        assert_eq!(state.data.unwrap()[0].id, "db1");
        assert!(!hook.is_polling());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_use_live_databases_follows_creates() {
        let platform = Arc::new(CountingPlatform::default());
        let service = Arc::new(DatabaseService::new(platform));
        let ctx = test_context();

        let hook = use_live_databases(Arc::clone(&service), ctx.clone());
        let mut rx = hook.subscribe();
        rx.wait_for(|s| s.data.is_some() && !s.loading).await.unwrap();

        service
            .create(
                &ctx,
                CreateDatabaseDto {
                    name: "Docs".to_string(),
                    description: "Manuals".to_string(),
                    sector: Sector::Technology,
                    embedding_model: None,
                    max_tokens: None,
                    similarity_metric: None,
                },
            )
            .await
            .unwrap();

        let state = rx
            .wait_for(|s| s.data.as_ref().is_some_and(|d| d.len() == 1))
            .await
            .unwrap()
            .clone();
        assert_eq!(state.data.unwrap()[0].sector, Sector::Technology);
    }
}
