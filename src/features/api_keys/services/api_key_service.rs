use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::core::context::RequestContext;
use crate::core::error::Result;
use crate::features::api_keys::dtos::{mask_key, CreateApiKeyDto};
use crate::features::api_keys::models::ApiKey;
use crate::modules::platform::{from_record, DataPlatform, Filter, LiveQuery, Model, Record};
use crate::shared::constants::{
    API_KEY_STATUS_ACTIVE, DEFAULT_API_KEY_EXPIRY_DAYS, DEFAULT_API_KEY_PERMISSION,
    DEFAULT_API_KEY_RATE_LIMIT,
};
use crate::shared::validation::require_identifier;

/// Fresh opaque key: `vdb-` followed by 64 random hex characters
pub fn generate_key() -> String {
    format!(
        "vdb-{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

/// Service for API key records on the managed platform
pub struct ApiKeyService {
    platform: Arc<dyn DataPlatform>,
}

impl ApiKeyService {
    pub fn new(platform: Arc<dyn DataPlatform>) -> Self {
        Self { platform }
    }

    /// Issue a key for a database the caller owns
    pub async fn create(&self, ctx: &RequestContext, dto: CreateApiKeyDto) -> Result<ApiKey> {
        dto.validate()?;
        require_identifier(&dto.database_id, "databaseId")?;

        let now = Utc::now();
        let expires_in_days = dto.expires_in_days.unwrap_or(DEFAULT_API_KEY_EXPIRY_DAYS);
        let permissions = dto
            .permissions
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_API_KEY_PERMISSION.to_string()]);

        let mut record = Record::new();
        record.insert("databaseId".into(), json!(dto.database_id));
        if let Some(name) = &dto.name {
            record.insert("name".into(), json!(name));
        }
        record.insert("key".into(), json!(generate_key()));
        record.insert("permissions".into(), json!(permissions));
        record.insert(
            "rateLimit".into(),
            json!(dto.rate_limit.unwrap_or(DEFAULT_API_KEY_RATE_LIMIT)),
        );
        record.insert("status".into(), json!(API_KEY_STATUS_ACTIVE));
        record.insert("createdAt".into(), json!(now));
        record.insert(
            "expiresAt".into(),
            json!(now + Duration::days(i64::from(expires_in_days))),
        );

        let created = self
            .platform
            .create(ctx, ApiKey::NAME, record)
            .await
            .map_err(|e| {
                error!("Failed to create API key for {}: {}", dto.database_id, e);
                e
            })?;

        let api_key: ApiKey = from_record(created)?;
        info!(
            "API key created: id={}, database={}, key={}",
            api_key.id,
            api_key.database_id,
            mask_key(&api_key.key)
        );
        Ok(api_key)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<Option<ApiKey>> {
        require_identifier(id, "api key id")?;
        self.platform
            .delete(ctx, ApiKey::NAME, id)
            .await?
            .map(from_record)
            .transpose()
    }

    /// Live query over the caller's keys for one database
    pub fn observe(&self, ctx: &RequestContext, database_id: &str) -> Result<LiveQuery<ApiKey>> {
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
    use crate::core::error::AppError;
    use crate::features::databases::dtos::CreateDatabaseDto;
    use crate::features::databases::models::Sector;
    use crate::features::databases::DatabaseService;
    use crate::shared::test_helpers::{test_context, CountingPlatform};
    use futures::StreamExt;

    async fn setup() -> (ApiKeyService, String) {
        let platform = Arc::new(CountingPlatform::default());
        let database = DatabaseService::new(platform.clone())
            .create(
                &test_context(),
                CreateDatabaseDto {
                    name: "Docs".to_string(),
                    description: "Manuals".to_string(),
                    sector: Sector::Articles,
                    embedding_model: None,
                    max_tokens: None,
                    similarity_metric: None,
                },
            )
            .await
            .unwrap();
        (ApiKeyService::new(platform), database.id)
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let (service, database_id) = setup().await;

        let key = service
            .create(
                &test_context(),
                CreateApiKeyDto {
                    database_id: database_id.clone(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(key.key.starts_with("vdb-"));
        assert_eq!(key.key.len(), 68);
        assert_eq!(key.permissions, vec!["query".to_string()]);
        assert_eq!(key.rate_limit, DEFAULT_API_KEY_RATE_LIMIT);
        assert_eq!(key.status, API_KEY_STATUS_ACTIVE);
        assert!(key.last_used_at.is_none());

        let lifetime = key.expires_at.unwrap() - key.created_at.unwrap();
        assert_eq!(lifetime.num_days(), 30);
        assert!(!key.is_expired(Utc::now()));
    }

    #[tokio::test]
    async fn test_create_honours_expiry_and_rejects_empty_database() {
        let (service, database_id) = setup().await;
        let ctx = test_context();

        let key = service
            .create(
                &ctx,
                CreateApiKeyDto {
                    database_id,
                    expires_in_days: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            (key.expires_at.unwrap() - key.created_at.unwrap()).num_days(),
            7
        );

        let err = service
            .create(&ctx, CreateApiKeyDto::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_keys_are_private_to_owner() {
        let (service, database_id) = setup().await;
        let owner = test_context();
        service
            .create(
                &owner,
                CreateApiKeyDto {
                    database_id: database_id.clone(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let mut own = service
            .observe(&owner, &database_id)
            .unwrap()
            .subscribe()
            .await
            .unwrap();
        assert_eq!(own.next().await.unwrap().unwrap().items.len(), 1);

        let stranger = RequestContext::new("someone-else").unwrap();
        let mut theirs = service
            .observe(&stranger, &database_id)
            .unwrap()
            .subscribe()
            .await
            .unwrap();
        assert!(theirs.next().await.unwrap().unwrap().items.is_empty());
    }
}
