use std::sync::Arc;

use tracing::info;

use crate::core::context::RequestContext;
use crate::core::error::{AppError, Result};
use crate::features::api_keys::dtos::{
    mask_key, ApiKeyResponseDto, UserApiKeyDto, UserApiKeysResponseDto,
};
use crate::modules::gateway::GatewayClient;
use crate::shared::validation::require_identifier;

/// API key operations served by the REST gateway
pub struct ApiKeyGateway {
    client: Arc<GatewayClient>,
}

impl ApiKeyGateway {
    pub fn new(client: Arc<GatewayClient>) -> Self {
        Self { client }
    }

    /// The caller's key for a database, if one was issued
    pub async fn get(&self, ctx: &RequestContext, database_id: &str) -> Result<Option<String>> {
        require_identifier(database_id, "database id")?;

        let response: ApiKeyResponseDto = self
            .client
            .get_json(
                &format!("/{}/api-key", database_id),
                &[("user_id", ctx.user_id())],
            )
            .await?;
        Ok(response.api_key.filter(|key| !key.is_empty()))
    }

    /// Issue a new key, replacing any previous one
    pub async fn generate(&self, ctx: &RequestContext, database_id: &str) -> Result<String> {
        require_identifier(database_id, "database id")?;

        let response: ApiKeyResponseDto = self
            .client
            .post_json(
                &format!("/{}/generate-key", database_id),
                &[("user_id", ctx.user_id())],
            )
            .await?;

        let key = response
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AppError::Decode("Gateway did not return an API key".to_string()))?;

        info!(
            "API key generated for database {}: {}",
            database_id,
            mask_key(&key)
        );
        Ok(key)
    }

    /// Every key the caller holds, across databases
    pub async fn list_user(&self, ctx: &RequestContext) -> Result<Vec<UserApiKeyDto>> {
        let path = format!("/user/{}/api-keys", urlencoding::encode(ctx.user_id()));
        let response: UserApiKeysResponseDto = self.client.get_json(&path, &[]).await?;
        Ok(response.keys)
    }
}
