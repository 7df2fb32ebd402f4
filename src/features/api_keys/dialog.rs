use std::sync::Arc;

use tracing::error;

use crate::core::context::RequestContext;
use crate::core::error::Result;
use crate::features::api_keys::dtos::mask_key;
use crate::features::api_keys::services::ApiKeyGateway;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyDialogState {
    Closed,
    Loading,
    Ready(String),
    Failed(String),
}

/// "API key" dialog of a database.
///
/// Opening it shows the existing key, generating one first when the database
/// has none. It always settles in `Ready` or `Failed`.
pub struct ApiKeyDialog {
    gateway: Arc<ApiKeyGateway>,
    ctx: RequestContext,
    database_id: String,
    database_name: String,
    state: ApiKeyDialogState,
}

impl ApiKeyDialog {
    pub fn new(
        gateway: Arc<ApiKeyGateway>,
        ctx: RequestContext,
        database_id: impl Into<String>,
        database_name: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            ctx,
            database_id: database_id.into(),
            database_name: database_name.into(),
            state: ApiKeyDialogState::Closed,
        }
    }

    pub async fn open(&mut self) -> &ApiKeyDialogState {
        self.state = ApiKeyDialogState::Loading;
        let result = self.existing_or_generated().await;
        self.settle(result, "fetch")
    }

    /// Replace the key with a newly generated one
    pub async fn regenerate(&mut self) -> &ApiKeyDialogState {
        self.state = ApiKeyDialogState::Loading;
        let result = self.gateway.generate(&self.ctx, &self.database_id).await;
        self.settle(result, "generate")
    }

    pub fn close(&mut self) {
        self.state = ApiKeyDialogState::Closed;
    }

    pub fn state(&self) -> &ApiKeyDialogState {
        &self.state
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn key(&self) -> Option<&str> {
        match &self.state {
            ApiKeyDialogState::Ready(key) => Some(key),
            _ => None,
        }
    }

    pub fn masked(&self) -> Option<String> {
        self.key().map(mask_key)
    }

    async fn existing_or_generated(&self) -> Result<String> {
        match self.gateway.get(&self.ctx, &self.database_id).await? {
            Some(key) => Ok(key),
            None => self.gateway.generate(&self.ctx, &self.database_id).await,
        }
    }

    fn settle(&mut self, result: Result<String>, action: &str) -> &ApiKeyDialogState {
        self.state = match result {
            Ok(key) => ApiKeyDialogState::Ready(key),
            Err(e) => {
                error!(
                    "Failed to {} API key for database {}: {}",
                    action, self.database_id, e
                );
                ApiKeyDialogState::Failed(format!(
                    "Failed to {} API key: {}",
                    action,
                    e.user_message()
                ))
            }
        };
        &self.state
    }
}
