use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use validator::Validate;

use crate::core::context::RequestContext;
use crate::core::error::Result;
use crate::features::databases::dtos::{
    CreateDatabaseForm, CreateDatabaseResponseDto, DatabaseListEntry, DatabaseStatusDto,
    DeleteDatabaseResponseDto,
};
use crate::modules::gateway::GatewayClient;
use crate::shared::validation::require_identifier;

/// Database operations served by the REST gateway
pub struct DatabaseGateway {
    client: Arc<GatewayClient>,
}

impl DatabaseGateway {
    pub fn new(client: Arc<GatewayClient>) -> Self {
        Self { client }
    }

    /// List the caller's databases.
    ///
    /// A body that is not a JSON array is treated as an empty list.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<DatabaseListEntry>> {
        let body: Value = self
            .client
            .get_json("/list", &[("user_id", ctx.user_id())])
            .await?;

        match body {
            Value::Array(_) => Ok(serde_json::from_value(body)?),
            other => {
                warn!("Database list response is not an array: {}", other);
                Ok(Vec::new())
            }
        }
    }

    /// Submit a new database with its files for ingestion
    pub async fn create(
        &self,
        ctx: &RequestContext,
        form: &CreateDatabaseForm,
    ) -> Result<CreateDatabaseResponseDto> {
        form.validate()?;

        let multipart = form.to_multipart(ctx.user_id())?;
        let response: CreateDatabaseResponseDto =
            self.client.post_multipart("/create", multipart).await?;

        info!(
            "Database submitted: id={}, name={}, files={}",
            response.database_id,
            form.name,
            form.files.len()
        );
        Ok(response)
    }

    /// Current ingestion status of a database
    pub async fn status(&self, database_id: &str) -> Result<String> {
        require_identifier(database_id, "database id")?;

        let response: DatabaseStatusDto = self
            .client
            .get_json(&format!("/{}/status", database_id), &[])
            .await?;
        Ok(response.status)
    }

    pub async fn delete(&self, database_id: &str) -> Result<DeleteDatabaseResponseDto> {
        require_identifier(database_id, "database id")?;

        let response: DeleteDatabaseResponseDto = self
            .client
            .delete_json(&format!("/{}", database_id))
            .await?;

        info!("Database deleted via gateway: id={}", database_id);
        Ok(response)
    }
}
