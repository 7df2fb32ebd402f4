use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{error, info};
use validator::Validate;

use crate::core::context::RequestContext;
use crate::core::error::Result;
use crate::features::databases::dtos::{CreateDatabaseDto, UpdateDatabaseDto};
use crate::features::databases::models::Database;
use crate::modules::platform::{from_record, to_record, DataPlatform, LiveQuery, Model};
use crate::shared::constants::DATABASE_STATUS_ACTIVE;
use crate::shared::validation::require_identifier;

/// Service for Database records on the managed platform
pub struct DatabaseService {
    platform: Arc<dyn DataPlatform>,
}

impl DatabaseService {
    pub fn new(platform: Arc<dyn DataPlatform>) -> Self {
        Self { platform }
    }

    /// Create a database owned by the caller.
    ///
    /// Status, counters and timestamps are stamped here; whatever the caller
    /// passes, a new database starts empty.
    pub async fn create(&self, ctx: &RequestContext, dto: CreateDatabaseDto) -> Result<Database> {
        dto.validate()?;

        let now = Utc::now();
        let mut record = to_record(&dto)?;
        record.insert("status".into(), json!(DATABASE_STATUS_ACTIVE));
        record.insert("documentCount".into(), json!(0));
        record.insert("databaseSize".into(), json!(0.0));
        record.insert("createdBy".into(), json!(ctx.user_id()));
        record.insert("ownerId".into(), json!(ctx.user_id()));
        record.insert("createdAt".into(), json!(now));
        record.insert("updatedAt".into(), json!(now));

        let created = self
            .platform
            .create(ctx, Database::NAME, record)
            .await
            .map_err(|e| {
                error!("Failed to create database '{}': {}", dto.name, e);
                e
            })?;

        let database: Database = from_record(created)?;
        info!("Database created: id={}, name={}", database.id, database.name);
        Ok(database)
    }

    /// Apply a partial update; `updatedAt` is always refreshed
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &str,
        dto: UpdateDatabaseDto,
    ) -> Result<Database> {
        require_identifier(id, "database id")?;
        dto.validate()?;

        let mut patch = to_record(&dto)?;
        patch.insert("updatedAt".into(), json!(Utc::now()));

        let updated = self
            .platform
            .update(ctx, Database::NAME, id, patch)
            .await
            .map_err(|e| {
                error!("Failed to update database {}: {}", id, e);
                e
            })?;

        from_record(updated)
    }

    /// Delete a database. Deleting one that is already gone yields `Ok(None)`.
    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<Option<Database>> {
        require_identifier(id, "database id")?;

        let removed = self.platform.delete(ctx, Database::NAME, id).await?;
        if removed.is_some() {
            info!("Database deleted: id={}", id);
        }
        removed.map(from_record).transpose()
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Option<Database>> {
        require_identifier(id, "database id")?;
        self.platform
            .get(ctx, Database::NAME, id)
            .await?
            .map(from_record)
            .transpose()
    }

    /// Live query over every database visible to the caller
    pub fn observe(&self, ctx: &RequestContext) -> LiveQuery<Database> {
        LiveQuery::new(Arc::clone(&self.platform), ctx.clone(), None)
    }
}
