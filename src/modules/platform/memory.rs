//! In-process managed platform
//!
//! Keeps every model collection in memory, enforces the platform schema and
//! authorization rules, and pushes a fresh snapshot to each live subscription
//! whenever its collection changes.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::context::RequestContext;
use crate::core::error::{AppError, Result};
use crate::modules::platform::schema::{self, ModelSchema, OWNER_FIELD};
use crate::modules::platform::{DataPlatform, Filter, Record, Snapshot, Subscription};

/// Capacity of the change feed shared by all subscriptions
const CHANGE_FEED_CAPACITY: usize = 256;

/// Buffered snapshots per subscription before the producer waits
const SUBSCRIPTION_BUFFER: usize = 16;

/// In-memory implementation of [`DataPlatform`]
#[derive(Clone)]
pub struct InMemoryPlatform {
    state: Arc<PlatformState>,
}

struct PlatformState {
    /// model name -> (id -> record); ids are UUID v7 so iteration follows creation order
    collections: RwLock<HashMap<&'static str, BTreeMap<String, Record>>>,
    /// Names of models whose collection changed
    changes: broadcast::Sender<&'static str>,
    active_subscriptions: AtomicUsize,
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlatform {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            state: Arc::new(PlatformState {
                collections: RwLock::new(HashMap::new()),
                changes,
                active_subscriptions: AtomicUsize::new(0),
            }),
        }
    }

    /// Number of live subscriptions whose producer is still running
    pub fn active_subscriptions(&self) -> usize {
        self.state.active_subscriptions.load(Ordering::SeqCst)
    }

    /// Write a record on behalf of the external system.
    ///
    /// Used for data the client never writes itself: usage windows and document
    /// status transitions made by the ingestion pipeline. Existing records are
    /// merged field by field; foreign keys are not checked.
    pub async fn ingest(&self, model: &str, owner: &str, mut record: Record) -> Result<Record> {
        let schema = model_schema(model)?;
        let id = record_id(&record).unwrap_or_else(|| Uuid::now_v7().to_string());
        record.insert("id".to_string(), Value::String(id.clone()));
        record.insert(OWNER_FIELD.to_string(), Value::String(owner.to_string()));

        let stored = {
            let mut collections = self.state.collections.write().await;
            let collection = collections.entry(schema.name).or_default();
            let entry = collection.entry(id).or_default();
            entry.extend(record);
            entry.clone()
        };

        self.state.notify(schema.name);
        Ok(stored)
    }
}

impl PlatformState {
    fn notify(&self, model: &'static str) {
        // No receivers simply means nobody is subscribed
        let _ = self.changes.send(model);
    }

    async fn snapshot(
        &self,
        ctx: &RequestContext,
        schema: &ModelSchema,
        filter: Option<&Filter>,
    ) -> Vec<Record> {
        let collections = self.collections.read().await;
        collections
            .get(schema.name)
            .map(|collection| {
                collection
                    .values()
                    .filter(|record| can_read(ctx, schema, record))
                    .filter(|record| filter.is_none_or(|f| f.matches(record)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn model_schema(model: &str) -> Result<&'static ModelSchema> {
    schema::lookup(model).ok_or_else(|| AppError::remote(400, format!("Unknown model '{}'", model)))
}

fn record_id(record: &Record) -> Option<String> {
    record
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(String::from)
}

fn record_owner(record: &Record) -> Option<&str> {
    record.get(OWNER_FIELD).and_then(Value::as_str)
}

fn can_read(ctx: &RequestContext, schema: &ModelSchema, record: &Record) -> bool {
    schema.public_read || ctx.owns(record_owner(record))
}

fn ensure_owner(ctx: &RequestContext, model: &str, id: &str, record: &Record) -> Result<()> {
    if ctx.owns(record_owner(record)) {
        Ok(())
    } else {
        Err(AppError::remote(
            403,
            format!("Not authorized to modify {} {}", model, id),
        ))
    }
}

fn check_foreign_keys(
    schema: &ModelSchema,
    record: &Record,
    collections: &HashMap<&'static str, BTreeMap<String, Record>>,
) -> Result<()> {
    for (field, target) in schema.foreign_keys {
        let Some(value) = record.get(*field) else {
            continue;
        };
        let exists = value
            .as_str()
            .filter(|id| !id.is_empty())
            .is_some_and(|id| {
                collections
                    .get(target)
                    .is_some_and(|collection| collection.contains_key(id))
            });
        if !exists {
            return Err(AppError::remote(
                400,
                format!(
                    "{}.{} must reference an existing {}",
                    schema.name, field, target
                ),
            ));
        }
    }
    Ok(())
}

#[async_trait]
impl DataPlatform for InMemoryPlatform {
    async fn create(&self, ctx: &RequestContext, model: &str, mut record: Record) -> Result<Record> {
        let schema = model_schema(model)?;
        let id = record_id(&record).unwrap_or_else(|| Uuid::now_v7().to_string());
        record.insert("id".to_string(), Value::String(id.clone()));
        record.insert(
            OWNER_FIELD.to_string(),
            Value::String(ctx.user_id().to_string()),
        );

        {
            let mut collections = self.state.collections.write().await;
            for (field, _) in schema.foreign_keys {
                if !record.contains_key(*field) {
                    return Err(AppError::remote(
                        400,
                        format!("{}.{} is required", schema.name, field),
                    ));
                }
            }
            check_foreign_keys(schema, &record, &collections)?;

            let collection = collections.entry(schema.name).or_default();
            if collection.contains_key(&id) {
                return Err(AppError::remote(
                    409,
                    format!("{} {} already exists", schema.name, id),
                ));
            }
            collection.insert(id.clone(), record.clone());
        }

        info!("Platform created {} {}", schema.name, id);
        self.state.notify(schema.name);
        Ok(record)
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        model: &str,
        id: &str,
        mut patch: Record,
    ) -> Result<Record> {
        let schema = model_schema(model)?;
        patch.remove("id");
        patch.remove(OWNER_FIELD);

        let updated = {
            let mut collections = self.state.collections.write().await;
            check_foreign_keys(schema, &patch, &collections)?;

            let record = collections
                .get_mut(schema.name)
                .and_then(|collection| collection.get_mut(id))
                .ok_or_else(|| AppError::NotFound(format!("{} {}", schema.name, id)))?;
            ensure_owner(ctx, schema.name, id, record)?;
            record.extend(patch);
            record.clone()
        };

        debug!("Platform updated {} {}", schema.name, id);
        self.state.notify(schema.name);
        Ok(updated)
    }

    async fn delete(
        &self,
        ctx: &RequestContext,
        model: &str,
        id: &str,
    ) -> Result<Option<Record>> {
        let schema = model_schema(model)?;

        let removed = {
            let mut collections = self.state.collections.write().await;
            let Some(collection) = collections.get_mut(schema.name) else {
                return Ok(None);
            };
            match collection.get(id) {
                None => return Ok(None),
                Some(record) => ensure_owner(ctx, schema.name, id, record)?,
            }
            collection.remove(id)
        };

        debug!("Platform deleted {} {}", schema.name, id);
        self.state.notify(schema.name);
        Ok(removed)
    }

    async fn get(&self, ctx: &RequestContext, model: &str, id: &str) -> Result<Option<Record>> {
        let schema = model_schema(model)?;
        let collections = self.state.collections.read().await;
        Ok(collections
            .get(schema.name)
            .and_then(|collection| collection.get(id))
            .filter(|record| can_read(ctx, schema, record))
            .cloned())
    }

    async fn observe(
        &self,
        ctx: &RequestContext,
        model: &str,
        filter: Option<Filter>,
    ) -> Result<Subscription<Record>> {
        let schema = model_schema(model)?;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        // Subscribe to the feed before taking the first snapshot so no change is missed
        let mut changes = self.state.changes.subscribe();
        let state = Arc::clone(&self.state);
        let ctx = ctx.clone();

        state.active_subscriptions.fetch_add(1, Ordering::SeqCst);
        debug!("Opening live query on {}", schema.name);

        tokio::spawn(async move {
            let initial = state.snapshot(&ctx, schema, filter.as_ref()).await;
            let mut open = tx
                .send(Ok(Snapshot {
                    items: initial,
                    is_synced: true,
                }))
                .await
                .is_ok();

            while open {
                tokio::select! {
                    _ = &mut cancel_rx => break,
                    change = changes.recv() => match change {
                        Ok(changed) if changed != schema.name => continue,
                        Ok(_) | Err(RecvError::Lagged(_)) => {
                            let items = state.snapshot(&ctx, schema, filter.as_ref()).await;
                            open = tx
                                .send(Ok(Snapshot { items, is_synced: true }))
                                .await
                                .is_ok();
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }

            state.active_subscriptions.fetch_sub(1, Ordering::SeqCst);
            debug!("Live query on {} closed", schema.name);
        });

        Ok(Subscription::from_receiver(rx, cancel_tx))
    }
}
