use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::core::context::RequestContext;
use crate::core::error::{AppError, Result};
use crate::modules::platform::{DataPlatform, Filter, Record, Subscription};

/// A typed record stored on the managed platform
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Model name registered in the platform schema
    const NAME: &'static str;

    fn id(&self) -> &str;
}

pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Internal(format!(
            "Expected a JSON object for a platform record, got {}",
            other
        ))),
    }
}

pub fn from_record<M: DeserializeOwned>(record: Record) -> Result<M> {
    serde_json::from_value(Value::Object(record))
        .map_err(|e| AppError::Decode(format!("Malformed platform record: {}", e)))
}

/// Lazy, restartable live query over one model collection.
///
/// Nothing is opened until [`LiveQuery::subscribe`] is called; each call opens a
/// fresh subscription that the caller must close (or drop) when done.
pub struct LiveQuery<M> {
    platform: Arc<dyn DataPlatform>,
    ctx: RequestContext,
    filter: Option<Filter>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for LiveQuery<M> {
    fn clone(&self) -> Self {
        Self {
            platform: Arc::clone(&self.platform),
            ctx: self.ctx.clone(),
            filter: self.filter.clone(),
            _model: PhantomData,
        }
    }
}

impl<M: Model> LiveQuery<M> {
    pub fn new(platform: Arc<dyn DataPlatform>, ctx: RequestContext, filter: Option<Filter>) -> Self {
        Self {
            platform,
            ctx,
            filter,
            _model: PhantomData,
        }
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub async fn subscribe(&self) -> Result<Subscription<M>> {
        let subscription = self
            .platform
            .observe(&self.ctx, M::NAME, self.filter.clone())
            .await?;
        // A record that no longer fits the model must not hide the rest of the collection
        Ok(subscription.filter_map_items(|record: Record| {
            let id = record
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            match from_record::<M>(record) {
                Ok(model) => Some(model),
                Err(e) => {
                    warn!("Skipping undecodable {} record {}: {}", M::NAME, id, e);
                    None
                }
            }
        }))
    }
}
