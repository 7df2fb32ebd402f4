//! Managed platform module
//!
//! The managed platform provides schema-typed CRUD, owner-based authorization and
//! real-time collection subscriptions. [`DataPlatform`] is the seam the data
//! access layer talks to; [`InMemoryPlatform`] is an in-process implementation
//! with the same schema and authorization rules.

mod memory;
mod model;
pub mod schema;
mod subscription;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::context::RequestContext;
use crate::core::error::Result;

pub use memory::InMemoryPlatform;
pub use model::{from_record, to_record, LiveQuery, Model};
pub use subscription::{Snapshot, Subscription};

/// A platform record: one JSON object with camelCase fields
pub type Record = Map<String, Value>;

/// Conjunction of field equality conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }
}

/// Typed CRUD plus live queries over platform models.
///
/// Implementations enforce the platform schema (foreign keys) and authorization
/// (owner-only writes, per-model read rules). Deleting an id that does not
/// exist is not an error: it resolves to `Ok(None)`.
#[async_trait]
pub trait DataPlatform: Send + Sync {
    async fn create(&self, ctx: &RequestContext, model: &str, record: Record) -> Result<Record>;

    async fn update(
        &self,
        ctx: &RequestContext,
        model: &str,
        id: &str,
        patch: Record,
    ) -> Result<Record>;

    async fn delete(&self, ctx: &RequestContext, model: &str, id: &str)
        -> Result<Option<Record>>;

    async fn get(&self, ctx: &RequestContext, model: &str, id: &str) -> Result<Option<Record>>;

    /// Open a live subscription over the records of `model` matching `filter`
    async fn observe(
        &self,
        ctx: &RequestContext,
        model: &str,
        filter: Option<Filter>,
    ) -> Result<Subscription<Record>>;
}
