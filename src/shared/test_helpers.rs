//! Fixtures shared by the in-file test modules

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use fake::faker::lorem::en::Word;
use fake::Fake;

use crate::core::config::GatewayConfig;
use crate::core::context::RequestContext;
use crate::core::error::{AppError, Result};
use crate::modules::gateway::GatewayClient;
use crate::modules::platform::{DataPlatform, Filter, InMemoryPlatform, Record, Subscription};
use crate::modules::storage::ObjectStore;

pub const TEST_USER_ID: &str = "user123";

pub fn test_context() -> RequestContext {
    RequestContext::new(TEST_USER_ID).unwrap()
}

pub fn fake_database_name() -> String {
    let first: String = Word().fake();
    let second: String = Word().fake();
    format!("{} {}", first, second)
}

/// Serve `router` on an ephemeral local port and return a client pointed at it
pub async fn spawn_gateway(router: Router) -> Arc<GatewayClient> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config = GatewayConfig {
        base_url: format!("http://{}", addr),
        request_timeout: Duration::from_secs(5),
        api_token: None,
    };
    Arc::new(GatewayClient::new(&config).unwrap())
}

/// In-memory platform that counts write requests
#[derive(Default, Clone)]
pub struct CountingPlatform {
    pub inner: InMemoryPlatform,
    creates: Arc<AtomicUsize>,
    updates: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
}

impl CountingPlatform {
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataPlatform for CountingPlatform {
    async fn create(&self, ctx: &RequestContext, model: &str, record: Record) -> Result<Record> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(ctx, model, record).await
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        model: &str,
        id: &str,
        patch: Record,
    ) -> Result<Record> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(ctx, model, id, patch).await
    }

    async fn delete(
        &self,
        ctx: &RequestContext,
        model: &str,
        id: &str,
    ) -> Result<Option<Record>> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(ctx, model, id).await
    }

    async fn get(&self, ctx: &RequestContext, model: &str, id: &str) -> Result<Option<Record>> {
        self.inner.get(ctx, model, id).await
    }

    async fn observe(
        &self,
        ctx: &RequestContext,
        model: &str,
        filter: Option<Filter>,
    ) -> Result<Subscription<Record>> {
        self.inner.observe(ctx, model, filter).await
    }
}

/// Object store backed by a map
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<()> {
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::Storage(format!("No such key: {}", key)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("memory://uploads-bucket/{}", key)
    }
}
