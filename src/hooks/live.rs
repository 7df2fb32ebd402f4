//! Live collection hook backed by a platform subscription

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use futures::{FutureExt, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::hooks::state::QueryState;
use crate::modules::platform::Subscription;

/// Type-erased function that opens a subscription for a dependency key
pub type Opener<K, T> =
    Arc<dyn Fn(K) -> BoxFuture<'static, Result<Subscription<T>>> + Send + Sync>;

/// Keeps `data` equal to the latest snapshot of a live collection.
///
/// The subscription is opened on mount, closed and reopened on re-key, and
/// closed on unmount or drop.
pub struct LiveCollectionHook<K, T> {
    inner: Arc<Inner<K, T>>,
}

struct Inner<K, T> {
    opener: Opener<K, T>,
    state: watch::Sender<QueryState<Vec<T>>>,
    generation: AtomicU64,
    current: Mutex<Current<K>>,
}

struct Current<K> {
    key: Option<K>,
    task: Option<JoinHandle<()>>,
}

impl<K> Current<K> {
    fn stop(&mut self) {
        // Aborting the consumer drops its Subscription, which cancels the producer
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<K, T> LiveCollectionHook<K, T>
where
    K: Clone + PartialEq + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new<F, Fut>(opener: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Subscription<T>>> + Send + 'static,
    {
        let opener: Opener<K, T> = Arc::new(move |key| opener(key).boxed());
        let (state, _) = watch::channel(QueryState::default());

        Self {
            inner: Arc::new(Inner {
                opener,
                state,
                generation: AtomicU64::new(0),
                current: Mutex::new(Current {
                    key: None,
                    task: None,
                }),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<Vec<T>>> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> QueryState<Vec<T>>
    where
        T: Clone,
    {
        self.inner.state.borrow().clone()
    }

    /// Open the subscription for `key`; a no-op while already mounted on it
    pub fn mount(&self, key: K) {
        let mut current = self.inner.lock();
        if current.key.as_ref() == Some(&key) {
            return;
        }
        current.key = Some(key.clone());
        self.inner.restart(&mut current, key);
    }

    /// Close and reopen the subscription for the current key
    pub fn restart_subscription(&self) {
        let mut current = self.inner.lock();
        if let Some(key) = current.key.clone() {
            self.inner.restart(&mut current, key);
        }
    }

    /// Close the subscription and publish an empty, settled collection.
    ///
    /// Used when the dependency key is missing and there is nothing to observe.
    pub fn clear(&self) {
        self.unmount();
        self.inner.state.send_modify(|state| {
            state.data = Some(Vec::new());
            state.loading = false;
            state.error = None;
        });
    }

    /// Surface a failed mutation made on behalf of this collection.
    ///
    /// The current data is kept.
    pub fn report_error(&self, error: AppError) {
        self.inner.state.send_modify(|state| state.fail(error));
    }

    pub fn unmount(&self) {
        self.inner.detach();
    }

    pub fn is_active(&self) -> bool {
        self.inner
            .lock()
            .task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl<K, T> Drop for LiveCollectionHook<K, T> {
    fn drop(&mut self) {
        self.inner.detach();
    }
}

impl<K, T> Inner<K, T> {
    fn detach(&self) {
        let mut current = self.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        current.key = None;
        current.stop();
        self.state
            .send_if_modified(|state| std::mem::replace(&mut state.loading, false));
    }

    fn lock(&self) -> MutexGuard<'_, Current<K>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

impl<K, T> Inner<K, T>
where
    K: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    fn restart(self: &Arc<Self>, current: &mut Current<K>, key: K) {
        current.stop();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| state.start_loading());
        current.task = Some(tokio::spawn(Inner::consume(
            Arc::clone(self),
            generation,
            key,
        )));
    }

    async fn consume(inner: Arc<Self>, generation: u64, key: K) {
        let mut subscription = match (inner.opener)(key).await {
            Ok(subscription) => subscription,
            Err(e) => {
                inner.state.send_if_modified(|state| {
                    if !inner.is_current(generation) {
                        return false;
                    }
                    state.fail(e);
                    true
                });
                return;
            }
        };

        while let Some(next) = subscription.next().await {
            let applied = inner.state.send_if_modified(|state| {
                if !inner.is_current(generation) {
                    return false;
                }
                match next {
                    Ok(snapshot) => {
                        state.data = Some(snapshot.items);
                        state.error = None;
                        if snapshot.is_synced {
                            state.loading = false;
                        }
                    }
                    Err(e) => state.fail(e),
                }
                true
            });

            if !applied {
                debug!("Live collection re-keyed, closing subscription");
                break;
            }
        }

        subscription.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::platform::Snapshot;
    use tokio::sync::{mpsc, oneshot};

    type Producer = (
        mpsc::Sender<Result<Snapshot<String>>>,
        oneshot::Receiver<()>,
    );

    /// Hook whose subscriptions are driven by the test through channels
    fn channel_hook() -> (
        LiveCollectionHook<String, String>,
        mpsc::UnboundedReceiver<(String, Producer)>,
    ) {
        let (opened_tx, opened_rx) = mpsc::unbounded_channel();
        let hook = LiveCollectionHook::new(move |key: String| {
            let opened_tx = opened_tx.clone();
            async move {
                let (tx, rx) = mpsc::channel(8);
                let (cancel_tx, cancel_rx) = oneshot::channel();
                let _ = opened_tx.send((key, (tx, cancel_rx)));
                Ok(Subscription::from_receiver(rx, cancel_tx))
            }
        });
        (hook, opened_rx)
    }

    fn snapshot(items: &[&str], is_synced: bool) -> Result<Snapshot<String>> {
        Ok(Snapshot {
            items: items.iter().map(|s| s.to_string()).collect(),
            is_synced,
        })
    }

    #[tokio::test]
    async fn test_data_tracks_latest_snapshot() {
        let (hook, mut opened) = channel_hook();
        let mut rx = hook.subscribe();

        hook.mount("db1".to_string());
        assert!(hook.state().loading);
        let (key, (tx, _cancel)) = opened.recv().await.unwrap();
        assert_eq!(key, "db1");

        tx.send(snapshot(&["a"], false)).await.unwrap();
        let state = rx.wait_for(|s| s.data.is_some()).await.unwrap().clone();
        assert_eq!(state.data, Some(vec!["a".to_string()]));
        assert!(state.loading);

        tx.send(snapshot(&["a", "b"], true)).await.unwrap();
        tx.send(snapshot(&["b"], true)).await.unwrap();
        let state = rx
            .wait_for(|s| s.data.as_ref().map(Vec::len) == Some(1) && !s.loading)
            .await
            .unwrap()
            .clone();
        assert_eq!(state.data, Some(vec!["b".to_string()]));
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_rekey_closes_previous_subscription() {
        let (hook, mut opened) = channel_hook();

        hook.mount("db1".to_string());
        let (_, (_tx1, cancel1)) = opened.recv().await.unwrap();

        // Same key again does not reopen
        hook.mount("db1".to_string());

        hook.mount("db2".to_string());
        assert!(cancel1.await.is_ok());

        let (key, (tx2, _cancel2)) = opened.recv().await.unwrap();
        assert_eq!(key, "db2");
        tx2.send(snapshot(&["x"], true)).await.unwrap();

        let mut rx = hook.subscribe();
        let state = rx.wait_for(|s| s.data.is_some()).await.unwrap().clone();
        assert_eq!(state.data, Some(vec!["x".to_string()]));
    }

    #[tokio::test]
    async fn test_unmount_and_drop_close_subscription() {
        let (hook, mut opened) = channel_hook();
        hook.mount("db1".to_string());
        let (_, (_tx, cancel)) = opened.recv().await.unwrap();
        assert!(hook.state().loading);
        hook.unmount();
        assert!(cancel.await.is_ok());
        assert!(!hook.is_active());
        assert!(!hook.state().loading);

        hook.mount("db1".to_string());
        let (_, (_tx, cancel)) = opened.recv().await.unwrap();
        drop(hook);
        assert!(cancel.await.is_ok());
    }

    #[tokio::test]
    async fn test_error_keeps_last_snapshot() {
        let (hook, mut opened) = channel_hook();
        let mut rx = hook.subscribe();
        hook.mount("db1".to_string());
        let (_, (tx, _cancel)) = opened.recv().await.unwrap();

        tx.send(snapshot(&["a"], true)).await.unwrap();
        rx.wait_for(|s| s.data.is_some()).await.unwrap();

        tx.send(Err(AppError::Transport("socket closed".to_string())))
            .await
            .unwrap();
        let state = rx.wait_for(|s| s.error.is_some()).await.unwrap().clone();
        assert_eq!(state.data, Some(vec!["a".to_string()]));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_clear_publishes_empty_collection() {
        let (hook, _opened) = channel_hook();
        hook.clear();
        let state = hook.state();
        assert_eq!(state.data, Some(Vec::new()));
        assert!(!state.loading);
        assert!(!hook.is_active());
    }

    #[tokio::test]
    async fn test_open_failure_sets_error() {
        let hook: LiveCollectionHook<String, String> = LiveCollectionHook::new(|_key: String| async {
            Err(AppError::remote(403, "Not authorized"))
        });
        let mut rx = hook.subscribe();
        hook.mount("db1".to_string());

        let state = rx.wait_for(|s| s.error.is_some()).await.unwrap().clone();
        assert_eq!(state.error_message(), Some("Not authorized"));
        assert_eq!(state.data, None);
    }
}
