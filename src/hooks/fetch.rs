//! One-shot fetch hook with optional polling
//!
//! A [`FetchHook`] binds one async fetch to reactive [`QueryState`]. Every mount
//! or re-key starts a new generation; responses from an older generation, or
//! arriving after unmount, are discarded. At most one poll timer exists per hook
//! and it belongs to the current generation.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::warn;

use crate::core::error::Result;
use crate::hooks::state::QueryState;

/// Type-erased fetch function for a dependency key
pub type Fetcher<K, T> = Arc<dyn Fn(K) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Polling configuration for a [`FetchHook`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollOptions {
    /// Re-fetch period; `None` disables polling
    pub interval: Option<Duration>,
    pub paused: bool,
}

impl PollOptions {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
            paused: false,
        }
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }
}

pub struct FetchHook<K, T> {
    inner: Arc<Inner<K, T>>,
}

struct Inner<K, T> {
    fetcher: Fetcher<K, T>,
    state: watch::Sender<QueryState<T>>,
    generation: AtomicU64,
    current: Mutex<Current<K>>,
}

struct Current<K> {
    key: Option<K>,
    options: PollOptions,
    poll: Option<JoinHandle<()>>,
}

impl<K> Current<K> {
    fn stop_polling(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.abort();
        }
    }
}

impl<K, T> FetchHook<K, T>
where
    K: Clone + PartialEq + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new<F, Fut>(fetcher: F, options: PollOptions) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let fetcher: Fetcher<K, T> = Arc::new(move |key| fetcher(key).boxed());
        let (state, _) = watch::channel(QueryState::default());

        Self {
            inner: Arc::new(Inner {
                fetcher,
                state,
                generation: AtomicU64::new(0),
                current: Mutex::new(Current {
                    key: None,
                    options,
                    poll: None,
                }),
            }),
        }
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> QueryState<T>
    where
        T: Clone,
    {
        self.inner.state.borrow().clone()
    }

    /// Mount the hook for `key`, or switch to a new key.
    ///
    /// Mounting again with the key already in use does nothing. Must be called
    /// from within a tokio runtime.
    pub fn mount(&self, key: K) {
        let generation = {
            let mut current = self.inner.lock();
            if current.key.as_ref() == Some(&key) {
                return;
            }
            current.stop_polling();
            current.key = Some(key.clone());

            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            current.poll = Inner::spawn_poll(&self.inner, generation, &key, current.options);
            generation
        };

        tokio::spawn(Inner::run_fetch(Arc::clone(&self.inner), generation, key));
    }

    /// Re-issue the fetch for the current key and wait for it to settle
    pub async fn refresh(&self) {
        let target = {
            let current = self.inner.lock();
            current
                .key
                .clone()
                .map(|key| (self.inner.generation.load(Ordering::SeqCst), key))
        };

        if let Some((generation, key)) = target {
            Inner::run_fetch(Arc::clone(&self.inner), generation, key).await;
        }
    }

    /// Pause or resume polling without re-keying
    pub fn set_paused(&self, paused: bool) {
        let mut current = self.inner.lock();
        if current.options.paused == paused {
            return;
        }
        current.options.paused = paused;
        current.stop_polling();

        if let Some(key) = current.key.clone() {
            let generation = self.inner.generation.load(Ordering::SeqCst);
            current.poll = Inner::spawn_poll(&self.inner, generation, &key, current.options);
        }
    }

    /// Apply a local edit to the current data.
    ///
    /// Used for optimistic updates; the next authoritative fetch replaces it.
    pub fn mutate<F>(&self, f: F)
    where
        F: FnOnce(&mut Option<T>),
    {
        self.inner.state.send_modify(|state| f(&mut state.data));
    }

    /// Cancel the poll timer and ignore every response still in flight
    pub fn unmount(&self) {
        self.inner.detach();
    }

    pub fn is_polling(&self) -> bool {
        self.inner
            .lock()
            .poll
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<K, T> Drop for FetchHook<K, T> {
    fn drop(&mut self) {
        self.inner.detach();
    }
}

impl<K, T> Inner<K, T> {
    /// Forget the key, stop polling and settle `loading`; in-flight results are ignored
    fn detach(&self) {
        let mut current = self.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        current.key = None;
        current.stop_polling();
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
    K: Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    async fn run_fetch(inner: Arc<Self>, generation: u64, key: K) {
        if !inner.is_current(generation) {
            return;
        }
        inner.state.send_modify(|state| state.start_loading());

        let result = (inner.fetcher)(key).await;

        let applied = inner.state.send_if_modified(|state| {
            if !inner.is_current(generation) {
                return false;
            }
            match result {
                Ok(data) => state.resolve(data),
                Err(e) => state.fail(e),
            }
            true
        });

        if !applied {
            warn!("Discarding stale response for generation {}", generation);
        }
    }

    fn spawn_poll(
        inner: &Arc<Self>,
        generation: u64,
        key: &K,
        options: PollOptions,
    ) -> Option<JoinHandle<()>> {
        let period = options.interval.filter(|_| !options.paused)?;
        let inner = Arc::clone(inner);
        let key = key.clone();

        Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if !inner.is_current(generation) {
                    break;
                }
                Inner::run_fetch(Arc::clone(&inner), generation, key.clone()).await;
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    fn counting_hook(
        calls: Arc<AtomicUsize>,
        options: PollOptions,
    ) -> FetchHook<String, usize> {
        FetchHook::new(
            move |_key: String| {
                let calls = Arc::clone(&calls);
                async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) }
            },
            options,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_fetches_once_without_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook = counting_hook(Arc::clone(&calls), PollOptions::default());
        let mut rx = hook.subscribe();

        hook.mount("user123".to_string());
        let state = rx.wait_for(|s| s.data.is_some()).await.unwrap().clone();
        assert_eq!(state.data, Some(1));
        assert!(!state.loading);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!hook.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_refetches_on_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook = counting_hook(Arc::clone(&calls), PollOptions::every(Duration::from_secs(5)));

        hook.mount("user123".to_string());
        sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(hook.state().data, Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_stops_poll_timer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook = counting_hook(Arc::clone(&calls), PollOptions::every(Duration::from_secs(5)));

        hook.mount("user123".to_string());
        sleep(Duration::from_millis(5_010)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(hook.is_polling());

        hook.unmount();
        let issued = calls.load(Ordering::SeqCst);
        sleep(Duration::from_secs(60)).await;

        assert_eq!(calls.load(Ordering::SeqCst), issued);
        assert!(!hook.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_poll_timer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook = counting_hook(Arc::clone(&calls), PollOptions::every(Duration::from_secs(5)));

        hook.mount("user123".to_string());
        sleep(Duration::from_millis(10)).await;
        drop(hook);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_polling_and_resume() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hook = counting_hook(
            Arc::clone(&calls),
            PollOptions::every(Duration::from_secs(5)).paused(true),
        );

        hook.mount("user123".to_string());
        sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!hook.is_polling());

        hook.set_paused(false);
        sleep(Duration::from_millis(5_010)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        hook.set_paused(true);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_never_overwrites_newer_key() {
        let hook: FetchHook<String, String> = FetchHook::new(
            |key: String| async move {
                let delay = if key == "slow" { 500 } else { 10 };
                sleep(Duration::from_millis(delay)).await;
                Ok(format!("result for {}", key))
            },
            PollOptions::default(),
        );

        hook.mount("slow".to_string());
        sleep(Duration::from_millis(1)).await;
        hook.mount("fast".to_string());

        sleep(Duration::from_millis(50)).await;
        assert_eq!(hook.state().data.as_deref(), Some("result for fast"));

        // The slow request resolves afterwards and must be ignored
        sleep(Duration::from_secs(1)).await;
        let state = hook.state();
        assert_eq!(state.data.as_deref(), Some("result for fast"));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_after_unmount_is_ignored() {
        let hook: FetchHook<String, u32> = FetchHook::new(
            |_key: String| async move {
                sleep(Duration::from_millis(100)).await;
                Ok(42)
            },
            PollOptions::default(),
        );

        hook.mount("user123".to_string());
        sleep(Duration::from_millis(10)).await;
        assert!(hook.state().loading);
        hook.unmount();
        assert!(!hook.state().loading);

        sleep(Duration::from_secs(1)).await;
        let state = hook.state();
        assert_eq!(state.data, None);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_keeps_stale_data_and_refresh_recovers() {
        let fail = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let hook: FetchHook<String, Vec<String>> = {
            let fail = Arc::clone(&fail);
            FetchHook::new(
                move |_key: String| {
                    let fail = fail.load(Ordering::SeqCst);
                    async move {
                        if fail {
                            Err(AppError::Transport("connection refused".to_string()))
                        } else {
                            Ok(vec!["db1".to_string()])
                        }
                    }
                },
                PollOptions::default(),
            )
        };

        hook.mount("user123".to_string());
        sleep(Duration::from_millis(10)).await;
        assert_eq!(hook.state().data, Some(vec!["db1".to_string()]));

        fail.store(true, Ordering::SeqCst);
        hook.refresh().await;
        let state = hook.state();
        assert_eq!(state.data, Some(vec!["db1".to_string()]));
        assert!(state.error_message().is_some());
        assert!(!state.loading);

        fail.store(false, Ordering::SeqCst);
        hook.refresh().await;
        assert!(hook.state().error.is_none());
    }

    #[tokio::test]
    async fn test_mutate_applies_local_edit() {
        let hook: FetchHook<String, Vec<u32>> =
            FetchHook::new(|_key: String| async move { Ok(vec![1]) }, PollOptions::default());
        hook.mount("user123".to_string());
        hook.subscribe()
            .wait_for(|s| s.data.is_some())
            .await
            .unwrap();

        hook.mutate(|data| data.get_or_insert_with(Vec::new).push(2));
        assert_eq!(hook.state().data, Some(vec![1, 2]));
    }
}
