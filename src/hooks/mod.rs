//! Reactive state hooks.
//!
//! Each hook exposes `{ data, loading, error }` through a `tokio::sync::watch`
//! channel and owns at most one in-flight request generation.

pub mod fetch;
pub mod live;
pub mod state;

pub use fetch::{FetchHook, Fetcher, PollOptions};
pub use live::{LiveCollectionHook, Opener};
pub use state::{HookError, QueryState};
