use std::fmt;
use std::sync::Arc;

use crate::core::error::AppError;

/// Failure as exposed to a screen: one display string plus the raw cause
#[derive(Debug, Clone)]
pub struct HookError {
    pub message: String,
    pub cause: Arc<AppError>,
}

impl HookError {
    /// Normalize an error for display, logging the raw cause
    pub fn from_error(error: AppError) -> Self {
        if error.is_local() {
            tracing::warn!("Hook request rejected locally: {}", error);
        } else {
            tracing::error!("Hook request failed: {}", error);
        }
        Self {
            message: error.user_message(),
            cause: Arc::new(error),
        }
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl PartialEq for HookError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

/// Reactive state exposed by every hook
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    /// Last successful result; kept when a later request fails
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<HookError>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl<T> QueryState<T> {
    pub(crate) fn start_loading(&mut self) {
        self.loading = true;
    }

    pub(crate) fn resolve(&mut self, data: T) {
        self.data = Some(data);
        self.error = None;
        self.loading = false;
    }

    pub(crate) fn fail(&mut self, error: AppError) {
        self.error = Some(HookError::from_error(error));
        self.loading = false;
    }

    /// Message to render in place of the content, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_previous_data() {
        let mut state = QueryState::default();
        state.start_loading();
        state.resolve(vec![1, 2, 3]);
        assert!(!state.loading);

        state.start_loading();
        state.fail(AppError::Transport("connection reset".to_string()));

        assert_eq!(state.data, Some(vec![1, 2, 3]));
        assert!(!state.loading);
        assert!(matches!(
            state.error.as_ref().map(|e| e.cause.as_ref()),
            Some(AppError::Transport(_))
        ));
        assert!(state.error_message().is_some());
    }

    #[test]
    fn test_success_clears_error() {
        let mut state: QueryState<u32> = QueryState::default();
        state.fail(AppError::remote(500, "boom"));
        assert_eq!(state.error_message(), Some("boom"));

        state.resolve(7);
        assert_eq!(state.data, Some(7));
        assert!(state.error.is_none());
    }
}
