use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Local input is missing or malformed; raised before any request is sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The gateway or platform rejected the request
    #[error("Remote error: HTTP {status} - {message}")]
    Remote { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Network unreachable, connection reset or timeout
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        AppError::Remote {
            status,
            message: message.into(),
        }
    }

    /// Single user-displayable string for any failure.
    ///
    /// The raw error is kept by the caller for diagnostics; this text is what a
    /// screen renders next to its retry action.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => format!("Not found: {}", msg),
            AppError::Remote { status, message } if message.is_empty() => {
                format!("Request failed (HTTP {})", status)
            }
            AppError::Remote { message, .. } => message.clone(),
            AppError::Transport(_) => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            AppError::Decode(_) => "Received an unexpected response from the server".to_string(),
            AppError::Storage(_) => "File storage is unavailable".to_string(),
            AppError::Internal(_) => "Something went wrong".to_string(),
        }
    }

    /// Whether the failure originated before the request left the process
    pub fn is_local(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_remote_message() {
        let err = AppError::remote(422, "Database name already taken");
        assert_eq!(err.user_message(), "Database name already taken");

        let err = AppError::remote(502, "");
        assert_eq!(err.user_message(), "Request failed (HTTP 502)");
    }

    #[test]
    fn test_user_message_hides_transport_details() {
        let err = AppError::Transport("tcp connect error: Connection refused".to_string());
        assert!(!err.user_message().contains("tcp"));
        assert!(!err.is_local());
        assert!(AppError::Validation("name is required".to_string()).is_local());
    }
}
