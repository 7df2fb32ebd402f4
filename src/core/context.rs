use crate::core::error::{AppError, Result};

/// Identity of the caller, passed explicitly into every data-access operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestContext {
    user_id: String,
}

impl RequestContext {
    /// Build a context for a signed-in user.
    ///
    /// Fails with `Validation` for an empty or blank id so that no request can be
    /// issued on behalf of nobody.
    pub fn new(user_id: impl Into<String>) -> Result<Self> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(AppError::Validation("user id is required".to_string()));
        }
        Ok(Self { user_id })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Whether `owner` refers to this caller
    pub fn owns(&self, owner: Option<&str>) -> bool {
        owner == Some(self.user_id.as_str())
    }
}
