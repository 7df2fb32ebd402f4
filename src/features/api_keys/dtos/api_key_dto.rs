use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::shared::validation::validate_not_blank;

/// Input for creating an API key on the platform
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyDto {
    #[validate(custom(function = "validate_not_blank", message = "databaseId is required"))]
    pub database_id: String,

    #[validate(length(max = 128, message = "Name must not exceed 128 characters"))]
    pub name: Option<String>,

    /// Defaults to 30 days
    #[validate(range(min = 1, max = 3650, message = "Expiry must be 1-3650 days"))]
    pub expires_in_days: Option<u32>,

    /// Defaults to `["query"]`
    pub permissions: Option<Vec<String>>,

    #[validate(range(min = 1, message = "Rate limit must be positive"))]
    pub rate_limit: Option<i64>,
}

/// Response of `GET /{id}/api-key` and `POST /{id}/generate-key`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyResponseDto {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// One key of `GET /user/{user_id}/api-keys`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserApiKeyDto {
    pub database_id: String,
    pub database_name: String,
    pub key: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserApiKeysResponseDto {
    #[serde(default)]
    pub keys: Vec<UserApiKeyDto>,
}

/// `abcdefghij...qrstuvwxyz` form of a key for tables and logs
pub fn mask_key(key: &str) -> String {
    const VISIBLE: usize = 10;

    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= VISIBLE * 2 {
        return key.to_string();
    }
    let head: String = chars[..VISIBLE].iter().collect();
    let tail: String = chars[chars.len() - VISIBLE..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(
            mask_key("vdb-0123456789abcdefghijklmnop"),
            "vdb-012345...ghijklmnop"
        );
        assert_eq!(mask_key("short-key"), "short-key");
    }
}
