//! HTTP client for the REST gateway (`/api/v1/database/...`)
//!
//! Every request goes through [`GatewayClient::send`], which maps transport
//! failures, non-2xx responses and malformed bodies onto [`AppError`].

use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::core::config::GatewayConfig;
use crate::core::error::{AppError, Result};

/// Prefix shared by all database endpoints
pub const DATABASE_API_PREFIX: &str = "/api/v1/database";

/// Client for the REST gateway
pub struct GatewayClient {
    base_url: String,
    api_token: Option<String>,
    http_client: Client,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path below the database prefix
    pub fn database_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, DATABASE_API_PREFIX, path)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.database_url(path);
        debug!("GET {}", url);
        self.send(self.http_client.get(&url).query(query), &url)
            .await
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.database_url(path);
        debug!("POST {}", url);
        self.send(self.http_client.post(&url).query(query), &url)
            .await
    }

    pub async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T> {
        let url = self.database_url(path);
        debug!("POST (multipart) {}", url);
        self.send(self.http_client.post(&url).multipart(form), &url)
            .await
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.database_url(path);
        debug!("DELETE {}", url);
        self.send(self.http_client.delete(&url), &url).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &str) -> Result<T> {
        let request = match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            error!("Gateway request to {} failed: {}", url, e);
            if e.is_timeout() {
                AppError::Transport(format!("Request to {} timed out", url))
            } else {
                AppError::Transport(format!("Failed to reach gateway: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Gateway error: HTTP {} - {}", status, body);
            return Err(error_from_response(status.as_u16(), &body));
        }

        response.json::<T>().await.map_err(|e| {
            error!("Failed to parse gateway response from {}: {}", url, e);
            AppError::Decode(format!("Failed to parse gateway response: {}", e))
        })
    }
}

/// Build the error for a non-2xx gateway response.
///
/// The gateway reports failures as `{"detail": "..."}`, as a list of
/// `{"msg": "..."}` validation items, or as `{"message": "..."}`; anything else is
/// passed through as raw text.
pub fn error_from_response(status: u16, body: &str) -> AppError {
    let message = extract_message(body).unwrap_or_else(|| body.trim().to_string());

    if status == 404 {
        let message = if message.is_empty() {
            "resource does not exist".to_string()
        } else {
            message
        };
        return AppError::NotFound(message);
    }

    AppError::remote(status, message)
}

fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    match value.get("detail") {
        Some(Value::String(detail)) => return Some(detail.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return Some(messages.join("; "));
            }
        }
        _ => {}
    }

    value
        .get("message")
        .and_then(Value::as_str)
        .map(String::from)
}
