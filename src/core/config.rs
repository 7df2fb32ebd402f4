use std::env;
use std::time::Duration;

/// Process-wide configuration, resolved once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub gateway: GatewayConfig,
    pub hooks: HooksConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Cloud region shared by the storage bucket and the managed platform
    pub region: String,
    /// Identity used by the command-line front end when `--user` is not given
    pub default_user_id: Option<String>,
}

/// Settings for the REST gateway that performs ingestion and usage accounting
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    /// Optional bearer token attached to every gateway request
    pub api_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HooksConfig {
    pub poll_interval: Duration,
}

/// S3-compatible bucket holding uploaded document files
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket name
    pub bucket: String,
    /// Region name (copied from the app section)
    pub region: String,
    /// Custom endpoint for S3-compatible stores such as MinIO; AWS when absent
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let app = AppConfig::from_env()?;
        let storage = StorageConfig::from_env(&app.region)?;

        Ok(Config {
            gateway: GatewayConfig::from_env()?,
            hooks: HooksConfig::from_env()?,
            app,
            storage,
        })
    }
}

impl AppConfig {
    const DEFAULT_REGION: &'static str = "us-east-1";

    pub fn from_env() -> Result<Self, String> {
        let region = env::var("AWS_REGION")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_REGION.to_string());

        let default_user_id = env::var("VDB_USER_ID").ok().filter(|s| !s.is_empty());

        Ok(Self {
            region,
            default_user_id,
        })
    }
}

impl GatewayConfig {
    const DEFAULT_BASE_URL: &'static str = "http://localhost:8000";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(format!(
                "API_BASE_URL must be an http(s) URL, got '{}'",
                base_url
            ));
        }

        let request_timeout_secs = env::var("API_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "API_REQUEST_TIMEOUT_SECS must be a valid number".to_string())?;

        // Only use the token if it is non-empty
        let api_token = env::var("API_TOKEN").ok().filter(|s| !s.is_empty());

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            api_token,
        })
    }
}

impl HooksConfig {
    const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

    pub fn from_env() -> Result<Self, String> {
        let poll_interval_secs = env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_POLL_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "POLL_INTERVAL_SECS must be a valid number".to_string())?;

        if poll_interval_secs == 0 {
            return Err("POLL_INTERVAL_SECS must be greater than zero".to_string());
        }

        Ok(Self {
            poll_interval: Duration::from_secs(poll_interval_secs),
        })
    }
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(Self::DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl StorageConfig {
    pub fn from_env(region: &str) -> Result<Self, String> {
        let bucket =
            env::var("S3_BUCKET").unwrap_or_else(|_| "vectordb-builder-uploads".to_string());
        if bucket.trim().is_empty() {
            return Err("S3_BUCKET must not be empty".to_string());
        }

        let endpoint = env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty());
        let access_key = env::var("S3_ACCESS_KEY").ok().filter(|s| !s.is_empty());
        let secret_key = env::var("S3_SECRET_KEY").ok().filter(|s| !s.is_empty());

        Ok(Self {
            bucket,
            region: region.to_string(),
            endpoint,
            access_key,
            secret_key,
        })
    }
}
