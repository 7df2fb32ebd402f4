/// Status stamped on databases created directly on the platform
pub const DATABASE_STATUS_ACTIVE: &str = "active";

/// Status reported by the gateway while a database is being ingested
pub const DATABASE_STATUS_PROCESSING: &str = "processing";

/// Status stamped on newly created API keys
pub const API_KEY_STATUS_ACTIVE: &str = "active";

/// Days until a newly created API key expires when no value is given
pub const DEFAULT_API_KEY_EXPIRY_DAYS: u32 = 30;

/// Requests per minute granted to a newly created API key
pub const DEFAULT_API_KEY_RATE_LIMIT: i64 = 60;

/// Permission granted to a newly created API key
pub const DEFAULT_API_KEY_PERMISSION: &str = "query";

// =============================================================================
// USAGE DASHBOARD
// =============================================================================

/// Number of most recent history events shown as recent activity
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Number of most recent history events counted as "recent queries"
pub const RECENT_QUERY_WINDOW: usize = 7;

/// Visible prefix length of an API key in the activity log
pub const API_KEY_PREVIEW_LEN: usize = 8;

/// Name shown for usage rows whose database is not in the fetched list
pub const UNKNOWN_DATABASE_NAME: &str = "Unknown Database";
