// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Poremap";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "poremap";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".poremap";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "poremap.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "POREMAP_CONFIG";

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "POREMAP_DEBUG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "POREMAP_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "POREMAP_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "POREMAP_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5006;

/// Default request body limit (filter payloads are small)
pub const DEFAULT_BODY_LIMIT: usize = 256 * 1024;

/// Timeout for background tasks during graceful shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Environment Variables - Database
// =============================================================================

/// Environment variable for the SQLite database path
pub const ENV_DATABASE_PATH: &str = "POREMAP_DATABASE_PATH";

/// Environment variable for the structures table name
pub const ENV_DATABASE_TABLE: &str = "POREMAP_DATABASE_TABLE";

// =============================================================================
// Database Defaults
// =============================================================================

/// Default SQLite database file
pub const DEFAULT_DATABASE_PATH: &str = "structures.db";

/// Default table holding one row per structure
pub const DEFAULT_TABLE: &str = "structures";

/// Default column carrying the structure display name
pub const DEFAULT_NAME_COLUMN: &str = "name";

/// Default column carrying the structure file reference
pub const DEFAULT_REFERENCE_COLUMN: &str = "filename";

/// Maximum read connections in the pool
pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// Connection acquire timeout in seconds
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// SQLite busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// Catalog
// =============================================================================

/// Environment variable for the catalog directory
pub const ENV_CATALOG_DIR: &str = "POREMAP_CATALOG_DIR";

/// Default catalog directory
pub const DEFAULT_CATALOG_DIR: &str = "static";

/// Quantity descriptors
pub const CATALOG_COLUMNS_FILE: &str = "columns.json";

/// Ordered list of quantities exposed as filters
pub const CATALOG_FILTERS_FILE: &str = "filters.json";

/// Named plot presets
pub const CATALOG_PRESETS_FILE: &str = "presets.json";

/// Preset every other preset inherits its colour from
pub const DEFAULT_PRESET: &str = "default";

/// Colour projection interpreted as categorical labels
pub const GROUP_COLOR: &str = "group";

// =============================================================================
// Query
// =============================================================================

/// Environment variable for the plotted point cap
pub const ENV_MAX_POINTS: &str = "POREMAP_MAX_POINTS";

/// Maximum number of records returned per query
pub const DEFAULT_MAX_POINTS: usize = 70_000;

// =============================================================================
// Sessions
// =============================================================================

/// Environment variable for session idle timeout
pub const ENV_SESSION_IDLE_TIMEOUT_SECS: &str = "POREMAP_SESSION_IDLE_TIMEOUT_SECS";

/// Environment variable for the maximum number of live sessions
pub const ENV_MAX_SESSIONS: &str = "POREMAP_MAX_SESSIONS";

/// Sessions untouched for this long are dropped
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

/// Upper bound on concurrently live sessions
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Interval between idle-session sweeps
pub const SESSION_SWEEP_INTERVAL_SECS: u64 = 60;
