use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_CATALOG_DIR,
    DEFAULT_DATABASE_PATH, DEFAULT_HOST, DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_POINTS,
    DEFAULT_MAX_SESSIONS, DEFAULT_NAME_COLUMN, DEFAULT_PORT, DEFAULT_REFERENCE_COLUMN,
    DEFAULT_SESSION_IDLE_TIMEOUT_SECS, DEFAULT_TABLE,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Database configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// Path to the SQLite structures database
    pub path: Option<String>,
    /// Table holding one row per structure (default: "structures")
    pub table: Option<String>,
    /// Column carrying the display name (default: "name")
    pub name_column: Option<String>,
    /// Column carrying the detail reference (default: "filename")
    pub reference_column: Option<String>,
    /// Maximum number of pooled read connections (default: 8)
    pub max_connections: Option<u32>,
    /// Connection acquire timeout in seconds (default: 10)
    pub acquire_timeout_secs: Option<u64>,
}

/// Catalog configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CatalogFileConfig {
    pub dir: Option<String>,
}

/// Query configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryFileConfig {
    pub max_points: Option<usize>,
}

/// Session configuration section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SessionsFileConfig {
    pub idle_timeout_secs: Option<u64>,
    pub max_sessions: Option<usize>,
}

/// Raw configuration file contents, every field optional
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub catalog: Option<CatalogFileConfig>,
    pub query: Option<QueryFileConfig>,
    pub sessions: Option<SessionsFileConfig>,
    pub debug: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Names of top-level keys this version does not understand
    fn unknown_fields(&self) -> Vec<String> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        let unknown = self.unknown_fields();
        if !unknown.is_empty() {
            tracing::warn!(
                fields = %unknown.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(database) = other.database {
            let current = self
                .database
                .get_or_insert_with(DatabaseFileConfig::default);
            if database.path.is_some() {
                current.path = database.path;
            }
            if database.table.is_some() {
                current.table = database.table;
            }
            if database.name_column.is_some() {
                current.name_column = database.name_column;
            }
            if database.reference_column.is_some() {
                current.reference_column = database.reference_column;
            }
            if database.max_connections.is_some() {
                current.max_connections = database.max_connections;
            }
            if database.acquire_timeout_secs.is_some() {
                current.acquire_timeout_secs = database.acquire_timeout_secs;
            }
        }

        if let Some(catalog) = other.catalog
            && catalog.dir.is_some()
        {
            tracing::trace!(dir = ?catalog.dir, "Merging catalog.dir");
            self.catalog
                .get_or_insert_with(CatalogFileConfig::default)
                .dir = catalog.dir;
        }

        if let Some(query) = other.query
            && query.max_points.is_some()
        {
            self.query
                .get_or_insert_with(QueryFileConfig::default)
                .max_points = query.max_points;
        }

        if let Some(sessions) = other.sessions {
            let current = self
                .sessions
                .get_or_insert_with(SessionsFileConfig::default);
            if sessions.idle_timeout_secs.is_some() {
                current.idle_timeout_secs = sessions.idle_timeout_secs;
            }
            if sessions.max_sessions.is_some() {
                current.max_sessions = sessions.max_sessions;
            }
        }

        if other.debug.is_some() {
            self.debug = other.debug;
        }
    }
}

// =============================================================================
// Final Config Structs
// =============================================================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub table: String,
    pub name_column: String,
    pub reference_column: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub max_points: usize,
}

#[derive(Debug, Clone)]
pub struct SessionsConfig {
    pub idle_timeout_secs: u64,
    pub max_sessions: usize,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub catalog: CatalogConfig,
    pub query: QueryConfig,
    pub sessions: SessionsConfig,
    pub debug: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.poremap/poremap.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::resolve(cli, file_config);
        config.validate()?;
        Ok(config)
    }

    /// Layer defaults, merged file config and CLI/env overrides
    fn resolve(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();
        let file_catalog = file_config.catalog.unwrap_or_default();
        let file_query = file_config.query.unwrap_or_default();
        let file_sessions = file_config.sessions.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let database_path = cli
            .database
            .as_ref()
            .map(|p| expand_path(&p.to_string_lossy()))
            .or_else(|| file_database.path.as_deref().map(expand_path))
            .unwrap_or_else(|| expand_path(DEFAULT_DATABASE_PATH));

        let database = DatabaseConfig {
            path: database_path,
            table: cli
                .table
                .clone()
                .or(file_database.table)
                .unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            name_column: file_database
                .name_column
                .unwrap_or_else(|| DEFAULT_NAME_COLUMN.to_string()),
            reference_column: file_database
                .reference_column
                .unwrap_or_else(|| DEFAULT_REFERENCE_COLUMN.to_string()),
            max_connections: file_database
                .max_connections
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            acquire_timeout_secs: file_database
                .acquire_timeout_secs
                .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        };

        let catalog = CatalogConfig {
            dir: cli
                .catalog_dir
                .as_ref()
                .map(|p| expand_path(&p.to_string_lossy()))
                .or_else(|| file_catalog.dir.as_deref().map(expand_path))
                .unwrap_or_else(|| expand_path(DEFAULT_CATALOG_DIR)),
        };

        let query = QueryConfig {
            max_points: cli
                .max_points
                .or(file_query.max_points)
                .unwrap_or(DEFAULT_MAX_POINTS),
        };

        let sessions = SessionsConfig {
            idle_timeout_secs: cli
                .session_idle_timeout
                .or(file_sessions.idle_timeout_secs)
                .unwrap_or(DEFAULT_SESSION_IDLE_TIMEOUT_SECS),
            max_sessions: cli
                .max_sessions
                .or(file_sessions.max_sessions)
                .unwrap_or(DEFAULT_MAX_SESSIONS),
        };

        // debug: CLI/env flag takes precedence, then file config, default false
        let debug = cli.debug || file_config.debug.unwrap_or(false);

        Self {
            server,
            database,
            catalog,
            query,
            sessions,
            debug,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.query.max_points == 0 {
            anyhow::bail!("query.max_points must be at least 1");
        }
        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }
        if self.sessions.max_sessions == 0 {
            anyhow::bail!("sessions.max_sessions must be at least 1");
        }
        if self.database.table.trim().is_empty() {
            anyhow::bail!("database.table must not be empty");
        }
        if self.database.name_column == self.database.reference_column {
            tracing::warn!(
                column = %self.database.name_column,
                "Name and reference columns are identical"
            );
        }
        if is_all_interfaces(&self.server.host) {
            tracing::warn!(
                host = %self.server.host,
                "Server binds to all interfaces; the API is unauthenticated"
            );
        }
        Ok(())
    }
}

/// Get the profile config path (~/.poremap/poremap.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "0.0.0.0", "port": 8080 },
            "database": { "path": "/data/tc.db", "table": "frameworks" },
            "catalog": { "dir": "/etc/poremap" },
            "query": { "max_points": 5000 },
            "sessions": { "idle_timeout_secs": 60, "max_sessions": 10 },
            "debug": true
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.server.as_ref().unwrap().host,
            Some("0.0.0.0".to_string())
        );
        assert_eq!(config.server.as_ref().unwrap().port, Some(8080));
        assert_eq!(
            config.database.as_ref().unwrap().table,
            Some("frameworks".to_string())
        );
        assert_eq!(config.query.as_ref().unwrap().max_points, Some(5000));
        assert_eq!(config.sessions.as_ref().unwrap().max_sessions, Some(10));
        assert_eq!(config.debug, Some(true));
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();

        assert!(config.server.is_none());
        assert!(config.database.is_none());
        assert!(config.unknown_fields().is_empty());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "host": "localhost" }, "max_pionts": 123 }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.unknown_fields(), vec!["max_pionts".to_string()]);
        assert_eq!(config.extra.get("max_pionts").unwrap(), 123);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{
                "server": { "host": "127.0.0.1", "port": 5006 },
                "database": { "path": "a.db", "table": "structures" },
                "query": { "max_points": 100 }
            }"#,
        )
        .unwrap();
        let overlay: FileConfig = serde_json::from_str(
            r#"{
                "server": { "port": 9000 },
                "database": { "path": "b.db" },
                "sessions": { "max_sessions": 3 }
            }"#,
        )
        .unwrap();

        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host, Some("127.0.0.1".to_string()));
        assert_eq!(server.port, Some(9000));
        let database = base.database.unwrap();
        assert_eq!(database.path, Some("b.db".to_string()));
        assert_eq!(database.table, Some("structures".to_string()));
        assert_eq!(base.query.unwrap().max_points, Some(100));
        assert_eq!(base.sessions.unwrap().max_sessions, Some(3));
    }

    #[test]
    fn test_resolve_defaults() {
        let config = AppConfig::resolve(&CliConfig::default(), FileConfig::default());

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.database.table, DEFAULT_TABLE);
        assert_eq!(config.database.name_column, "name");
        assert_eq!(config.database.reference_column, "filename");
        assert_eq!(config.query.max_points, 70_000);
        assert!(config.database.path.is_absolute());
        assert!(config.catalog.dir.ends_with(DEFAULT_CATALOG_DIR));
        assert!(!config.debug);
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{
                "server": { "port": 8000 },
                "query": { "max_points": 100 },
                "database": { "path": "/from/file.db", "table": "file_table" }
            }"#,
        )
        .unwrap();
        let cli = CliConfig {
            port: Some(9000),
            max_points: Some(5),
            database: Some(PathBuf::from("/from/cli.db")),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, file);

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.query.max_points, 5);
        assert_eq!(config.database.path, PathBuf::from("/from/cli.db"));
        assert_eq!(config.database.table, "file_table");
    }

    #[test]
    fn test_resolve_debug_from_file() {
        let file: FileConfig = serde_json::from_str(r#"{ "debug": true }"#).unwrap();
        assert!(AppConfig::resolve(&CliConfig::default(), file).debug);
    }

    #[test]
    fn test_validate_rejects_zero_max_points() {
        let cli = CliConfig {
            max_points: Some(0),
            ..Default::default()
        };
        let config = AppConfig::resolve(&cli, FileConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_cli_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poremap.json");
        fs::write(
            &path,
            r#"{ "database": { "table": "zeolites" }, "query": { "max_points": 42 } }"#,
        )
        .unwrap();

        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();

        assert_eq!(config.database.table, "zeolites");
        assert_eq!(config.query.max_points, 42);
    }

    #[test]
    fn test_load_missing_config_path_fails() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/definitely/not/here/poremap.json")),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_invalid_json_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let err = AppConfig::load(&cli).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(!is_all_interfaces("127.0.0.1"));
    }
}
