use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_CATALOG_DIR, ENV_CONFIG, ENV_DATABASE_PATH, ENV_DATABASE_TABLE, ENV_DEBUG, ENV_HOST,
    ENV_MAX_POINTS, ENV_MAX_SESSIONS, ENV_PORT, ENV_SESSION_IDLE_TIMEOUT_SECS,
};

#[derive(Parser)]
#[command(name = "poremap")]
#[command(version, about = "Porous materials screening explorer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Enable debug mode (logs every generated query)
    #[arg(long, global = true, env = ENV_DEBUG)]
    pub debug: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite structures database
    #[arg(long, short = 'd', global = true, env = ENV_DATABASE_PATH)]
    pub database: Option<PathBuf>,

    /// Table holding one row per structure
    #[arg(long, global = true, env = ENV_DATABASE_TABLE)]
    pub table: Option<String>,

    /// Directory containing columns.json, filters.json and presets.json
    #[arg(long, global = true, env = ENV_CATALOG_DIR)]
    pub catalog_dir: Option<PathBuf>,

    /// Maximum number of points returned per query
    #[arg(long, global = true, env = ENV_MAX_POINTS)]
    pub max_points: Option<usize>,

    /// Idle time in seconds after which a filter session is dropped
    #[arg(long, global = true, env = ENV_SESSION_IDLE_TIMEOUT_SECS)]
    pub session_idle_timeout: Option<u64>,

    /// Maximum number of concurrently live filter sessions
    #[arg(long, global = true, env = ENV_MAX_SESSIONS)]
    pub max_sessions: Option<usize>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Quantity catalog commands
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum CatalogCommands {
    /// Load and validate the catalog, then print a summary
    Check,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub table: Option<String>,
    pub catalog_dir: Option<PathBuf>,
    pub max_points: Option<usize>,
    pub session_idle_timeout: Option<u64>,
    pub max_sessions: Option<usize>,
}

impl From<&Cli> for CliConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            host: cli.host.clone(),
            port: cli.port,
            debug: cli.debug,
            config: cli.config.clone(),
            database: cli.database.clone(),
            table: cli.table.clone(),
            catalog_dir: cli.catalog_dir.clone(),
            max_points: cli.max_points,
            session_idle_timeout: cli.session_idle_timeout,
            max_sessions: cli.max_sessions,
        }
    }
}

/// Parse CLI arguments into configuration and optional command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig::from(&cli);
    (config, cli.command)
}
