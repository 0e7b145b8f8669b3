//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::cli::{self, CatalogCommands, CliConfig, Commands};
use crate::core::config::{AppConfig, DatabaseConfig};
use crate::core::constants::{APP_NAME, APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::{SqliteService, StructureStore};
use crate::domain::{Catalog, QueryExecutor, SessionStore, load_catalog};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub database: Arc<SqliteService>,
    pub executor: Arc<QueryExecutor>,
    pub sessions: Arc<SessionStore>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Catalog { command }) => {
                return Self::handle_catalog_command(&cli_config, command);
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let catalog = load_catalog(&config.catalog.dir).with_context(|| {
            format!("Failed to load catalog from {}", config.catalog.dir.display())
        })?;

        let database = Arc::new(SqliteService::init(&config.database).await.with_context(
            || format!("Failed to open database {}", config.database.path.display()),
        )?);
        verify_schema(&catalog, &database, &config.database)?;
        tracing::debug!(
            backend = database.backend_name(),
            table = database.table(),
            "Structure store initialized"
        );

        let store: Arc<dyn StructureStore> = database.clone();
        let executor = Arc::new(
            QueryExecutor::new(store, catalog.clone())
                .with_max_points(config.query.max_points)
                .with_identity_columns(
                    &config.database.name_column,
                    &config.database.reference_column,
                ),
        );
        let sessions = Arc::new(SessionStore::new(catalog, &config.sessions));
        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            database,
            executor,
            sessions,
        })
    }

    fn handle_catalog_command(cli: &CliConfig, cmd: CatalogCommands) -> Result<()> {
        match cmd {
            CatalogCommands::Check => {
                let config = AppConfig::load(cli)?;
                let catalog = load_catalog(&config.catalog.dir).with_context(|| {
                    format!("Invalid catalog in {}", config.catalog.dir.display())
                })?;
                Self::print_catalog_summary(&catalog);
                Ok(())
            }
        }
    }

    fn print_catalog_summary(catalog: &Catalog) {
        println!("Catalog OK");
        println!("  Quantities: {}", catalog.quantities().len());
        for quantity in catalog.quantities() {
            let kind = if quantity.is_float() {
                "float"
            } else {
                "categorical"
            };
            println!("    {:<28} {}", quantity.name, kind);
        }
        println!("  Filters:    {}", catalog.filters().join(", "));
        let presets: Vec<&str> = catalog.presets().iter().map(|p| p.name.as_str()).collect();
        println!("  Presets:    {}", presets.join(", "));
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        tracing::info!(
            host = %app.config.server.host,
            port = app.config.server.port,
            database = %app.config.database.path.display(),
            max_points = app.executor.max_points(),
            "{} starting",
            APP_NAME
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self) {
        self.shutdown
            .register(self.sessions.start_sweep_task(self.shutdown.subscribe()))
            .await;

        tracing::debug!("Background tasks started");
    }
}

/// Every catalog quantity and both identity columns must exist in the table
fn verify_schema(catalog: &Catalog, database: &SqliteService, config: &DatabaseConfig) -> Result<()> {
    let names = catalog
        .quantities()
        .iter()
        .map(|q| q.name.as_str())
        .chain([config.name_column.as_str(), config.reference_column.as_str()]);
    let missing = database.missing_columns(names);
    if !missing.is_empty() {
        anyhow::bail!(
            "Table '{}' has no column(s): {}",
            database.table(),
            missing.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::data::sqlite::testing;
    use crate::domain::Quantity;
    use crate::domain::catalog::testing::{catalog, preset};

    fn database_config(name_column: &str) -> DatabaseConfig {
        DatabaseConfig {
            path: PathBuf::from("structures.db"),
            table: "structures".into(),
            name_column: name_column.into(),
            reference_column: "filename".into(),
            max_connections: 1,
            acquire_timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_verify_schema_accepts_matching_table() {
        let database = testing::service(&[]).await;
        verify_schema(&catalog(), &database, &database_config("name")).unwrap();
    }

    #[tokio::test]
    async fn test_verify_schema_rejects_missing_columns() {
        let database = testing::service(&[]).await;
        let other = Catalog::new(
            vec![
                Quantity::float("pore_diameter", 0.0, 50.0),
                Quantity::float("cell_volume", 0.0, 1e5),
            ],
            vec![],
            vec![preset("default", "pore_diameter", "cell_volume", "pore_diameter")],
        )
        .unwrap();

        let err = verify_schema(&other, &database, &database_config("label"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("cell_volume"));
        assert!(err.contains("label"));
        assert!(!err.contains("pore_diameter"));
    }
}
