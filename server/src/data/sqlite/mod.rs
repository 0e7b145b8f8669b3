//! SQLite structure store
//!
//! Opens the simulation results database read-only and serves structure
//! queries from it. The service never writes: schema and contents are owned
//! by whatever pipeline produced the database file.

mod repository_impl;

pub use sqlx::SqlitePool;

use std::collections::HashSet;
use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::log::LevelFilter;

use crate::core::config::DatabaseConfig;
use crate::core::constants::SQLITE_BUSY_TIMEOUT_SECS;
use crate::data::error::DataError;

const BACKEND: &str = "sqlite";

/// SQLite database service
///
/// Handles connection pooling for the structures table.
/// Should be created once at server startup and shared across all modules.
pub struct SqliteService {
    pool: SqlitePool,
    table: String,
    name_column: String,
    /// Columns of `table`, read once at open time
    columns: HashSet<String>,
}

impl SqliteService {
    /// Initialize the database service
    ///
    /// The database file must already exist; it is opened read-only so a
    /// misconfigured path cannot create an empty database.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DataError> {
        if !config.path.exists() {
            return Err(DataError::backend_unavailable(
                BACKEND,
                format!("database file not found: {}", config.path.display()),
            ));
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .read_only(true)
            .create_if_missing(false)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .pragma("temp_store", "MEMORY")
            .log_statements(LevelFilter::Trace);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        let service = Self::from_pool(pool, &config.table, &config.name_column).await?;
        tracing::debug!(
            path = %config.path.display(),
            table = %config.table,
            columns = service.columns.len(),
            "SqliteService initialized"
        );
        Ok(service)
    }

    /// Create a SqliteService from an existing pool
    ///
    /// Fails when `table` does not exist in the database.
    pub async fn from_pool(
        pool: SqlitePool,
        table: &str,
        name_column: &str,
    ) -> Result<Self, DataError> {
        let columns: HashSet<String> =
            sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?)")
                .bind(table)
                .fetch_all(&pool)
                .await?
                .into_iter()
                .collect();
        if columns.is_empty() {
            return Err(DataError::backend_unavailable(
                BACKEND,
                format!("table not found: {}", table),
            ));
        }

        Ok(Self {
            pool,
            table: table.to_string(),
            name_column: name_column.to_string(),
            columns,
        })
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// Names from `names` that are not columns of the table, in input order
    pub fn missing_columns<'a, I>(&self, names: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter(|name| !self.has_column(name))
            .collect()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }
}

/// In-memory structures database shared by tests across modules
#[cfg(test)]
pub(crate) mod testing {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::{SqlitePool, SqliteService};

    pub const SCHEMA: &str = r#"
        CREATE TABLE structures (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            filename TEXT NOT NULL,
            "group" TEXT NOT NULL,
            pore_diameter REAL,
            pore_diameter_units TEXT,
            void_fraction REAL,
            surface_area REAL,
            density REAL,
            henry_coefficient REAL,
            deliverable_capacity REAL
        )
    "#;

    /// A seeded structure row
    pub struct Seed<'a> {
        pub name: &'a str,
        pub group: &'a str,
        pub pore_diameter: f64,
        pub void_fraction: f64,
        pub deliverable_capacity: f64,
    }

    pub async fn memory_pool() -> SqlitePool {
        // One connection: every in-memory connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(SCHEMA).execute(&pool).await.unwrap();
        pool
    }

    pub async fn insert(pool: &SqlitePool, seeds: &[Seed<'_>]) {
        for seed in seeds {
            sqlx::query(
                r#"
                INSERT INTO structures
                    (name, filename, "group", pore_diameter, pore_diameter_units,
                     void_fraction, surface_area, density, henry_coefficient,
                     deliverable_capacity)
                VALUES (?, ?, ?, ?, 'A', ?, 1000.0, 1.2, 0.00001, ?)
                "#,
            )
            .bind(seed.name)
            .bind(format!("{}.cif", seed.name))
            .bind(seed.group)
            .bind(seed.pore_diameter)
            .bind(seed.void_fraction)
            .bind(seed.deliverable_capacity)
            .execute(pool)
            .await
            .unwrap();
        }
    }

    /// Insert `count` generated MOFs named `{prefix}-{i}` with pore diameters
    /// cycling through `base..=base + 5`
    pub async fn insert_generated(pool: &SqlitePool, prefix: &str, count: u64, base: f64) {
        sqlx::query(
            r#"
            INSERT INTO structures
                (name, filename, "group", pore_diameter, pore_diameter_units,
                 void_fraction, surface_area, density, henry_coefficient,
                 deliverable_capacity)
            WITH RECURSIVE seq(i) AS (
                SELECT 1 UNION ALL SELECT i + 1 FROM seq WHERE i < ?
            )
            SELECT ? || '-' || i, ? || '-' || i || '.cif', 'MOFs', ? + (i % 6), 'A',
                   0.5, 1000.0, 1.2, 0.00001, 100.0
            FROM seq
            "#,
        )
        .bind(count as i64)
        .bind(prefix)
        .bind(prefix)
        .bind(base)
        .execute(pool)
        .await
        .unwrap();
    }

    pub async fn service(seeds: &[Seed<'_>]) -> SqliteService {
        let pool = memory_pool().await;
        insert(&pool, seeds).await;
        SqliteService::from_pool(pool, "structures", "name")
            .await
            .unwrap()
    }

    pub fn sample_seeds() -> Vec<Seed<'static>> {
        vec![
            Seed {
                name: "TSC",
                group: "zeolites",
                pore_diameter: 16.0,
                void_fraction: 0.45,
                deliverable_capacity: 120.0,
            },
            Seed {
                name: "MFI",
                group: "zeolites",
                pore_diameter: 6.4,
                void_fraction: 0.29,
                deliverable_capacity: 80.0,
            },
            Seed {
                name: "ZIF-8",
                group: "MOFs",
                pore_diameter: 11.4,
                void_fraction: 0.47,
                deliverable_capacity: 150.0,
            },
            Seed {
                name: "Cu-BTC",
                group: "MOFs",
                pore_diameter: 13.2,
                void_fraction: 0.71,
                deliverable_capacity: 190.0,
            },
            Seed {
                name: "16411C2",
                group: "COFs",
                pore_diameter: 8.9,
                void_fraction: 0.83,
                deliverable_capacity: 170.0,
            },
        ]
    }
}
