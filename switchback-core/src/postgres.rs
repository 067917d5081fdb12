//! PostgreSQL runner backed by `sqlx::migrate`.
//!
//! The migration library reads the `<VERSION>_<NAME>.up.sql` / `.down.sql`
//! files, applies and reverts them, and owns the `_sqlx_migrations` version
//! table. This adapter only answers the questions the library leaves open
//! (is anything pending, is anything applied) and implements force and drop
//! on top of the library's lock and table.

use std::collections::HashSet;
use std::future::Future;

use sqlx::migrate::{Migrate, Migrator};
use sqlx::postgres::{PgConnection, PgPool};
use sqlx::Connection;
use tokio::runtime::Runtime;

use crate::config::SwitchbackConfig;
use crate::db::{self, quote_ident};
use crate::error::{Result, SwitchbackError};
use crate::runner::{Runner, VersionMarker};

/// Target passed to `Migrator::undo` so every version is reverted.
const BEFORE_FIRST_VERSION: i64 = -1;

/// Execution time recorded for markers written by a force.
const FORCED_EXECUTION_TIME: i64 = -1;

/// What the version table currently records.
#[derive(Debug, Default)]
struct AppliedState {
    /// Versions recorded as successfully applied.
    applied: HashSet<i64>,
    /// A version that failed part-way, if any.
    dirty: Option<i64>,
}

/// A marker a force writes for one up-migration.
struct ForcedMarker {
    version: i64,
    description: String,
    checksum: Vec<u8>,
}

/// Blocking [`Runner`] over a PostgreSQL database.
///
/// Every call runs to completion on a private single-threaded runtime, so
/// callers never deal with async code.
pub struct PostgresRunner {
    runtime: Runtime,
    pool: PgPool,
    migrator: Migrator,
    schema: String,
    closed: bool,
}

impl PostgresRunner {
    /// Connect to the configured database and load the migration directory.
    ///
    /// The managed schema is created if it does not exist yet.
    pub fn open(config: &SwitchbackConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let options = config.connection_options()?;
        let location = config.migrations.location.clone();
        let schema = config.migrations.schema.clone();

        log::info!(
            "Opening migration runner; location={}, schema={}",
            location.display(),
            schema
        );

        let (pool, migrator) = runtime.block_on(async {
            let migrator = Migrator::new(location).await?;
            let pool = db::connect_with_config(
                options,
                config.database.connect_retries,
                config.database.connect_timeout_secs,
            )
            .await?;
            let create = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(&schema));
            sqlx::query(&create).execute(&pool).await?;
            Ok::<_, SwitchbackError>((pool, migrator))
        })?;

        log::debug!(
            "Migration source loaded; migrations={}",
            migrator.iter().count()
        );

        Ok(Self {
            runtime,
            pool,
            migrator,
            schema,
            closed: false,
        })
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Up-migrations known to the migration source, in version order.
    fn up_migrations(&self) -> impl Iterator<Item = &sqlx::migrate::Migration> {
        self.migrator
            .iter()
            .filter(|m| !m.migration_type.is_down_migration())
    }

    fn has_down_migration(&self, version: i64) -> bool {
        self.migrator
            .iter()
            .any(|m| m.version == version && m.migration_type.is_down_migration())
    }
}

impl Runner for PostgresRunner {
    fn up(&mut self) -> Result<()> {
        let before = self.block_on(applied_state(&self.pool))?;
        let pending = self
            .up_migrations()
            .filter(|m| !before.applied.contains(&m.version))
            .count();

        // run also checks applied versions against the source
        log::info!("Applying pending migrations; pending={}", pending);
        self.block_on(self.migrator.run(&self.pool))?;

        let after = self.block_on(applied_state(&self.pool))?;
        if after.applied == before.applied {
            return Err(SwitchbackError::NoChange);
        }
        Ok(())
    }

    fn down(&mut self) -> Result<()> {
        let state = self.block_on(applied_state(&self.pool))?;
        if state.applied.is_empty() && state.dirty.is_none() {
            return Err(SwitchbackError::NoChange);
        }

        let mut applied: Vec<i64> = state.applied.iter().copied().collect();
        applied.sort_unstable_by(|a, b| b.cmp(a));
        if let Some(version) = applied.iter().copied().find(|v| !self.has_down_migration(*v)) {
            return Err(SwitchbackError::Irreversible { version });
        }

        log::info!("Reverting applied migrations; applied={}", applied.len());
        self.block_on(self.migrator.undo(&self.pool, BEFORE_FIRST_VERSION))?;
        Ok(())
    }

    fn drop_all(&mut self) -> Result<()> {
        log::info!("Dropping all tables; schema={}", self.schema);
        self.block_on(async {
            let mut conn = self.pool.acquire().await?;
            conn.lock().await?;

            let result = drop_tables(&mut conn, &self.schema).await;

            // Always release the lock
            if let Err(e) = conn.unlock().await {
                log::warn!("Failed to release migration lock: {}", e);
            }
            result
        })
    }

    fn force(&mut self, version: i64) -> Result<()> {
        if version > 0 && !self.up_migrations().any(|m| m.version == version) {
            return Err(SwitchbackError::UnknownVersion { version });
        }

        let markers: Vec<ForcedMarker> = self
            .up_migrations()
            .filter(|m| m.version <= version)
            .map(|m| ForcedMarker {
                version: m.version,
                description: m.description.to_string(),
                checksum: m.checksum.to_vec(),
            })
            .collect();

        log::info!(
            "Forcing version marker; version={}, markers={}",
            version,
            markers.len()
        );

        self.block_on(async {
            let mut conn = self.pool.acquire().await?;
            conn.ensure_migrations_table().await?;
            conn.lock().await?;

            let result = write_markers(&mut conn, version, &markers).await;

            if let Err(e) = conn.unlock().await {
                log::warn!("Failed to release migration lock: {}", e);
            }
            result
        })
    }

    fn version(&mut self) -> Result<VersionMarker> {
        let state = self.block_on(applied_state(&self.pool))?;
        if let Some(version) = state.dirty {
            return Ok(VersionMarker {
                version,
                dirty: true,
            });
        }
        state
            .applied
            .iter()
            .copied()
            .max()
            .map(|version| VersionMarker {
                version,
                dirty: false,
            })
            .ok_or(SwitchbackError::NilVersion)
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.block_on(self.pool.close());
            self.closed = true;
            log::debug!("Migration runner closed");
        }
        Ok(())
    }
}

impl Drop for PostgresRunner {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Read the version table. A missing table reads as empty and is not created.
async fn applied_state(pool: &PgPool) -> Result<AppliedState> {
    let mut conn = pool.acquire().await?;
    if !version_table_exists(&mut conn).await? {
        return Ok(AppliedState::default());
    }

    let dirty = conn.dirty_version().await?;
    let applied = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| m.version)
        .filter(|v| Some(*v) != dirty)
        .collect();

    Ok(AppliedState { applied, dirty })
}

/// Whether `_sqlx_migrations` is visible on the connection's `search_path`.
async fn version_table_exists(conn: &mut PgConnection) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(&mut *conn)
        .await?;
    Ok(exists)
}

/// Replace the version table's contents so that `version` is the latest marker.
///
/// Markers above `version` and failed markers are removed; every known
/// up-migration at or below `version` is recorded as applied.
async fn write_markers(
    conn: &mut PgConnection,
    version: i64,
    markers: &[ForcedMarker],
) -> Result<()> {
    let mut tx = conn.begin().await?;

    sqlx::query("DELETE FROM _sqlx_migrations WHERE version > $1 OR success = FALSE")
        .bind(version)
        .execute(&mut *tx)
        .await?;

    for marker in markers {
        sqlx::query(
            "INSERT INTO _sqlx_migrations \
             (version, description, success, checksum, execution_time) \
             VALUES ($1, $2, TRUE, $3, $4) \
             ON CONFLICT (version) DO NOTHING",
        )
        .bind(marker.version)
        .bind(&marker.description)
        .bind(&marker.checksum)
        .bind(FORCED_EXECUTION_TIME)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Drop every table in `schema`, including the version table.
async fn drop_tables(conn: &mut PgConnection, schema: &str) -> Result<()> {
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT tablename::text FROM pg_catalog.pg_tables WHERE schemaname = $1",
    )
    .bind(schema)
    .fetch_all(&mut *conn)
    .await?;

    if tables.is_empty() {
        log::info!("No tables to drop; schema={}", schema);
        return Ok(());
    }

    let qualified: Vec<String> = tables
        .iter()
        .map(|t| format!("{}.{}", quote_ident(schema), quote_ident(t)))
        .collect();
    let sql = format!("DROP TABLE IF EXISTS {} CASCADE", qualified.join(", "));
    sqlx::query(&sql).execute(&mut *conn).await?;

    log::info!("Dropped tables; schema={}, count={}", schema, tables.len());
    Ok(())
}
