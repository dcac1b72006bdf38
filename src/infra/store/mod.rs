//! Generic relational store over SQLite or PostgreSQL.
//!
//! [`Store`] is an explicitly constructed handle: build it once with
//! [`Store::connect`] at startup, share it by cloning (the pool is reference
//! counted) and drain it with [`Store::close`] on shutdown. All operations are
//! generic over [`Entity`] and driven by the entity's descriptor.

pub mod postgres;
pub mod sql;
pub mod sqlite;

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::entity::{Entity, Filter, Patch};
use crate::domain::models::invitation::{Invitation, InvitationStatus};
use crate::domain::models::membership::Membership;
use crate::error::AppError;
use sql::{Dialect, Statement};

#[derive(Clone, Debug)]
enum Backend {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

#[derive(Clone, Debug)]
pub struct Store {
    backend: Backend,
}

/// Maps driver errors onto domain errors.
///
/// Unique violations carry the violated constraint (Postgres) or the
/// offending columns (SQLite) so callers can tell them apart.
pub(crate) fn translate(err: sqlx::Error) -> AppError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let target = match db_err.constraint() {
                Some(name) => name.to_string(),
                None => db_err
                    .message()
                    .trim_start_matches("UNIQUE constraint failed: ")
                    .to_string(),
            };
            return AppError::UniqueViolation(target);
        }
        if db_err.is_foreign_key_violation() {
            return AppError::Conflict("Referenced record does not exist or is still referenced".to_string());
        }
        if db_err.is_check_violation() {
            return AppError::Validation(format!("Value rejected by constraint: {}", db_err.message()));
        }
    }
    AppError::Database(err)
}

impl Store {
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let database_url = &config.database_url;

        if config.is_postgres() {
            info!("Initializing PostgreSQL connection...");

            let opts = PgConnectOptions::from_str(database_url)?
                .log_statements(LevelFilter::Debug)
                .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect_with(opts)
                .await?;

            sqlx::migrate!("./migrations/postgres").run(&pool).await?;
            info!("PostgreSQL migrations applied");

            Ok(Self::from_postgres(pool))
        } else {
            info!("Initializing SQLite connection with WAL Mode...");

            let opts = SqliteConnectOptions::from_str(database_url)?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5))
                .foreign_keys(true)
                .log_statements(LevelFilter::Debug)
                .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

            let pool = SqlitePoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect_with(opts)
                .await?;

            sqlx::migrate!("./migrations/sqlite").run(&pool).await?;
            info!("SQLite migrations applied");

            Ok(Self::from_sqlite(pool))
        }
    }

    pub fn from_sqlite(pool: SqlitePool) -> Self {
        Self { backend: Backend::Sqlite(pool) }
    }

    pub fn from_postgres(pool: PgPool) -> Self {
        Self { backend: Backend::Postgres(pool) }
    }

    pub async fn close(&self) {
        match &self.backend {
            Backend::Sqlite(pool) => pool.close().await,
            Backend::Postgres(pool) => pool.close().await,
        }
        info!("Store connection pool closed");
    }

    fn dialect(&self) -> Dialect {
        match self.backend {
            Backend::Sqlite(_) => Dialect::Sqlite,
            Backend::Postgres(_) => Dialect::Postgres,
        }
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        match &self.backend {
            Backend::Sqlite(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()).map_err(translate),
            Backend::Postgres(pool) => sqlx::query("SELECT 1").execute(pool).await.map(|_| ()).map_err(translate),
        }
    }

    async fn fetch_optional<E: Entity>(&self, stmt: Statement) -> Result<Option<E>, AppError> {
        match &self.backend {
            Backend::Sqlite(pool) => {
                let mut conn = pool.acquire().await.map_err(translate)?;
                sqlite::fetch_optional(&mut conn, stmt).await
            }
            Backend::Postgres(pool) => {
                let mut conn = pool.acquire().await.map_err(translate)?;
                postgres::fetch_optional(&mut conn, stmt).await
            }
        }
    }

    async fn fetch_one<E: Entity>(&self, stmt: Statement) -> Result<E, AppError> {
        match &self.backend {
            Backend::Sqlite(pool) => {
                let mut conn = pool.acquire().await.map_err(translate)?;
                sqlite::fetch_one(&mut conn, stmt).await
            }
            Backend::Postgres(pool) => {
                let mut conn = pool.acquire().await.map_err(translate)?;
                postgres::fetch_one(&mut conn, stmt).await
            }
        }
    }

    async fn fetch_all<E: Entity>(&self, stmt: Statement) -> Result<Vec<E>, AppError> {
        match &self.backend {
            Backend::Sqlite(pool) => {
                let mut conn = pool.acquire().await.map_err(translate)?;
                sqlite::fetch_all(&mut conn, stmt).await
            }
            Backend::Postgres(pool) => {
                let mut conn = pool.acquire().await.map_err(translate)?;
                postgres::fetch_all(&mut conn, stmt).await
            }
        }
    }

    pub async fn get<E: Entity>(&self, key: &str) -> Result<Option<E>, AppError> {
        self.fetch_optional(sql::select_by_key(E::DESCRIPTOR, self.dialect(), key)).await
    }

    pub async fn find_one<E: Entity>(&self, filter: &Filter) -> Result<Option<E>, AppError> {
        let stmt = sql::select(E::DESCRIPTOR, self.dialect(), filter, Some((0, 1)))?;
        self.fetch_optional(stmt).await
    }

    pub async fn list<E: Entity>(&self, filter: &Filter, offset: i64, limit: i64) -> Result<Vec<E>, AppError> {
        let stmt = sql::select(E::DESCRIPTOR, self.dialect(), filter, Some((offset, limit)))?;
        self.fetch_all(stmt).await
    }

    /// Every row matching `filter`, unpaginated.
    pub async fn list_all<E: Entity>(&self, filter: &Filter) -> Result<Vec<E>, AppError> {
        let stmt = sql::select(E::DESCRIPTOR, self.dialect(), filter, None)?;
        self.fetch_all(stmt).await
    }

    pub async fn count<E: Entity>(&self, filter: &Filter) -> Result<i64, AppError> {
        let stmt = sql::count(E::DESCRIPTOR, self.dialect(), filter)?;
        match &self.backend {
            Backend::Sqlite(pool) => {
                let mut conn = pool.acquire().await.map_err(translate)?;
                sqlite::fetch_count(&mut conn, stmt).await
            }
            Backend::Postgres(pool) => {
                let mut conn = pool.acquire().await.map_err(translate)?;
                postgres::fetch_count(&mut conn, stmt).await
            }
        }
    }

    pub async fn create<E: Entity>(&self, record: &E) -> Result<E, AppError> {
        let stmt = sql::insert(E::DESCRIPTOR, self.dialect(), record.values())?;
        self.fetch_one(stmt).await
    }

    /// Writes only the patched columns. An empty patch returns the current row.
    pub async fn update<E: Entity>(&self, key: &str, patch: &Patch) -> Result<E, AppError> {
        let found = if patch.is_empty() {
            self.get::<E>(key).await?
        } else {
            let stmt = sql::update(E::DESCRIPTOR, self.dialect(), key, patch)?;
            self.fetch_optional(stmt).await?
        };
        found.ok_or_else(|| E::DESCRIPTOR.not_found())
    }

    pub async fn delete<E: Entity>(&self, key: &str) -> Result<Option<E>, AppError> {
        self.fetch_optional(sql::delete(E::DESCRIPTOR, self.dialect(), key)).await
    }

    /// Moves a pending invitation to `to`. Returns `None` when the row is
    /// missing or no longer pending.
    pub async fn advance_invitation(&self, invitation_id: &str, to: InvitationStatus) -> Result<Option<Invitation>, AppError> {
        self.fetch_optional(sql::advance_invitation(self.dialect(), invitation_id, to)).await
    }

    /// Marks the invitation accepted and inserts the membership atomically.
    ///
    /// Returns `None` (with nothing written) when the invitation was no longer
    /// pending at the time of the update.
    pub async fn accept_invitation(
        &self,
        invitation_id: &str,
        user_id: &str,
        accepted_at: DateTime<Utc>,
        membership: &Membership,
    ) -> Result<Option<Membership>, AppError> {
        let dialect = self.dialect();
        let advance = sql::accept_invitation(dialect, invitation_id, user_id, accepted_at);
        let insert = sql::insert(Membership::DESCRIPTOR, dialect, membership.values())?;

        match &self.backend {
            Backend::Sqlite(pool) => sqlite::accept_invitation(pool, advance, insert).await,
            Backend::Postgres(pool) => postgres::accept_invitation(pool, advance, insert).await,
        }
    }
}
