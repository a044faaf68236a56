//! Connection pools and scoped sessions.
//!
//! Two pools are kept: a read-write one and a read-only one whose connections
//! are opened with `default_transaction_isolation=serializable` and
//! `default_transaction_read_only=on`, so PostgreSQL itself rejects writes
//! issued through it. Pools are built on first use and rebuilt after
//! [`Database::close`].

use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use anyhow::Context;
use sqlx::{
    postgres::{PgConnection, PgPoolOptions},
    PgPool, Postgres, Transaction,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::{config::DatabaseConfig, error::AppError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadWrite,
    ReadOnly,
}

impl AccessMode {
    fn as_str(self) -> &'static str {
        match self {
            AccessMode::ReadWrite => "read_write",
            AccessMode::ReadOnly => "read_only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub size: u32,
    pub idle: usize,
}

/// Holder of both pools. Cheap to clone; clones share the pools.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

struct Inner {
    config: DatabaseConfig,
    read_write: RwLock<Option<PgPool>>,
    read_only: RwLock<Option<PgPool>>,
}

impl Database {
    /// No connection is opened here.
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                read_write: RwLock::new(None),
                read_only: RwLock::new(None),
            }),
        }
    }

    fn slot(&self, mode: AccessMode) -> &RwLock<Option<PgPool>> {
        match mode {
            AccessMode::ReadWrite => &self.inner.read_write,
            AccessMode::ReadOnly => &self.inner.read_only,
        }
    }

    fn build_pool(&self, mode: AccessMode) -> PgPool {
        let cfg = &self.inner.config;
        let mut options = cfg.connect_options.clone();
        if mode == AccessMode::ReadOnly {
            options = options.options([
                ("default_transaction_isolation", "serializable"),
                ("default_transaction_read_only", "on"),
            ]);
        }
        PgPoolOptions::new()
            .max_connections(cfg.max_connections())
            .min_connections(0)
            .acquire_timeout(cfg.pool_timeout)
            .max_lifetime(cfg.pool_recycle)
            .test_before_acquire(true)
            .connect_lazy_with(options)
    }

    /// Returns the live pool for `mode`, building it when absent or closed.
    async fn pool(&self, mode: AccessMode) -> PgPool {
        let slot = self.slot(mode);
        {
            let guard = slot.read().await;
            if let Some(pool) = guard.as_ref().filter(|p| !p.is_closed()) {
                return pool.clone();
            }
        }

        let mut guard = slot.write().await;
        if let Some(pool) = guard.as_ref().filter(|p| !p.is_closed()) {
            return pool.clone();
        }
        let pool = self.build_pool(mode);
        debug!(
            mode = mode.as_str(),
            max_connections = self.inner.config.max_connections(),
            "connection pool created"
        );
        *guard = Some(pool.clone());
        pool
    }

    /// Opens a transaction on a connection taken from the pool for `mode`.
    ///
    /// Any failure to obtain a working connection is reported as
    /// [`AppError::Unavailable`]; no retry happens here.
    pub async fn acquire_session(&self, mode: AccessMode) -> Result<ScopedSession, AppError> {
        let pool = self.pool(mode).await;
        let tx = pool.begin().await.map_err(|e| {
            warn!(error = %e, mode = mode.as_str(), "session acquisition failed");
            AppError::Unavailable(e)
        })?;
        Ok(ScopedSession { tx, mode })
    }

    pub async fn read_only(&self) -> Result<ScopedSession, AppError> {
        self.acquire_session(AccessMode::ReadOnly).await
    }

    pub async fn read_write(&self) -> Result<ScopedSession, AppError> {
        self.acquire_session(AccessMode::ReadWrite).await
    }

    /// Applies pending migrations through the read-write pool.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let pool = self.pool(AccessMode::ReadWrite).await;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;
        Ok(())
    }

    /// Connection counts of a pool, or `None` if it has not been built.
    pub async fn pool_status(&self, mode: AccessMode) -> Option<PoolStatus> {
        self.slot(mode).read().await.as_ref().map(|pool| PoolStatus {
            size: pool.size(),
            idle: pool.num_idle(),
        })
    }

    /// Closes both pools. The next acquisition builds fresh ones.
    pub async fn close(&self) {
        for mode in [AccessMode::ReadWrite, AccessMode::ReadOnly] {
            let pool = self.slot(mode).write().await.take();
            if let Some(pool) = pool {
                pool.close().await;
                info!(mode = mode.as_str(), "connection pool closed");
            }
        }
    }
}

/// A transaction on one pooled connection, owned by a single operation.
///
/// Work becomes durable only through [`ScopedSession::commit`]. Dropping the
/// session any other way (early `?` return, panic, cancelled request) rolls
/// the transaction back, and the connection goes back to its pool in every
/// case.
pub struct ScopedSession {
    tx: Transaction<'static, Postgres>,
    mode: AccessMode,
}

impl ScopedSession {
    /// Ends the transaction. For read-only sessions this only releases the
    /// snapshot.
    pub async fn commit(self) -> Result<(), AppError> {
        let mode = self.mode;
        self.tx.commit().await.map_err(|e| {
            warn!(error = %e, mode = mode.as_str(), "commit failed");
            AppError::from(e)
        })
    }

    pub async fn rollback(self) -> Result<(), AppError> {
        self.tx.rollback().await.map_err(AppError::from)
    }
}

impl Deref for ScopedSession {
    type Target = PgConnection;

    fn deref(&self) -> &PgConnection {
        &self.tx
    }
}

impl DerefMut for ScopedSession {
    fn deref_mut(&mut self) -> &mut PgConnection {
        &mut self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgConnectOptions;
    use std::time::Duration;

    fn unreachable_db() -> Database {
        Database::new(DatabaseConfig {
            connect_options: PgConnectOptions::new()
                .host("127.0.0.1")
                .port(1)
                .username("nobody")
                .database("nothing"),
            pool_size: 1,
            max_overflow: 0,
            pool_recycle: Duration::from_secs(60),
            pool_timeout: Duration::from_millis(500),
        })
    }

    #[tokio::test]
    async fn pools_are_built_lazily() {
        let db = unreachable_db();
        assert!(db.pool_status(AccessMode::ReadOnly).await.is_none());

        let _ = db.pool(AccessMode::ReadOnly).await;
        assert!(db.pool_status(AccessMode::ReadOnly).await.is_some());
        assert!(db.pool_status(AccessMode::ReadWrite).await.is_none());
    }

    #[tokio::test]
    async fn unreachable_database_is_unavailable() {
        let db = unreachable_db();
        let err = db.read_write().await.err().expect("acquire must fail");
        assert!(matches!(err, AppError::Unavailable(_)));
    }

    #[tokio::test]
    async fn pool_is_rebuilt_after_close() {
        let db = unreachable_db();
        let first = db.pool(AccessMode::ReadWrite).await;
        db.close().await;
        assert!(first.is_closed());
        assert!(db.pool_status(AccessMode::ReadWrite).await.is_none());

        let second = db.pool(AccessMode::ReadWrite).await;
        assert!(!second.is_closed());
    }

    #[tokio::test]
    async fn externally_closed_pool_is_replaced() {
        let db = unreachable_db();
        let first = db.pool(AccessMode::ReadOnly).await;
        first.close().await;

        let second = db.pool(AccessMode::ReadOnly).await;
        assert!(!second.is_closed());
    }
}
