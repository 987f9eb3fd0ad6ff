//! SQLite persistence.
//!
//! Repositories borrow the shared pool for single statements. Functions that take a
//! `&mut SqliteConnection` run inside a caller-owned transaction.

use std::ops::{Deref, DerefMut};
use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::config::Config;
use crate::StorefrontError;

pub mod cart;
pub mod orders;
pub mod products;
pub mod ratings;
pub mod users;
pub mod wishlist;

pub use cart::CartRepository;
pub use orders::OrderRepository;
pub use products::{ProductQuery, ProductRepository};
pub use ratings::RatingRepository;
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens the pool and brings the schema up to date.
pub async fn connect(config: &Config) -> Result<SqlitePool, sqlx::Error> {
    let mut options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    // Every connection to `:memory:` is a separate database, so the pool must hold exactly one forever.
    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new().max_connections(1).idle_timeout(None::<Duration>).max_lifetime(None::<Duration>)
    } else {
        options = options.journal_mode(SqliteJournalMode::Wal);
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options.connect_with(options).await?;
    MIGRATOR.run(&pool).await?;
    tracing::info!(url = %config.database_url, "database ready");
    Ok(pool)
}

pub(crate) fn corrupt(what: &str, err: impl std::fmt::Display) -> StorefrontError {
    StorefrontError::DataCorruption(format!("{what}: {err}"))
}

pub(crate) fn count_from_db(what: &str, value: i64) -> Result<u32, StorefrontError> {
    u32::try_from(value).map_err(|_| corrupt(what, format!("{value} out of range")))
}

const LIVE: &str = "write transaction used after commit or rollback";

/// A transaction opened with `BEGIN IMMEDIATE`.
///
/// It takes the database write lock before its first read, so a read-then-write sequence never
/// has to upgrade a stale snapshot. Other writers wait on the busy timeout instead of failing.
///
/// End it with [`WriteTx::finish`], [`WriteTx::commit`] or [`WriteTx::rollback`]. If it is dropped
/// while still open (the request future was cancelled), the connection is detached from the pool
/// and closed, which makes SQLite discard the transaction.
pub struct WriteTx {
    conn: Option<PoolConnection<Sqlite>>,
}

impl WriteTx {
    pub async fn begin(pool: &SqlitePool) -> Result<Self, StorefrontError> {
        let mut conn = pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        Ok(Self { conn: Some(conn) })
    }

    pub async fn commit(mut self) -> Result<(), StorefrontError> {
        self.end("COMMIT").await
    }

    pub async fn rollback(mut self) -> Result<(), StorefrontError> {
        self.end("ROLLBACK").await
    }

    /// Commits when `result` is `Ok`, rolls back otherwise, and hands `result` back.
    pub async fn finish<T>(self, result: Result<T, StorefrontError>) -> Result<T, StorefrontError> {
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.rollback().await {
                    tracing::warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }

    async fn end(&mut self, statement: &'static str) -> Result<(), StorefrontError> {
        let Some(mut conn) = self.conn.take() else { return Ok(()) };
        if let Err(err) = sqlx::query(statement).execute(&mut *conn).await {
            // Transaction state is unknown; never hand this connection back to the pool.
            drop(conn.detach());
            return Err(err.into());
        }
        Ok(())
    }
}

impl Deref for WriteTx {
    type Target = SqliteConnection;

    fn deref(&self) -> &SqliteConnection {
        self.conn.as_deref().expect(LIVE)
    }
}

impl DerefMut for WriteTx {
    fn deref_mut(&mut self) -> &mut SqliteConnection {
        self.conn.as_deref_mut().expect(LIVE)
    }
}

impl Drop for WriteTx {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            tracing::warn!("write transaction dropped while open, closing its connection");
            drop(conn.detach());
        }
    }
}
