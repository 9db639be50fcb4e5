pub mod access_log_repository;
pub mod session_repository;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{AccessLogEntry, ChatSession, NewAccessLog};

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>;

/// Read side of the chat-session collection.
pub trait SessionStore: Send + Sync {
    /// Most recent sessions first, at most `limit` of them.
    fn list_recent(&self, limit: i64) -> StoreFuture<'_, Vec<ChatSession>>;
}

/// Append-only access log.
pub trait AccessLogStore: Send + Sync {
    fn insert(&self, log: NewAccessLog) -> StoreFuture<'_, AccessLogEntry>;
}

type ConnectFuture = Pin<Box<dyn Future<Output = Result<PgPool, AppError>> + Send>>;
type Connector = Arc<dyn Fn() -> ConnectFuture + Send + Sync>;

/// Shared Postgres handle, connected on first use.
///
/// Concurrent first callers wait on the same initialisation; a failed attempt
/// leaves the cell empty so the next request tries again.
#[derive(Clone)]
pub struct Database {
    connector: Connector,
    pool: Arc<OnceCell<PgPool>>,
}

impl Database {
    pub fn new(url: impl Into<String>, max_connections: u32, acquire_timeout: Duration) -> Self {
        let url: Arc<str> = Arc::from(url.into());
        Self::with_connector(move || {
            let url = Arc::clone(&url);
            Box::pin(async move { connect(&url, max_connections, acquire_timeout).await })
        })
    }

    fn with_connector(connector: impl Fn() -> ConnectFuture + Send + Sync + 'static) -> Self {
        Self { connector: Arc::new(connector), pool: Arc::new(OnceCell::new()) }
    }

    pub async fn pool(&self) -> Result<&PgPool, AppError> {
        self.pool.get_or_try_init(|| (self.connector)()).await
    }
}

async fn connect(
    url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(url)
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {e}");
            AppError::DatabaseConnectionFailed(e.to_string())
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        error!("Failed to run database migrations: {e}");
        AppError::DatabaseConnectionFailed(e.to_string())
    })?;

    info!("Database connection established and migrations applied");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    /// Counts attempts; fails while `healthy` is false. Each attempt takes a
    /// moment so concurrent callers overlap.
    fn counting_database(healthy: Arc<AtomicBool>) -> (Database, Arc<AtomicUsize>) {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let db = Database::with_connector(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            let healthy = healthy.load(Ordering::SeqCst);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                if healthy {
                    PgPoolOptions::new()
                        .connect_lazy("postgres://localhost/topizio_test")
                        .map_err(|e| AppError::DatabaseConnectionFailed(e.to_string()))
                } else {
                    Err(AppError::DatabaseConnectionFailed("connection refused".to_string()))
                }
            })
        });
        (db, attempts)
    }

    #[test]
    fn handle_starts_disconnected_and_shares_state_across_clones() {
        let db = Database::new("postgres://localhost/unused", 1, Duration::from_millis(50));
        let clone = db.clone();

        assert!(!db.pool.initialized());
        assert!(!clone.pool.initialized());
        assert!(Arc::ptr_eq(&db.pool, &clone.pool));
    }

    #[tokio::test]
    async fn concurrent_first_callers_share_one_connect() {
        let (db, attempts) = counting_database(Arc::new(AtomicBool::new(true)));

        let callers: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { db.pool().await.map(|_| ()) })
            })
            .collect();
        for caller in callers {
            caller.await.expect("caller task").expect("pool is available");
        }

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(db.pool.initialized());

        db.pool().await.expect("pool is cached");
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_connect_is_retried_on_the_next_call() {
        let healthy = Arc::new(AtomicBool::new(false));
        let (db, attempts) = counting_database(Arc::clone(&healthy));

        let err = db.pool().await.expect_err("database is down");
        assert!(matches!(err, AppError::DatabaseConnectionFailed(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(!db.pool.initialized());

        db.pool().await.expect_err("still down");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        healthy.store(true, Ordering::SeqCst);
        db.pool().await.expect("database came back");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(db.pool.initialized());
    }
}
