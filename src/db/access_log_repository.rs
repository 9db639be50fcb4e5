use tracing::{debug, error};

use super::{AccessLogStore, Database, StoreFuture};
use crate::errors::AppError;
use crate::models::{AccessLogEntry, NewAccessLog};

#[derive(Clone)]
pub struct AccessLogRepository {
    db: Database,
}

impl AccessLogRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn save(&self, log: NewAccessLog) -> Result<AccessLogEntry, AppError> {
        let pool = self.db.pool().await?;
        let entry = AccessLogEntry::new(log);

        sqlx::query(
            "INSERT INTO access_logs (id, ip_address, city, connection_time, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&entry.id)
        .bind(&entry.ip_address)
        .bind(&entry.city)
        .bind(entry.connection_time)
        .bind(entry.created_at)
        .execute(pool)
        .await
        .map_err(|e| {
            error!("Failed to save access log for {}: {e}", entry.ip_address);
            AppError::db_query("Failed to save access log", e)
        })?;

        debug!("Access log {} inserted", entry.id);
        Ok(entry)
    }
}

impl AccessLogStore for AccessLogRepository {
    fn insert(&self, log: NewAccessLog) -> StoreFuture<'_, AccessLogEntry> {
        Box::pin(self.save(log))
    }
}
