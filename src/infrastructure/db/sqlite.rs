use crate::domain::disaster::DisasterRecord;
use crate::domain::error::{AppError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use super::{CommitFailure, DisasterSink, SinkHealth};

const DISASTER_SCHEMA: &str = include_str!("../../../resources/schema.sql");

const INSERT_DISASTER: &str = "INSERT INTO global_disaster (
        date, country, disaster_type, severity_index, casualties, economic_loss_usd,
        response_time_hours, aid_amount_usd, response_efficiency_score, recovery_days,
        latitude, longitude
     ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// `global_disaster` table in a SQLite database
pub struct SqliteDisasterSink {
    database_url: String,
    pool: SqlitePool,
    pending: Vec<DisasterRecord>,
}

impl SqliteDisasterSink {
    pub async fn init(database_url: &str) -> Result<Self> {
        let pool = connect(database_url).await?;
        apply_schema(&pool).await?;

        Ok(Self {
            database_url: database_url.to_string(),
            pool,
            pending: Vec::new(),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn count_records(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM global_disaster")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count records: {}", e)))
    }

    /// Stored rows in insertion order
    pub async fn fetch_all(&self, limit: i64) -> Result<Vec<StoredDisaster>> {
        sqlx::query_as::<_, StoredDisaster>(
            "SELECT id, date, country, disaster_type, severity_index, casualties,
                    economic_loss_usd, response_time_hours, aid_amount_usd,
                    response_efficiency_score, recovery_days, latitude, longitude
             FROM global_disaster ORDER BY id ASC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch records: {}", e)))
    }

    async fn write_batch(&self, records: &[DisasterRecord]) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        let mut affected: u64 = 0;
        for record in records {
            // Dropping `tx` on error rolls the whole batch back
            let res = sqlx::query(INSERT_DISASTER)
                .bind(record.date)
                .bind(&record.country)
                .bind(&record.disaster_type)
                .bind(record.severity_index_text())
                .bind(record.casualties)
                .bind(record.economic_loss_usd_text())
                .bind(record.response_time_hours_text())
                .bind(record.aid_amount_usd_text())
                .bind(record.response_efficiency_score_text())
                .bind(record.recovery_days)
                .bind(record.latitude_text())
                .bind(record.longitude_text())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to insert disaster record: {}", e))
                })?;
            affected += res.rows_affected();
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(affected)
    }

    async fn probe_health(&self) -> SinkHealth {
        if self.pool.is_closed() {
            return SinkHealth::Unusable;
        }

        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => SinkHealth::Healthy,
            Err(e) => {
                tracing::warn!(error = %e, "SQLite health check failed after commit error");
                SinkHealth::Unusable
            }
        }
    }
}

#[async_trait]
impl DisasterSink for SqliteDisasterSink {
    fn insert(&mut self, record: DisasterRecord) {
        self.pending.push(record);
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }

    fn clear(&mut self) {
        self.pending.clear();
    }

    async fn commit_batch(&mut self) -> std::result::Result<u64, CommitFailure> {
        let records = std::mem::take(&mut self.pending);
        if records.is_empty() {
            return Ok(0);
        }

        match self.write_batch(&records).await {
            Ok(affected) => Ok(affected),
            Err(error) => {
                let health = self.probe_health().await;
                Err(CommitFailure { error, health })
            }
        }
    }

    async fn reset_connection(&mut self) -> Result<()> {
        tracing::info!("Re-opening SQLite connection");
        self.pool.close().await;
        // An in-memory database starts empty again, so re-apply the schema
        let pool = connect(&self.database_url).await?;
        apply_schema(&pool).await?;
        self.pool = pool;
        Ok(())
    }

    async fn truncate_table(&mut self) -> Result<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        let removed = sqlx::query("DELETE FROM global_disaster")
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to truncate table: {}", e)))?
            .rows_affected();

        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'global_disaster'")
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to reset id sequence: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(removed)
    }
}

/// Check a connection string without opening anything
pub fn parse_database_url(database_url: &str) -> Result<SqliteConnectOptions> {
    SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse connection string: {}", e)))
}

async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = parse_database_url(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    // One connection: the importer is the only writer, and an in-memory
    // database lives exactly as long as its connection.
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {}", e)))
}

async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    for stmt in DISASTER_SCHEMA.split(';') {
        let sql = stmt.trim();
        if sql.is_empty() {
            continue;
        }
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to apply schema statement: {}", e)))?;
    }
    Ok(())
}

/// A row of `global_disaster` as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredDisaster {
    pub id: i64,
    pub date: NaiveDate,
    pub country: String,
    pub disaster_type: String,
    pub severity_index: String,
    pub casualties: i64,
    pub economic_loss_usd: String,
    pub response_time_hours: String,
    pub aid_amount_usd: String,
    pub response_efficiency_score: String,
    pub recovery_days: i64,
    pub latitude: String,
    pub longitude: String,
}
