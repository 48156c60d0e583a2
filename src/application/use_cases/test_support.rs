use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::domain::disaster::{DisasterRecord, EXPECTED_HEADER};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::db::{CommitFailure, DisasterSink, SinkHealth};

pub const VALID_ROW: &str =
    "2021-03-05,Japan,Earthquake,7.50,120,5000000.00,3.25,2000000.00,85.00,45,35.676190,139.650300";

pub fn sample_record() -> DisasterRecord {
    let dec = |v: &str| BigDecimal::from_str(v).unwrap();
    DisasterRecord {
        date: NaiveDate::from_ymd_opt(2021, 3, 5).unwrap(),
        country: "Japan".to_string(),
        disaster_type: "Earthquake".to_string(),
        severity_index: dec("7.50"),
        casualties: 120,
        economic_loss_usd: dec("5000000.00"),
        response_time_hours: dec("3.25"),
        aid_amount_usd: dec("2000000.00"),
        response_efficiency_score: dec("85.00"),
        recovery_days: 45,
        latitude: dec("35.676190"),
        longitude: dec("139.650300"),
    }
}

/// Header line followed by the given data lines
pub fn csv_with_rows<S: AsRef<str>>(rows: &[S]) -> String {
    let mut content = EXPECTED_HEADER.join(",");
    content.push('\n');
    for row in rows {
        content.push_str(row.as_ref());
        content.push('\n');
    }
    content
}

/// In-memory sink that records every call and can fail chosen commits
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub pending: Vec<DisasterRecord>,
    pub stored: Vec<DisasterRecord>,
    /// Size of every successful commit, in order
    pub committed_batches: Vec<u64>,
    pub commit_calls: u64,
    pub resets: u64,
    pub truncates: u64,
    /// 1-based commit attempt -> health reported with the failure
    failures: HashMap<u64, SinkHealth>,
    broken: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stored(mut self, rows: usize) -> Self {
        self.stored = (0..rows).map(|_| sample_record()).collect();
        self
    }

    pub fn fail_on_commit(mut self, attempt: u64, health: SinkHealth) -> Self {
        self.failures.insert(attempt, health);
        self
    }
}

#[async_trait]
impl DisasterSink for RecordingSink {
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
        self.commit_calls += 1;
        let batch = std::mem::take(&mut self.pending);

        if self.broken {
            return Err(CommitFailure {
                error: AppError::DatabaseError("connection is closed".to_string()),
                health: SinkHealth::Unusable,
            });
        }

        if let Some(health) = self.failures.get(&self.commit_calls).copied() {
            self.broken = health == SinkHealth::Unusable;
            return Err(CommitFailure {
                error: AppError::DatabaseError(format!(
                    "simulated failure on commit {}",
                    self.commit_calls
                )),
                health,
            });
        }

        let rows = batch.len() as u64;
        self.stored.extend(batch);
        self.committed_batches.push(rows);
        Ok(rows)
    }

    async fn reset_connection(&mut self) -> Result<()> {
        self.resets += 1;
        self.broken = false;
        Ok(())
    }

    async fn truncate_table(&mut self) -> Result<u64> {
        self.truncates += 1;
        let removed = self.stored.len() as u64;
        self.stored.clear();
        Ok(removed)
    }
}
