pub mod discard;
pub mod sqlite;

use crate::domain::disaster::DisasterRecord;
use crate::domain::error::{AppError, Result};
use async_trait::async_trait;

pub use discard::DiscardSink;
pub use sqlite::{parse_database_url, SqliteDisasterSink, StoredDisaster};

/// Whether a sink can still be used after a failed commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkHealth {
    Healthy,
    /// The connection is gone; call `reset_connection` before the next batch
    Unusable,
}

/// A batch commit that did not go through
#[derive(Debug, Clone, PartialEq)]
pub struct CommitFailure {
    pub error: AppError,
    pub health: SinkHealth,
}

impl CommitFailure {
    pub fn needs_reset(&self) -> bool {
        self.health == SinkHealth::Unusable
    }
}

/// Storage target for validated disaster records.
///
/// Records are queued with `insert` and written atomically by
/// `commit_batch`. A failed commit leaves nothing behind from that batch.
#[async_trait]
pub trait DisasterSink: Send {
    /// Queue a record for the next commit
    fn insert(&mut self, record: DisasterRecord);

    /// Records queued since the last commit
    fn pending(&self) -> usize;

    /// Drop queued records without writing them
    fn clear(&mut self);

    /// Write every queued record in one transaction and empty the queue,
    /// whether or not the write succeeds. Returns the rows written.
    async fn commit_batch(&mut self) -> std::result::Result<u64, CommitFailure>;

    /// Replace the underlying connection with a fresh one
    async fn reset_connection(&mut self) -> Result<()>;

    /// Remove every stored record, returns the rows removed
    async fn truncate_table(&mut self) -> Result<u64>;
}
