use async_trait::async_trait;

use crate::domain::disaster::DisasterRecord;
use crate::domain::error::Result;

use super::{CommitFailure, DisasterSink};

/// Sink for dry runs: accepts records and never touches storage
#[derive(Debug, Default)]
pub struct DiscardSink {
    pending: usize,
}

impl DiscardSink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DisasterSink for DiscardSink {
    fn insert(&mut self, _record: DisasterRecord) {
        self.pending += 1;
    }

    fn pending(&self) -> usize {
        self.pending
    }

    fn clear(&mut self) {
        self.pending = 0;
    }

    async fn commit_batch(&mut self) -> std::result::Result<u64, CommitFailure> {
        let rows = std::mem::take(&mut self.pending) as u64;
        Ok(rows)
    }

    async fn reset_connection(&mut self) -> Result<()> {
        Ok(())
    }

    async fn truncate_table(&mut self) -> Result<u64> {
        Ok(0)
    }
}
