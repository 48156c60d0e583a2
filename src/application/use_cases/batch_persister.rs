// ============================================================
// BATCH PERSISTER
// ============================================================
// Commit validated records in fixed-size groups

use crate::domain::disaster::DisasterRecord;
use crate::infrastructure::db::DisasterSink;

/// Result of one batch commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchResult {
    Committed {
        rows: u64,
    },
    /// The whole batch is lost; it counts as a single error
    Failed {
        rows: u64,
        message: String,
        /// The sink must reconnect before the next batch
        needs_reset: bool,
    },
}

/// Groups records into batches of `batch_size` on their way to a sink.
///
/// Records are handed to the sink as they are staged, so the persister
/// only tracks how many are in flight and which rows they came from.
#[derive(Debug)]
pub struct BatchPersister {
    batch_size: u64,
    staged: u64,
    first_row: Option<u64>,
    last_row: u64,
    commits: u64,
    drained: bool,
}

impl BatchPersister {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1) as u64,
            staged: 0,
            first_row: None,
            last_row: 0,
            commits: 0,
            drained: false,
        }
    }

    /// Records in the current, uncommitted batch
    pub fn staged(&self) -> u64 {
        self.staged
    }

    /// Commit attempts so far, successful or not
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Add a record to the in-flight batch, committing once it is full
    pub async fn stage<S>(
        &mut self,
        sink: &mut S,
        record: DisasterRecord,
        row_number: u64,
    ) -> Option<BatchResult>
    where
        S: DisasterSink + ?Sized,
    {
        sink.insert(record);
        self.staged += 1;
        self.first_row.get_or_insert(row_number);
        self.last_row = row_number;

        if self.staged >= self.batch_size {
            Some(self.commit(sink, "Batch flush error").await)
        } else {
            None
        }
    }

    /// Commit the partial batch left at end of stream
    pub async fn drain<S>(&mut self, sink: &mut S) -> Option<BatchResult>
    where
        S: DisasterSink + ?Sized,
    {
        debug_assert!(!self.drained, "drain called twice");
        self.drained = true;

        if self.staged == 0 {
            return None;
        }
        Some(self.commit(sink, "Final flush error").await)
    }

    /// Drop the in-flight batch without writing it
    pub fn abandon<S>(&mut self, sink: &mut S) -> u64
    where
        S: DisasterSink + ?Sized,
    {
        let dropped = self.staged;
        sink.clear();
        self.reset_span();
        dropped
    }

    async fn commit<S>(&mut self, sink: &mut S, failure_label: &str) -> BatchResult
    where
        S: DisasterSink + ?Sized,
    {
        let rows = self.staged;
        let first_row = self.first_row.unwrap_or(self.last_row);
        let last_row = self.last_row;
        self.commits += 1;
        self.reset_span();

        match sink.commit_batch().await {
            Ok(written) => {
                if written != rows {
                    tracing::debug!(rows, written, "Sink reported a different row count");
                }
                tracing::debug!(rows, first_row, last_row, "Committed batch");
                BatchResult::Committed { rows }
            }
            Err(failure) => {
                // Nothing from the failed batch may leak into the next one
                sink.clear();
                tracing::warn!(
                    rows,
                    first_row,
                    last_row,
                    error = %failure.error,
                    "Batch commit failed, batch discarded"
                );
                BatchResult::Failed {
                    rows,
                    message: format!(
                        "{} for rows {}-{}: {}",
                        failure_label, first_row, last_row, failure.error
                    ),
                    needs_reset: failure.needs_reset(),
                }
            }
        }
    }

    fn reset_span(&mut self) {
        self.staged = 0;
        self.first_row = None;
        self.last_row = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::{sample_record, RecordingSink};
    use crate::infrastructure::db::SinkHealth;

    #[tokio::test]
    async fn test_250_records_commit_in_three_batches() {
        let mut sink = RecordingSink::new();
        let mut persister = BatchPersister::new(100);

        let mut results = Vec::new();
        for row in 0..250u64 {
            if let Some(result) = persister.stage(&mut sink, sample_record(), row + 2).await {
                results.push(result);
            }
        }
        assert_eq!(persister.staged(), 50);
        results.extend(persister.drain(&mut sink).await);

        assert_eq!(sink.committed_batches, vec![100, 100, 50]);
        assert_eq!(persister.commits(), 3);
        assert!(results
            .iter()
            .all(|r| matches!(r, BatchResult::Committed { .. })));
    }

    #[tokio::test]
    async fn test_memory_is_bounded_by_batch_size() {
        let mut sink = RecordingSink::new();
        let mut persister = BatchPersister::new(10);
        for row in 0..95u64 {
            persister.stage(&mut sink, sample_record(), row + 2).await;
            assert!(sink.pending() < 10);
        }
    }

    #[tokio::test]
    async fn test_failed_batch_reports_row_span() {
        let mut sink = RecordingSink::new().fail_on_commit(1, SinkHealth::Healthy);
        let mut persister = BatchPersister::new(3);

        assert!(persister.stage(&mut sink, sample_record(), 2).await.is_none());
        assert!(persister.stage(&mut sink, sample_record(), 3).await.is_none());
        let result = persister.stage(&mut sink, sample_record(), 5).await.unwrap();

        match result {
            BatchResult::Failed {
                rows,
                message,
                needs_reset,
            } => {
                assert_eq!(rows, 3);
                assert!(message.starts_with("Batch flush error for rows 2-5: "));
                assert!(!needs_reset);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(sink.pending(), 0);
        assert!(sink.committed_batches.is_empty());
    }

    #[tokio::test]
    async fn test_unusable_sink_requests_reset() {
        let mut sink = RecordingSink::new().fail_on_commit(1, SinkHealth::Unusable);
        let mut persister = BatchPersister::new(1);

        let result = persister.stage(&mut sink, sample_record(), 2).await.unwrap();
        assert!(matches!(result, BatchResult::Failed { needs_reset: true, .. }));
    }

    #[tokio::test]
    async fn test_drain_failure_uses_final_label() {
        let mut sink = RecordingSink::new().fail_on_commit(1, SinkHealth::Healthy);
        let mut persister = BatchPersister::new(100);
        persister.stage(&mut sink, sample_record(), 2).await;
        persister.stage(&mut sink, sample_record(), 3).await;

        let Some(BatchResult::Failed { rows, message, .. }) = persister.drain(&mut sink).await
        else {
            panic!("drain should fail");
        };
        assert_eq!(rows, 2);
        assert!(message.starts_with("Final flush error for rows 2-3: "));
    }

    #[tokio::test]
    async fn test_drain_with_nothing_staged() {
        let mut sink = RecordingSink::new();
        let mut persister = BatchPersister::new(100);
        assert!(persister.drain(&mut sink).await.is_none());
        assert_eq!(sink.commit_calls, 0);
    }

    #[tokio::test]
    async fn test_abandon_clears_sink() {
        let mut sink = RecordingSink::new();
        let mut persister = BatchPersister::new(100);
        persister.stage(&mut sink, sample_record(), 2).await;
        assert_eq!(persister.abandon(&mut sink), 1);
        assert_eq!(sink.pending(), 0);
        assert_eq!(persister.staged(), 0);
    }
}
