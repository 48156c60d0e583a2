// ============================================================
// IMPORT PROGRESS
// ============================================================
// Fire-and-forget observers for a running import

use std::time::Instant;

use crate::domain::disaster::ImportOutcome;

/// Receives progress events from the import loop.
///
/// Observers cannot influence the import; every method returns nothing.
pub trait ImportProgress {
    /// Called once before the first data row, with the row count if known
    fn start(&mut self, _total_rows: Option<u64>) {}

    /// Called after every data row
    fn advance(&mut self, row_number: u64);

    /// Called once the outcome is final
    fn finish(&mut self, _outcome: &ImportOutcome) {}
}

/// Ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ImportProgress for NoopProgress {
    fn advance(&mut self, _row_number: u64) {}
}

/// Logs a progress line every `every` rows
#[derive(Debug)]
pub struct TracingProgress {
    every: u64,
    total: Option<u64>,
    seen: u64,
    started: Option<Instant>,
}

impl TracingProgress {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            total: None,
            seen: 0,
            started: None,
        }
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }

    fn elapsed_ms(&self) -> u64 {
        self.started
            .map(|s| s.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }
}

impl ImportProgress for TracingProgress {
    fn start(&mut self, total_rows: Option<u64>) {
        self.total = total_rows;
        self.started = Some(Instant::now());
        tracing::info!(total_rows = ?total_rows, "Import started");
    }

    fn advance(&mut self, row_number: u64) {
        self.seen += 1;
        if self.seen % self.every != 0 {
            return;
        }

        match self.total {
            Some(total) if total > 0 => {
                let percent = self.seen.saturating_mul(100) / total;
                tracing::info!(
                    rows = self.seen,
                    total,
                    percent,
                    row = row_number,
                    elapsed_ms = self.elapsed_ms(),
                    "Import progress"
                );
            }
            _ => {
                tracing::info!(
                    rows = self.seen,
                    row = row_number,
                    elapsed_ms = self.elapsed_ms(),
                    "Import progress"
                );
            }
        }
    }

    fn finish(&mut self, outcome: &ImportOutcome) {
        tracing::info!(
            rows = self.seen,
            imported = outcome.imported,
            skipped = outcome.skipped,
            errors = outcome.errors,
            elapsed_ms = self.elapsed_ms(),
            "Import finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_progress_counts_rows() {
        let mut progress = TracingProgress::new(0);
        progress.start(Some(3));
        for row in 2..5 {
            progress.advance(row);
        }
        progress.finish(&ImportOutcome::default());
        assert_eq!(progress.seen(), 3);
    }
}
