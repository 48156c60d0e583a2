// ============================================================
// IMPORT OUTCOME
// ============================================================
// Running totals of one import run

use serde::{Deserialize, Serialize};

/// Upper bound on stored error messages, whatever the error rate
pub const MAX_ERROR_DETAILS: usize = 50;

/// Aggregate result of an import run
///
/// Counters only ever grow. `imported` counts rows of committed batches,
/// or validated rows when `dry_run` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub imported: u64,
    pub skipped: u64,
    pub errors: u64,
    pub error_details: Vec<String>,

    /// Data rows read, header excluded
    pub rows_processed: u64,

    /// Valid rows lost because their batch failed to commit
    pub discarded: u64,

    /// Rows removed by a pre-run truncate
    pub truncated: Option<u64>,

    pub dry_run: bool,
}

impl ImportOutcome {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Count one error and keep its message while under the cap
    pub fn record_error(&mut self, message: String) {
        self.errors += 1;
        if self.error_details.len() < MAX_ERROR_DETAILS {
            self.error_details.push(message);
        }
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_imported(&mut self, rows: u64) {
        self.imported += rows;
    }

    /// A failed batch costs one error, however many rows it held
    pub fn record_batch_failure(&mut self, rows: u64, message: String) {
        self.discarded += rows;
        self.record_error(message);
    }

    /// Partial success still counts as failure
    pub fn is_success(&self) -> bool {
        self.errors == 0
    }

    /// Errors beyond the stored details
    pub fn unrecorded_errors(&self) -> u64 {
        self.errors.saturating_sub(self.error_details.len() as u64)
    }
}
