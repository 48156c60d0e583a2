// ============================================================
// DISASTER IMPORT USE CASE
// ============================================================
// Drive a CSV stream through validation and batched persistence

use std::io::BufRead;
use std::path::Path;

use crate::application::use_cases::batch_persister::{BatchPersister, BatchResult};
use crate::application::use_cases::progress::ImportProgress;
use crate::application::use_cases::row_mapper::{RowClassification, RowMapper};
use crate::domain::disaster::{HeaderLayout, ImportOptions, ImportOutcome};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::csv::{count_data_rows, RecordSource};
use crate::infrastructure::db::DisasterSink;

/// Where the import loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportState {
    ValidatingHeader,
    Streaming,
    Draining,
    Done,
    /// Terminal, only reachable from `ValidatingHeader`
    HeaderInvalid,
}

/// Streams one CSV input into a sink.
///
/// Rows are handled strictly one at a time and in file order, so each
/// row's batch (and the blast radius of a failed commit) is fixed by its
/// position. At most one batch of records is held at any point.
pub struct DisasterImportUseCase {
    options: ImportOptions,
}

impl DisasterImportUseCase {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Import a CSV file, counting its rows first so progress has a total
    pub async fn import_file<S, P>(
        &self,
        path: &Path,
        sink: &mut S,
        progress: &mut P,
    ) -> Result<ImportOutcome>
    where
        S: DisasterSink + ?Sized,
        P: ImportProgress + ?Sized,
    {
        let total_rows = count_data_rows(path)?;
        let source = RecordSource::open(path)?;
        self.import_source(source, Some(total_rows), sink, progress)
            .await
    }

    /// Import from an already opened record source
    pub async fn import_source<R, S, P>(
        &self,
        mut source: RecordSource<R>,
        total_rows: Option<u64>,
        sink: &mut S,
        progress: &mut P,
    ) -> Result<ImportOutcome>
    where
        R: BufRead,
        S: DisasterSink + ?Sized,
        P: ImportProgress + ?Sized,
    {
        self.options.validate().map_err(|e| {
            AppError::ValidationError(format!("Invalid import options: {}", e))
        })?;

        let dry_run = self.options.dry_run;
        let mut outcome = ImportOutcome::new(dry_run);
        let mut persister = BatchPersister::new(self.options.batch_size);
        let mut mapper = RowMapper::default();
        // The header is row 1
        let mut row_number: u64 = 1;
        let mut state = ImportState::ValidatingHeader;

        loop {
            tracing::trace!(?state, row = row_number, "Import state");
            state = match state {
                ImportState::ValidatingHeader => {
                    let header = match source.next_record() {
                        Ok(header) => header,
                        Err(AppError::ParseError(reason)) => {
                            tracing::warn!(%reason, "CSV header could not be parsed");
                            None
                        }
                        Err(e) => return Err(e),
                    };
                    let layout =
                        header.and_then(|header| HeaderLayout::from_header(&header.fields[..]));

                    match layout {
                        Some(layout) => {
                            if !layout.is_canonical() {
                                tracing::info!("CSV header columns are reordered, mapping by name");
                            }
                            mapper = RowMapper::new(layout);

                            if self.options.should_truncate() {
                                let removed = sink.truncate_table().await?;
                                tracing::info!(removed, "Truncated existing disaster records");
                                outcome.truncated = Some(removed);
                            }

                            progress.start(total_rows);
                            ImportState::Streaming
                        }
                        None => ImportState::HeaderInvalid,
                    }
                }

                ImportState::Streaming => match source.next_record() {
                    Ok(Some(raw)) => {
                        row_number += 1;
                        outcome.rows_processed += 1;

                        match mapper.classify(&raw, row_number) {
                            RowClassification::Blank => outcome.record_skipped(),
                            RowClassification::Rejected(reason) => {
                                tracing::debug!(row = row_number, %reason, "Row rejected");
                                outcome.record_error(reason);
                            }
                            RowClassification::Accepted(_) if dry_run => outcome.record_imported(1),
                            RowClassification::Accepted(record) => {
                                if let Some(result) =
                                    persister.stage(sink, record, row_number).await
                                {
                                    apply_batch_result(sink, &mut outcome, result).await;
                                }
                            }
                        }

                        progress.advance(row_number);
                        ImportState::Streaming
                    }
                    Ok(None) => ImportState::Draining,
                    // The source has consumed the offending lines; this is one bad row
                    Err(AppError::ParseError(reason)) => {
                        row_number += 1;
                        outcome.rows_processed += 1;
                        tracing::debug!(row = row_number, %reason, "Row could not be parsed");
                        outcome.record_error(format!("Row {}: {}", row_number, reason));
                        progress.advance(row_number);
                        ImportState::Streaming
                    }
                    Err(e) => {
                        let dropped = persister.abandon(sink);
                        tracing::error!(
                            error = %e,
                            row = row_number,
                            dropped,
                            "Reading CSV input failed, aborting import"
                        );
                        return Err(e);
                    }
                },

                ImportState::Draining => {
                    if let Some(result) = persister.drain(sink).await {
                        apply_batch_result(sink, &mut outcome, result).await;
                    }
                    ImportState::Done
                }

                ImportState::Done => {
                    progress.finish(&outcome);
                    return Ok(outcome);
                }

                ImportState::HeaderInvalid => {
                    let message = HeaderLayout::mismatch_message();
                    tracing::error!("{}", message);
                    return Err(AppError::InvalidHeader(message));
                }
            };
        }
    }
}

async fn apply_batch_result<S>(sink: &mut S, outcome: &mut ImportOutcome, result: BatchResult)
where
    S: DisasterSink + ?Sized,
{
    match result {
        BatchResult::Committed { rows } => outcome.record_imported(rows),
        BatchResult::Failed {
            rows,
            message,
            needs_reset,
        } => {
            outcome.record_batch_failure(rows, message);
            if needs_reset {
                // A failed reset leaves the sink broken; the next commit
                // fails on its own and asks for another reset.
                match sink.reset_connection().await {
                    Ok(()) => tracing::info!("Storage connection re-established"),
                    Err(e) => tracing::error!(error = %e, "Failed to re-establish storage connection"),
                }
            }
        }
    }
}
