// ============================================================
// DISASTER DOMAIN LAYER
// ============================================================
// Core types for the disaster CSV import
// No I/O, no async

mod disaster_record;
mod header;
mod import_options;
mod import_outcome;
mod raw_record;

pub use disaster_record::{decimal_column_text, DisasterRecord, AMOUNT_SCALE, COORDINATE_SCALE};
pub use header::{Column, HeaderLayout, COLUMN_COUNT, EXPECTED_HEADER};
pub use import_options::{ImportOptions, DEFAULT_BATCH_SIZE};
pub use import_outcome::{ImportOutcome, MAX_ERROR_DETAILS};
pub use raw_record::RawRecord;
