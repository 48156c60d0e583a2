// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Streaming CSV input for the disaster import

mod record_source;

pub use record_source::{count_data_rows, RecordSource};
