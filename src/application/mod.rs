pub mod use_cases;

pub use use_cases::batch_persister::{BatchPersister, BatchResult};
pub use use_cases::disaster_import::{DisasterImportUseCase, ImportState};
pub use use_cases::import_report::render_report;
pub use use_cases::progress::{ImportProgress, NoopProgress, TracingProgress};
pub use use_cases::row_mapper::{classify_row, RowClassification, RowMapper};
