pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use application::{render_report, DisasterImportUseCase, ImportProgress};
pub use domain::disaster::{ImportOptions, ImportOutcome};
pub use domain::error::{AppError, Result};
pub use infrastructure::config::Settings;
pub use infrastructure::db::{DisasterSink, SqliteDisasterSink};
pub use interfaces::cli::ImportArgs;
