use std::path::Path;

use tracing_subscriber::EnvFilter;
use validator::Validate;

use crate::application::{render_report, DisasterImportUseCase, TracingProgress};
use crate::domain::disaster::ImportOutcome;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::Settings;
use crate::infrastructure::csv::{count_data_rows, RecordSource};
use crate::infrastructure::db::{parse_database_url, DiscardSink, SqliteDisasterSink};
use crate::interfaces::cli::ImportArgs;

/// `RUST_LOG` when set, `info` otherwise
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Resolve settings and run one import
pub async fn run(args: &ImportArgs) -> Result<ImportOutcome> {
    let settings = Settings::load()?;
    run_with_settings(args, settings).await
}

pub async fn run_with_settings(args: &ImportArgs, mut settings: Settings) -> Result<ImportOutcome> {
    args.apply_to(&mut settings);
    settings.validate()?;

    let path = settings.default_file.clone();
    let options = args.import_options(&settings);

    tracing::info!(
        file = %path.display(),
        dry_run = options.dry_run,
        truncate = options.truncate,
        batch_size = options.batch_size,
        "Starting disaster import"
    );

    let total_rows = count_data_rows(&path)?;
    if total_rows == 0 {
        tracing::warn!(file = %path.display(), "The CSV file is empty or contains only headers");
        return Ok(ImportOutcome::new(options.dry_run));
    }

    let mut progress = TracingProgress::new(settings.progress_every);
    let source = RecordSource::open(&path)?;
    let use_case = DisasterImportUseCase::new(options);

    if use_case.options().dry_run {
        // Nothing may be created on disk, but a malformed URL still fails
        parse_database_url(&settings.database_url)?;
        let mut sink = DiscardSink::new();
        return use_case
            .import_source(source, Some(total_rows), &mut sink, &mut progress)
            .await;
    }

    ensure_database_dir(&settings.database_url)?;
    let mut sink = SqliteDisasterSink::init(&settings.database_url).await?;
    use_case
        .import_source(source, Some(total_rows), &mut sink, &mut progress)
        .await
}

/// Text summary, or pretty JSON with `--json`
pub fn format_outcome(outcome: &ImportOutcome, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(outcome)
            .map_err(|e| AppError::Internal(format!("Failed to serialize outcome: {}", e)))
    } else {
        Ok(render_report(outcome))
    }
}

/// SQLite creates the file but not its directory
fn ensure_database_dir(database_url: &str) -> Result<()> {
    let Some(rest) = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
    else {
        return Ok(());
    };

    let file = rest.split('?').next().unwrap_or(rest);
    if file.is_empty() || file.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(file).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::IoError(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}
