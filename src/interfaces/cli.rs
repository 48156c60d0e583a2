use std::path::PathBuf;

use clap::Parser;

use crate::domain::disaster::ImportOptions;
use crate::infrastructure::config::Settings;

/// Import global disaster records from a CSV file
#[derive(Debug, Clone, Parser)]
#[command(name = "disaster-import", version, about)]
pub struct ImportArgs {
    /// CSV file to import (defaults to the configured `default_file`)
    pub file: Option<PathBuf>,

    /// Delete existing records before importing
    #[arg(short = 't', long)]
    pub truncate: bool,

    /// Validate every row without writing anything
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Database connection string, e.g. sqlite://data/disasters.db
    #[arg(long)]
    pub database_url: Option<String>,

    /// Records per committed batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Print the outcome as JSON instead of a text summary
    #[arg(long)]
    pub json: bool,
}

impl ImportArgs {
    /// Flags win over file and environment settings
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(url) = &self.database_url {
            settings.database_url = url.clone();
        }
        if let Some(batch_size) = self.batch_size {
            settings.batch_size = batch_size;
        }
        if let Some(file) = &self.file {
            settings.default_file = file.clone();
        }
    }

    pub fn import_options(&self, settings: &Settings) -> ImportOptions {
        ImportOptions::new()
            .with_dry_run(self.dry_run)
            .with_truncate(self.truncate)
            .with_batch_size(settings.batch_size)
    }
}
