// ============================================================
// IMPORT OPTIONS
// ============================================================
// Per-run switches for the disaster import

use serde::{Deserialize, Serialize};

/// Records committed per storage transaction
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Options for a single import run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Validate every row but never touch storage
    pub dry_run: bool,

    /// Empty the target table before streaming (ignored for dry runs)
    pub truncate: bool,

    /// Number of records per committed batch (default: 100)
    pub batch_size: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            truncate: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Truncation only happens when it can actually mutate storage
    pub fn should_truncate(&self) -> bool {
        self.truncate && !self.dry_run
    }

    /// Validate option values
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ImportOptions::default();
        assert_eq!(options.batch_size, 100);
        assert!(!options.dry_run);
        assert!(!options.truncate);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_dry_run_suppresses_truncate() {
        let options = ImportOptions::new().with_truncate(true).with_dry_run(true);
        assert!(!options.should_truncate());
        assert!(ImportOptions::new().with_truncate(true).should_truncate());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(ImportOptions::new().with_batch_size(0).validate().is_err());
    }
}
