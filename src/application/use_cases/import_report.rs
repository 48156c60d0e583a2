// ============================================================
// IMPORT REPORT
// ============================================================
// Human readable summary of an ImportOutcome

use std::fmt::Write;

use crate::domain::disaster::ImportOutcome;

/// Error lines printed before the rest are summarised
pub const REPORTED_ERROR_LINES: usize = 10;

pub fn render_report(outcome: &ImportOutcome) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, outcome);
    out
}

fn write_report(out: &mut String, outcome: &ImportOutcome) -> std::fmt::Result {
    writeln!(out, "Import Summary")?;
    writeln!(out, "==============")?;

    let imported_label = if outcome.dry_run {
        "Records validated"
    } else {
        "Records imported"
    };
    writeln!(out, "{}: {}", imported_label, outcome.imported)?;
    writeln!(out, "Records skipped (empty rows): {}", outcome.skipped)?;
    writeln!(out, "Errors encountered: {}", outcome.errors)?;

    if outcome.discarded > 0 {
        writeln!(out, "Records discarded (failed batches): {}", outcome.discarded)?;
    }
    if let Some(truncated) = outcome.truncated {
        writeln!(out, "Existing records truncated: {}", truncated)?;
    }

    if outcome.errors > 0 {
        writeln!(out)?;
        writeln!(out, "Errors:")?;
        let shown = outcome.error_details.iter().take(REPORTED_ERROR_LINES);
        let shown_count = shown.len() as u64;
        for detail in shown {
            writeln!(out, "  - {}", detail)?;
        }

        let remaining = outcome.errors.saturating_sub(shown_count);
        if remaining > 0 {
            writeln!(
                out,
                "  ... and {} more errors (showing first {})",
                remaining, REPORTED_ERROR_LINES
            )?;
        }
    }

    // A clean run with nothing imported gets no verdict line
    match (outcome.is_success(), outcome.dry_run) {
        (true, _) if outcome.imported == 0 => Ok(()),
        (true, true) => {
            writeln!(out)?;
            writeln!(out, "Dry run completed successfully. All records are valid.")
        }
        (true, false) => {
            writeln!(out)?;
            writeln!(
                out,
                "Import completed successfully. {} records imported.",
                outcome.imported
            )
        }
        (false, _) => {
            writeln!(out)?;
            writeln!(out, "Import finished with {} errors.", outcome.errors)
        }
    }
}
