// ============================================================
// EXPECTED HEADER
// ============================================================
// Column contract of the disaster CSV format

/// Column names in canonical order
pub const EXPECTED_HEADER: [&str; 12] = [
    "date",
    "country",
    "disaster_type",
    "severity_index",
    "casualties",
    "economic_loss_usd",
    "response_time_hours",
    "aid_amount_usd",
    "response_efficiency_score",
    "recovery_days",
    "latitude",
    "longitude",
];

pub const COLUMN_COUNT: usize = EXPECTED_HEADER.len();

/// A column of the expected header, discriminant = canonical position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date = 0,
    Country,
    DisasterType,
    SeverityIndex,
    Casualties,
    EconomicLossUsd,
    ResponseTimeHours,
    AidAmountUsd,
    ResponseEfficiencyScore,
    RecoveryDays,
    Latitude,
    Longitude,
}

impl Column {
    pub fn name(self) -> &'static str {
        EXPECTED_HEADER[self as usize]
    }
}

/// Where each expected column sits in the input file.
///
/// A canonical header yields the identity layout. Headers that carry the
/// same columns in another order are accepted and mapped through this
/// layout so the positional fields still land on the right names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLayout {
    positions: [usize; COLUMN_COUNT],
}

impl Default for HeaderLayout {
    fn default() -> Self {
        Self::canonical()
    }
}

impl HeaderLayout {
    pub fn canonical() -> Self {
        let mut positions = [0; COLUMN_COUNT];
        for (idx, slot) in positions.iter_mut().enumerate() {
            *slot = idx;
        }
        Self { positions }
    }

    /// Build a layout from a raw header line.
    ///
    /// Each field is trimmed and lowercased before comparison. Returns `None`
    /// unless every expected column appears exactly once and nothing else does.
    pub fn from_header<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        if fields.len() != COLUMN_COUNT {
            return None;
        }

        let mut positions = [usize::MAX; COLUMN_COUNT];
        for (file_idx, field) in fields.iter().enumerate() {
            let normalized = normalize_column(field.as_ref());
            let expected_idx = EXPECTED_HEADER.iter().position(|c| *c == normalized)?;
            if positions[expected_idx] != usize::MAX {
                return None;
            }
            positions[expected_idx] = file_idx;
        }

        Some(Self { positions })
    }

    pub fn is_canonical(&self) -> bool {
        self.positions.iter().enumerate().all(|(idx, pos)| idx == *pos)
    }

    /// File position of a column
    pub fn position(&self, column: Column) -> usize {
        self.positions[column as usize]
    }

    /// Message used when the header is rejected
    pub fn mismatch_message() -> String {
        format!(
            "Invalid CSV header. Expected columns: {}",
            EXPECTED_HEADER.join(", ")
        )
    }
}

fn normalize_column(value: &str) -> String {
    value.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_header_is_identity() {
        let layout = HeaderLayout::from_header(&EXPECTED_HEADER[..]).unwrap();
        assert!(layout.is_canonical());
        assert_eq!(layout.position(Column::Longitude), 11);
    }

    #[test]
    fn test_case_and_whitespace_are_normalized() {
        let header: Vec<String> = EXPECTED_HEADER
            .iter()
            .map(|c| format!("  {}\t", c.to_uppercase()))
            .collect();
        let layout = HeaderLayout::from_header(&header[..]).unwrap();
        assert!(layout.is_canonical());
    }

    #[test]
    fn test_reordered_header_maps_positions() {
        let mut header = EXPECTED_HEADER.to_vec();
        header.swap(0, 1);
        let layout = HeaderLayout::from_header(&header[..]).unwrap();
        assert!(!layout.is_canonical());
        assert_eq!(layout.position(Column::Date), 1);
        assert_eq!(layout.position(Column::Country), 0);
    }

    #[test]
    fn test_missing_column_rejected() {
        assert!(HeaderLayout::from_header(&EXPECTED_HEADER[..11]).is_none());
    }

    #[test]
    fn test_misspelled_column_rejected() {
        let mut header = EXPECTED_HEADER.to_vec();
        header[3] = "severity";
        assert!(HeaderLayout::from_header(&header[..]).is_none());
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut header = EXPECTED_HEADER.to_vec();
        header[11] = "latitude";
        assert!(HeaderLayout::from_header(&header[..]).is_none());
    }

    #[test]
    fn test_mismatch_message_lists_columns() {
        let msg = HeaderLayout::mismatch_message();
        assert!(msg.starts_with("Invalid CSV header. Expected columns: date, country,"));
        assert!(msg.ends_with("latitude, longitude"));
    }
}
