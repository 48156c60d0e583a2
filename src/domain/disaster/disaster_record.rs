// ============================================================
// DISASTER RECORD
// ============================================================
// Validated, typed form of one CSV data row

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;

/// Fractional digits kept for monetary, score and duration columns
pub const AMOUNT_SCALE: i64 = 2;

/// Fractional digits kept for latitude and longitude
pub const COORDINATE_SCALE: i64 = 6;

/// One disaster event, ready to be persisted
///
/// Decimal values are exact; they keep the scale they were written with
/// and are only rounded to the column scale when stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DisasterRecord {
    pub date: NaiveDate,
    pub country: String,
    pub disaster_type: String,
    pub severity_index: BigDecimal,
    pub casualties: i64,
    pub economic_loss_usd: BigDecimal,
    pub response_time_hours: BigDecimal,
    pub aid_amount_usd: BigDecimal,
    pub response_efficiency_score: BigDecimal,
    pub recovery_days: i64,
    pub latitude: BigDecimal,
    pub longitude: BigDecimal,
}

impl DisasterRecord {
    pub fn severity_index_text(&self) -> String {
        decimal_column_text(&self.severity_index, AMOUNT_SCALE)
    }

    pub fn economic_loss_usd_text(&self) -> String {
        decimal_column_text(&self.economic_loss_usd, AMOUNT_SCALE)
    }

    pub fn response_time_hours_text(&self) -> String {
        decimal_column_text(&self.response_time_hours, AMOUNT_SCALE)
    }

    pub fn aid_amount_usd_text(&self) -> String {
        decimal_column_text(&self.aid_amount_usd, AMOUNT_SCALE)
    }

    pub fn response_efficiency_score_text(&self) -> String {
        decimal_column_text(&self.response_efficiency_score, AMOUNT_SCALE)
    }

    pub fn latitude_text(&self) -> String {
        decimal_column_text(&self.latitude, COORDINATE_SCALE)
    }

    pub fn longitude_text(&self) -> String {
        decimal_column_text(&self.longitude, COORDINATE_SCALE)
    }
}

/// Render a decimal at a fixed column scale, rounding half away from zero
pub fn decimal_column_text(value: &BigDecimal, scale: i64) -> String {
    value.with_scale_round(scale, RoundingMode::HalfUp).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    #[test]
    fn test_column_text_pads_to_scale() {
        assert_eq!(decimal_column_text(&dec("7.5"), AMOUNT_SCALE), "7.50");
        assert_eq!(decimal_column_text(&dec("5000000"), AMOUNT_SCALE), "5000000.00");
        assert_eq!(decimal_column_text(&dec("35.67619"), COORDINATE_SCALE), "35.676190");
    }

    #[test]
    fn test_column_text_rounds_half_up() {
        assert_eq!(decimal_column_text(&dec("1.005"), AMOUNT_SCALE), "1.01");
        assert_eq!(decimal_column_text(&dec("-1.005"), AMOUNT_SCALE), "-1.01");
    }

    #[test]
    fn test_decimal_sums_are_exact() {
        let total = dec("0.10") + dec("0.20");
        assert_eq!(total, dec("0.30"));
    }
}
