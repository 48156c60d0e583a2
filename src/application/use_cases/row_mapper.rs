// ============================================================
// ROW VALIDATOR & MAPPER
// ============================================================
// Turn one raw CSV record into a DisasterRecord or a rejection reason

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::disaster::{Column, DisasterRecord, HeaderLayout, RawRecord, COLUMN_COUNT};

static DECIMAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$").unwrap());

static INTEGER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());

/// How a single data row was classified
#[derive(Debug, Clone, PartialEq)]
pub enum RowClassification {
    Accepted(DisasterRecord),
    /// A single empty field; padding, not an error
    Blank,
    /// Human readable reason, prefixed with the row number
    Rejected(String),
}

impl RowClassification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RowClassification::Accepted(_))
    }
}

/// Maps raw records through a header layout
#[derive(Debug, Clone, Default)]
pub struct RowMapper {
    layout: HeaderLayout,
}

impl RowMapper {
    pub fn new(layout: HeaderLayout) -> Self {
        Self { layout }
    }

    /// Classify one record. Checks run in a fixed order and the first
    /// failing check decides the outcome.
    pub fn classify(&self, raw: &RawRecord, row_number: u64) -> RowClassification {
        if raw.is_blank() {
            return RowClassification::Blank;
        }

        if raw.len() != COLUMN_COUNT {
            return RowClassification::Rejected(format!(
                "Row {}: Invalid number of columns (expected {}, got {})",
                row_number,
                COLUMN_COUNT,
                raw.len()
            ));
        }

        match self.map_record(raw) {
            Ok(record) => RowClassification::Accepted(record),
            Err(reason) => RowClassification::Rejected(format!("Row {}: {}", row_number, reason)),
        }
    }

    fn field<'a>(&self, raw: &'a RawRecord, column: Column) -> &'a str {
        raw.get(self.layout.position(column)).unwrap_or("")
    }

    fn map_record(&self, raw: &RawRecord) -> Result<DisasterRecord, String> {
        let date = parse_date(self.field(raw, Column::Date))?;
        let country = required_text(self.field(raw, Column::Country), "Country")?;
        let disaster_type = required_text(self.field(raw, Column::DisasterType), "Disaster type")?;

        let decimal = |column: Column| parse_decimal(self.field(raw, column), column.name());
        let severity_index = decimal(Column::SeverityIndex)?;
        let economic_loss_usd = decimal(Column::EconomicLossUsd)?;
        let response_time_hours = decimal(Column::ResponseTimeHours)?;
        let aid_amount_usd = decimal(Column::AidAmountUsd)?;
        let response_efficiency_score = decimal(Column::ResponseEfficiencyScore)?;
        let latitude = decimal(Column::Latitude)?;
        let longitude = decimal(Column::Longitude)?;

        let casualties = parse_integer(self.field(raw, Column::Casualties), Column::Casualties.name())?;
        let recovery_days =
            parse_integer(self.field(raw, Column::RecoveryDays), Column::RecoveryDays.name())?;

        Ok(DisasterRecord {
            date,
            country,
            disaster_type,
            severity_index,
            casualties,
            economic_loss_usd,
            response_time_hours,
            aid_amount_usd,
            response_efficiency_score,
            recovery_days,
            latitude,
            longitude,
        })
    }
}

/// Classify with the canonical column order
pub fn classify_row(raw: &RawRecord, row_number: u64) -> RowClassification {
    RowMapper::default().classify(raw, row_number)
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format \"{}\" (expected YYYY-MM-DD)", value))
}

fn required_text(value: &str, label: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", label));
    }
    Ok(trimmed.to_string())
}

fn parse_decimal(value: &str, field_name: &str) -> Result<BigDecimal, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }
    if !DECIMAL_PATTERN.is_match(trimmed) {
        return Err(format!(
            "{} must be a valid number, got \"{}\"",
            field_name, trimmed
        ));
    }

    BigDecimal::from_str(&canonical_decimal(trimmed)).map_err(|_| {
        format!(
            "{} must be a valid number, got \"{}\"",
            field_name, trimmed
        )
    })
}

/// Spell out the forms the pattern allows but a decimal parser may not:
/// a leading `+`, a bare leading `.` and a trailing `.`
fn canonical_decimal(value: &str) -> String {
    let (sign, digits) = match value.as_bytes()[0] {
        b'-' => ("-", &value[1..]),
        b'+' => ("", &value[1..]),
        _ => ("", value),
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push_str(sign);
    if digits.starts_with('.') {
        out.push('0');
    }
    out.push_str(digits);
    if digits.ends_with('.') {
        out.push('0');
    }
    out
}

fn parse_integer(value: &str, field_name: &str) -> Result<i64, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{} cannot be empty", field_name));
    }

    let invalid = || format!("{} must be a valid integer, got \"{}\"", field_name, trimmed);
    if !INTEGER_PATTERN.is_match(trimmed) {
        return Err(invalid());
    }
    trimmed.parse::<i64>().map_err(|_| invalid())
}
