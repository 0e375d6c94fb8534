use crate::fields::map_row;
use crate::schema::{CellValue, DonationRecord, RawRow};
use crate::utils::{long_month_label, month_name_to_number};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

/// Date patterns tried in order against an explicit date field: ISO, US,
/// EU, then textual-month variants. chrono's %b accepts both abbreviated
/// and full month names.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%b %d, %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Turns mapped rows into validated donation records. Carries the
/// reference date used for the month-only and no-date fallbacks so
/// normalization stays deterministic under test.
#[derive(Debug, Clone)]
pub struct RowNormalizer {
    today: NaiveDate,
}

impl RowNormalizer {
    pub fn new() -> Self {
        Self {
            today: Utc::now().date_naive(),
        }
    }

    pub fn with_reference_date(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Produces a donation candidate, or `None` when the row fails
    /// validation (empty first or last name, non-positive amount). Rejected
    /// rows are dropped silently; callers only see a smaller output set.
    pub fn normalize(&self, row: &RawRow) -> Option<DonationRecord> {
        let mapped = map_row(row);

        let first_name = trimmed_text(mapped.first_name.as_ref());
        let last_name = trimmed_text(mapped.last_name.as_ref());
        let amount = mapped.amount.as_ref().map(parse_amount).unwrap_or(0.0);

        if first_name.is_empty() || last_name.is_empty() || amount <= 0.0 {
            return None;
        }

        let date = self.resolve_date(mapped.date.as_ref(), mapped.month.as_ref());

        Some(DonationRecord {
            id: Uuid::new_v4().to_string(),
            first_name,
            last_name,
            amount,
            date,
            month: long_month_label(date),
            year: date.year(),
            email: optional_text(mapped.email.as_ref()),
            phone: optional_text(mapped.phone.as_ref()),
        })
    }

    /// Date resolution is deliberately permissive: an unparsable or absent
    /// date falls back to a synthesized month-start or to the reference
    /// date rather than rejecting the row.
    fn resolve_date(&self, date: Option<&CellValue>, month: Option<&CellValue>) -> NaiveDate {
        if let Some(cell) = date {
            if let Some(parsed) = parse_date(&cell.as_text()) {
                return parsed;
            }
        }

        if let Some(cell) = month {
            if let Some(number) = parse_month(cell) {
                if let Some(synthesized) = NaiveDate::from_ymd_opt(self.today.year(), number, 1) {
                    return synthesized;
                }
            }
        }

        self.today
    }
}

impl Default for RowNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric cells pass through; text keeps only digits, decimal point, and
/// minus sign before parsing. Unparsable values become 0 and fail the
/// amount validity test downstream.
pub fn parse_amount(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.date());
        }
    }

    None
}

/// A month field may be a number (1-12) or an English month name, matched
/// by prefix.
pub fn parse_month(value: &CellValue) -> Option<u32> {
    match value {
        CellValue::Number(n) => {
            let month = *n as u32;
            (1..=12).contains(&month).then_some(month)
        }
        CellValue::Text(s) => {
            if let Ok(number) = s.trim().parse::<u32>() {
                return (1..=12).contains(&number).then_some(number);
            }
            month_name_to_number(s)
        }
    }
}

fn trimmed_text(value: Option<&CellValue>) -> String {
    value
        .map(|v| v.as_text().trim().to_string())
        .unwrap_or_default()
}

fn optional_text(value: Option<&CellValue>) -> Option<String> {
    value
        .map(|v| v.as_text().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entries: &[(&str, CellValue)]) -> RawRow {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_string())
    }

    fn normalizer() -> RowNormalizer {
        RowNormalizer::with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    #[test]
    fn test_parse_amount_strips_currency() {
        assert_eq!(parse_amount(&text("$100.00")), 100.0);
        assert_eq!(parse_amount(&text("1,250.50")), 1250.5);
        assert_eq!(parse_amount(&text("-25")), -25.0);
        assert_eq!(parse_amount(&text("n/a")), 0.0);
        assert_eq!(parse_amount(&CellValue::Number(75.0)), 75.0);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15"), Some(expected));
        assert_eq!(parse_date("01/15/2024"), Some(expected));
        assert_eq!(parse_date("2024/01/15"), Some(expected));
        assert_eq!(parse_date("Jan 15, 2024"), Some(expected));
        assert_eq!(parse_date("January 15, 2024"), Some(expected));
        assert_eq!(parse_date("15 Jan 2024"), Some(expected));
        assert_eq!(parse_date("2024-01-15T09:30:00"), Some(expected));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_date_prefers_us_over_eu() {
        // Ambiguous day/month resolves through the fixed pattern order.
        let parsed = parse_date("03/04/2024").unwrap();
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month(&CellValue::Number(3.0)), Some(3));
        assert_eq!(parse_month(&CellValue::Number(13.0)), None);
        assert_eq!(parse_month(&text("11")), Some(11));
        assert_eq!(parse_month(&text("September")), Some(9));
        assert_eq!(parse_month(&text("sep")), Some(9));
        assert_eq!(parse_month(&text("winter")), None);
    }

    #[test]
    fn test_normalize_valid_row() {
        let record = normalizer()
            .normalize(&row(&[
                ("First Name", text("Jane")),
                ("Last Name", text("Doe")),
                ("Amount", text("$100.00")),
                ("Date", text("2024-01-15")),
                ("Email", text("jane@example.com")),
            ]))
            .unwrap();

        assert_eq!(record.first_name, "Jane");
        assert_eq!(record.last_name, "Doe");
        assert_eq!(record.amount, 100.0);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(record.month, "January 2024");
        assert_eq!(record.year, 2024);
        assert_eq!(record.email.as_deref(), Some("jane@example.com"));
        assert!(record.phone.is_none());
    }

    #[test]
    fn test_rejects_missing_name_and_bad_amount() {
        let n = normalizer();
        assert!(n
            .normalize(&row(&[
                ("First Name", text("")),
                ("Last Name", text("Doe")),
                ("Amount", CellValue::Number(10.0)),
            ]))
            .is_none());
        assert!(n
            .normalize(&row(&[
                ("First Name", text("Jane")),
                ("Last Name", text("Doe")),
                ("Amount", text("free")),
            ]))
            .is_none());
        assert!(n
            .normalize(&row(&[
                ("First Name", text("Jane")),
                ("Last Name", text("Doe")),
                ("Amount", CellValue::Number(-5.0)),
            ]))
            .is_none());
    }

    #[test]
    fn test_month_only_row_synthesizes_reference_year() {
        let record = normalizer()
            .normalize(&row(&[
                ("First Name", text("Jane")),
                ("Last Name", text("Doe")),
                ("Amount", CellValue::Number(20.0)),
                ("Month", text("March")),
            ]))
            .unwrap();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_dateless_row_falls_back_to_reference_date() {
        let record = normalizer()
            .normalize(&row(&[
                ("First Name", text("Jane")),
                ("Last Name", text("Doe")),
                ("Amount", CellValue::Number(20.0)),
            ]))
            .unwrap();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }

    #[test]
    fn test_unparsable_date_with_month_fallback() {
        let record = normalizer()
            .normalize(&row(&[
                ("First Name", text("Jane")),
                ("Last Name", text("Doe")),
                ("Amount", CellValue::Number(20.0)),
                ("Date", text("sometime last year")),
                ("Month", CellValue::Number(2.0)),
            ]))
            .unwrap();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }
}
