use crate::aggregate::aggregate_donors;
use crate::error::{DonorAnalyticsError, Result};
use crate::normalize::RowNormalizer;
use crate::schema::{DonationRecord, RawRow, UploadOutcome};
use std::path::Path;

/// The tabular container encodings the engine accepts rows from. Decoding
/// is a collaborator's job; the engine only gates on the declared format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Excel,
}

impl TabularFormat {
    /// Recognizes a source file by extension. An unrecognized container
    /// format is the one fatal ingestion error; per-row problems never
    /// reach this level.
    pub fn from_path(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(TabularFormat::Csv),
            "xlsx" | "xls" => Ok(TabularFormat::Excel),
            _ => Err(DonorAnalyticsError::UnsupportedFormat(
                file_name.to_string(),
            )),
        }
    }
}

/// Normalizes, filters, and aggregates a batch of decoded rows. Rows that
/// fail validation are dropped silently; `records_processed` still counts
/// every row seen.
pub fn ingest_rows(rows: &[RawRow], normalizer: &RowNormalizer) -> UploadOutcome {
    let records: Vec<DonationRecord> = rows
        .iter()
        .filter_map(|row| normalizer.normalize(row))
        .collect();

    UploadOutcome {
        donors: aggregate_donors(records),
        records_processed: rows.len(),
    }
}

/// Full ingestion boundary for one named upload: the container format is
/// checked first, then the decoded rows flow through normalization and
/// aggregation.
pub fn ingest_upload(
    file_name: &str,
    rows: &[RawRow],
    normalizer: &RowNormalizer,
) -> Result<UploadOutcome> {
    TabularFormat::from_path(file_name)?;
    Ok(ingest_rows(rows, normalizer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CellValue;
    use chrono::NaiveDate;

    fn row(entries: &[(&str, &str)]) -> RawRow {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::Text(v.to_string())))
            .collect()
    }

    fn normalizer() -> RowNormalizer {
        RowNormalizer::with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    #[test]
    fn test_format_gate() {
        assert_eq!(
            TabularFormat::from_path("donors.csv").unwrap(),
            TabularFormat::Csv
        );
        assert_eq!(
            TabularFormat::from_path("Donors.XLSX").unwrap(),
            TabularFormat::Excel
        );
        assert_eq!(
            TabularFormat::from_path("gifts.xls").unwrap(),
            TabularFormat::Excel
        );
        assert!(TabularFormat::from_path("donors.pdf").is_err());
        assert!(TabularFormat::from_path("donors").is_err());
    }

    #[test]
    fn test_unsupported_format_message() {
        let err = TabularFormat::from_path("donors.pdf").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file format: donors.pdf");
    }

    #[test]
    fn test_invalid_rows_are_filtered_not_fatal() {
        let rows = vec![
            row(&[
                ("First Name", "Jane"),
                ("Last Name", "Doe"),
                ("Amount", "$100"),
                ("Date", "2024-01-15"),
            ]),
            // Missing last name: dropped.
            row(&[("First Name", "Nameless"), ("Amount", "50")]),
            // Zero amount: dropped.
            row(&[
                ("First Name", "John"),
                ("Last Name", "Smith"),
                ("Amount", "0"),
            ]),
        ];

        let outcome = ingest_upload("donors.csv", &rows, &normalizer()).unwrap();
        assert_eq!(outcome.records_processed, 3);
        assert_eq!(outcome.donors.len(), 1);
        assert_eq!(outcome.donors[0].first_name, "Jane");
    }

    #[test]
    fn test_rows_group_into_donors() {
        let rows = vec![
            row(&[
                ("first_name", "Jane"),
                ("last_name", "Doe"),
                ("donation", "100"),
                ("date", "2024-01-15"),
            ]),
            row(&[
                ("FIRST NAME", "jane"),
                ("LAST NAME", "doe"),
                ("GIFT", "50"),
                ("DATE", "2024-02-10"),
            ]),
        ];

        let outcome = ingest_upload("gifts.csv", &rows, &normalizer()).unwrap();
        assert_eq!(outcome.donors.len(), 1);
        assert_eq!(outcome.donors[0].donation_count, 2);
        assert_eq!(outcome.donors[0].total_amount, 150.0);
    }
}
