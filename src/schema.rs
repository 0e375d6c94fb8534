use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single cell from a decoded tabular upload. Decoders hand the engine
/// either raw text or an already-typed number; everything else about the
/// container format stays outside the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CellValue {
    #[schemars(description = "A numeric cell, e.g. an amount column from a spreadsheet")]
    Number(f64),

    #[schemars(description = "A text cell; amounts and dates in text form are parsed downstream")]
    Text(String),
}

impl CellValue {
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

/// One decoded row: observed column header -> cell value, headers in
/// whatever case and spacing the source file used.
pub type RawRow = BTreeMap<String, CellValue>;

/// A normalized row that survived validation, prior to donor grouping.
/// Carries the donor identity and contact fields transiently; they move
/// onto the owning `Donor` during aggregation.
#[derive(Debug, Clone)]
pub struct DonationRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub month: String,
    pub year: i32,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: String,
    pub amount: f64,
    pub date: NaiveDate,
    /// Derived label, e.g. "January 2024".
    pub month: String,
    pub year: i32,
    /// Back-reference to the owning donor, filled during aggregation.
    pub donor_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FrequencyTier {
    OneTime,
    Occasional,
    Regular,
    Frequent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Exclusively owned: a donation belongs to exactly one donor.
    pub donations: Vec<Donation>,
    pub total_amount: f64,
    pub donation_count: usize,
    pub average_donation: f64,
    pub first_donation: NaiveDate,
    pub last_donation: NaiveDate,
    pub frequency: FrequencyTier,
}

impl Donor {
    pub fn identity_key(&self) -> String {
        donor_key(&self.first_name, &self.last_name)
    }
}

/// Case-insensitive trimmed "first_last" key used to deduplicate donors
/// across uploads. Distinct people sharing a name collapse into one donor;
/// no stronger identifier is guaranteed present in source data.
pub fn donor_key(first_name: &str, last_name: &str) -> String {
    format!(
        "{}_{}",
        first_name.trim().to_lowercase(),
        last_name.trim().to_lowercase()
    )
}

/// Aggregate over one calendar month across all donors. Recomputed on every
/// analysis call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    /// Display label, e.g. "Jan 2024". Ordering always uses `year` and
    /// `month_number`, never this string.
    pub month: String,
    pub year: i32,
    pub month_number: u32,
    pub amount: f64,
    /// Distinct donors who gave that month, not the number of donations.
    pub donor_count: usize,
    pub average_donation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionData {
    pub new_donors: usize,
    pub returning_donors: usize,
    pub retention_rate: f64,
    pub churn_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub predicted_amount: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastData {
    pub next_month: ForecastPoint,
    pub next_quarter: ForecastPoint,
    pub trend_direction: TrendDirection,
}

impl ForecastData {
    /// The defined result for fewer than three months of history.
    pub fn insufficient_history() -> Self {
        Self {
            next_month: ForecastPoint {
                predicted_amount: 0.0,
                confidence: 0.0,
            },
            next_quarter: ForecastPoint {
                predicted_amount: 0.0,
                confidence: 0.0,
            },
            trend_direction: TrendDirection::Stable,
        }
    }
}

/// Per-indicator impact factors feeding the composite adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EconomicFactors {
    pub consumer_confidence: f64,
    pub market_performance: f64,
    pub unemployment_impact: f64,
    pub gdp_growth_impact: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedPrediction {
    pub base_amount: f64,
    pub economic_adjustment: f64,
    pub final_amount: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedPredictions {
    pub next_month: AdjustedPrediction,
    pub next_quarter: AdjustedPrediction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedForecastData {
    #[serde(flatten)]
    pub forecast: ForecastData,
    pub economic_factors: EconomicFactors,
    pub adjusted_predictions: AdjustedPredictions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EconomicDataPoint {
    #[schemars(description = "Observation date in YYYY-MM-DD format")]
    pub date: NaiveDate,

    #[schemars(description = "Observed value of the indicator on that date")]
    pub value: f64,
}

/// An externally supplied economic indicator series. The engine never
/// fetches or validates indicator data; collaborators provide it already
/// decoded, and an empty or missing series produces a zero-impact
/// adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EconomicIndicator {
    #[schemars(
        description = "Well-known series name, e.g. 'Consumer Confidence Index'. Unrecognized names contribute no adjustment."
    )]
    pub name: String,

    #[schemars(description = "Historical value series, oldest first")]
    pub data: Vec<EconomicDataPoint>,

    #[schemars(description = "Narrative description of how the series relates to giving behavior")]
    pub impact: String,

    #[schemars(description = "Suggested fundraising action tied to the series")]
    pub recommendation: String,

    #[schemars(description = "Most recent observed value, 0 when the series is empty")]
    pub current_value: f64,

    #[schemars(description = "Recent direction of the series")]
    pub trend: TrendDirection,

    #[schemars(
        description = "Fixed correlation coefficient against donation behavior, in [-1, 1]. Negative values indicate an inverse relationship."
    )]
    pub correlation: f64,
}

impl EconomicIndicator {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Vec<EconomicIndicator>)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// Result of one ingestion batch: the aggregated donors plus how many raw
/// rows were seen. Rows dropped by validation are not itemized; the gap
/// between `records_processed` and the surviving donation count is the
/// only signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub donors: Vec<Donor>,
    pub records_processed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub date: NaiveDate,
    pub records_added: usize,
    pub total_records: usize,
}

pub const UPLOAD_HISTORY_LIMIT: usize = 50;

/// Rolling log of uploads, capped at the most recent
/// [`UPLOAD_HISTORY_LIMIT`] entries. Persistence of the log is the
/// storage collaborator's concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadHistory {
    pub entries: Vec<UploadRecord>,
}

impl UploadHistory {
    pub fn record(&mut self, date: NaiveDate, records_added: usize, total_records: usize) {
        self.entries.push(UploadRecord {
            date,
            records_added,
            total_records,
        });
        if self.entries.len() > UPLOAD_HISTORY_LIMIT {
            let excess = self.entries.len() - UPLOAD_HISTORY_LIMIT;
            self.entries.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donor_key_normalization() {
        assert_eq!(donor_key("Jane", "Doe"), "jane_doe");
        assert_eq!(donor_key("  JANE ", " doe "), "jane_doe");
    }

    #[test]
    fn test_frequency_tier_serialization() {
        let json = serde_json::to_string(&FrequencyTier::OneTime).unwrap();
        assert_eq!(json, "\"one-time\"");
        let tier: FrequencyTier = serde_json::from_str("\"occasional\"").unwrap();
        assert_eq!(tier, FrequencyTier::Occasional);
    }

    #[test]
    fn test_cell_value_untagged_deserialization() {
        let number: CellValue = serde_json::from_str("100.5").unwrap();
        assert_eq!(number, CellValue::Number(100.5));
        let text: CellValue = serde_json::from_str("\"$100.00\"").unwrap();
        assert_eq!(text, CellValue::Text("$100.00".to_string()));
        assert_eq!(CellValue::Number(100.0).as_text(), "100");
    }

    #[test]
    fn test_indicator_schema_generation() {
        let schema_json = EconomicIndicator::schema_as_json().unwrap();
        assert!(schema_json.contains("correlation"));
        assert!(schema_json.contains("Consumer Confidence Index"));
    }

    #[test]
    fn test_donor_serialization_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let donor = Donor {
            id: "d-1".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: Some("jane@example.com".to_string()),
            phone: None,
            donations: vec![Donation {
                id: "g-1".to_string(),
                amount: 100.0,
                date,
                month: "January 2024".to_string(),
                year: 2024,
                donor_id: "d-1".to_string(),
            }],
            total_amount: 100.0,
            donation_count: 1,
            average_donation: 100.0,
            first_donation: date,
            last_donation: date,
            frequency: FrequencyTier::OneTime,
        };

        let json = serde_json::to_string(&donor).unwrap();
        let decoded: Donor = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, donor);
    }

    #[test]
    fn test_upload_history_truncates() {
        let mut history = UploadHistory::default();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for i in 0..60 {
            history.record(date, i, i * 2);
        }
        assert_eq!(history.entries.len(), UPLOAD_HISTORY_LIMIT);
        assert_eq!(history.entries.first().unwrap().records_added, 10);
        assert_eq!(history.entries.last().unwrap().records_added, 59);
    }
}
