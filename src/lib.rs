//! # Donor Analytics Engine
//!
//! A library for normalizing heterogeneous tabular donation records into a
//! canonical donor model, merging uploads idempotently into an existing
//! donor database, and computing giving analytics with a regression-based
//! revenue forecast.
//!
//! ## Core Concepts
//!
//! - **Raw rows**: decoded tabular data with arbitrary column headers,
//!   mapped onto canonical fields by alias dictionaries
//! - **Donations and Donors**: validated transactions grouped by a
//!   case-insensitive name identity key, with derived lifetime metrics
//! - **Merge**: a pure snapshot-returning combination of an existing donor
//!   set with a new upload, suppressing duplicate donations in two layers
//! - **Analytics**: monthly trend buckets, month-over-month retention, and
//!   an ordinary least-squares forecast optionally reweighted by external
//!   economic indicators
//!
//! ## Example
//!
//! ```rust,ignore
//! use donor_analytics_engine::*;
//! use chrono::NaiveDate;
//!
//! let engine = DonorAnalytics::new();
//!
//! // Rows come from an external decoder (CSV, spreadsheet, ...).
//! let outcome = engine.ingest("donations.csv", &rows)?;
//!
//! // Combine with the previously persisted donor set.
//! let report = engine.merge(&existing_donors, &outcome.donors);
//!
//! let analysis = engine.analyze(&report.donors);
//! println!(
//!     "{} donors, next month: {:.2}",
//!     analysis.total_donors, analysis.forecast.next_month.predicted_amount
//! );
//! ```

pub mod aggregate;
pub mod analysis;
pub mod economic;
pub mod error;
pub mod fields;
pub mod forecast;
pub mod ingestion;
pub mod merge;
pub mod normalize;
pub mod retention;
pub mod schema;
pub mod trends;
pub mod utils;

pub use aggregate::{aggregate_donors, frequency_for_count, recompute_metrics};
pub use analysis::{
    analyze, analyze_with_economic_factors, compare_periods, AnalysisResult,
    EnhancedAnalysisResult, PeriodComparison, PeriodGrowth, TOP_DONOR_LIMIT,
};
pub use economic::{
    adjust_forecast, composite_adjustment, economic_factors, indicator_impact, indicator_trend,
    optimal_campaign_timing, standard_indicators, CampaignTiming,
};
pub use error::{DonorAnalyticsError, Result};
pub use fields::{map_row, normalize_header, MappedRow};
pub use forecast::{fit_least_squares, generate_forecast, LinearFit, RECENT_WINDOW_MONTHS};
pub use ingestion::{ingest_rows, ingest_upload, TabularFormat};
pub use merge::{merge_donor_sets, MergeReport};
pub use normalize::{parse_amount, parse_date, parse_month, RowNormalizer};
pub use retention::donor_retention;
pub use schema::*;
pub use trends::{monthly_trends, seasonal_patterns, SeasonalPattern};

use chrono::{NaiveDate, Utc};
use log::{debug, info};

/// Facade over the full pipeline, carrying the reference date used for
/// retention windows and permissive date fallbacks. Construct with a
/// pinned date in tests; `new` uses the current day.
pub struct DonorAnalytics {
    reference_date: NaiveDate,
}

impl DonorAnalytics {
    pub fn new() -> Self {
        Self {
            reference_date: Utc::now().date_naive(),
        }
    }

    pub fn with_reference_date(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Ingests one decoded upload: format gate, field mapping, row
    /// normalization, and donor aggregation.
    pub fn ingest(&self, file_name: &str, rows: &[RawRow]) -> Result<UploadOutcome> {
        info!("Ingesting upload {} ({} rows)", file_name, rows.len());
        let outcome = ingestion::ingest_upload(
            file_name,
            rows,
            &RowNormalizer::with_reference_date(self.reference_date),
        )?;
        debug!(
            "Upload {} produced {} donors from {} rows",
            file_name,
            outcome.donors.len(),
            outcome.records_processed
        );
        Ok(outcome)
    }

    /// Merges a freshly ingested batch into the existing donor set,
    /// returning a new snapshot. The caller persists the result; the
    /// inputs are untouched.
    pub fn merge(&self, existing: &[Donor], incoming: &[Donor]) -> MergeReport {
        merge::merge_donor_sets(existing, incoming)
    }

    pub fn analyze(&self, donors: &[Donor]) -> AnalysisResult {
        analysis::analyze(donors, self.reference_date)
    }

    pub fn analyze_with_economic_factors(
        &self,
        donors: &[Donor],
        indicators: &[EconomicIndicator],
    ) -> EnhancedAnalysisResult {
        analysis::analyze_with_economic_factors(donors, indicators, self.reference_date)
    }
}

impl Default for DonorAnalytics {
    fn default() -> Self {
        Self::new()
    }
}
