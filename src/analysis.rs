use crate::economic::adjust_forecast;
use crate::forecast::generate_forecast;
use crate::retention::donor_retention;
use crate::schema::{
    Donor, EconomicIndicator, EnhancedForecastData, ForecastData, MonthlyTrend, RetentionData,
};
use crate::trends::monthly_trends;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const TOP_DONOR_LIMIT: usize = 10;

/// Full analytical snapshot over one donor set. Recomputed on every call;
/// nothing in here is persisted or mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_donors: usize,
    pub total_amount: f64,
    pub average_donation: f64,
    pub donation_count: usize,
    pub top_donors: Vec<Donor>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub donor_retention: RetentionData,
    pub forecast: ForecastData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedAnalysisResult {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub enhanced_forecast: EnhancedForecastData,
}

pub fn analyze(donors: &[Donor], now: NaiveDate) -> AnalysisResult {
    let total_donors = donors.len();
    let total_amount: f64 = donors.iter().map(|d| d.total_amount).sum();
    let donation_count: usize = donors.iter().map(|d| d.donation_count).sum();
    let average_donation = if donation_count == 0 {
        0.0
    } else {
        total_amount / donation_count as f64
    };

    let mut top_donors = donors.to_vec();
    top_donors.sort_by(|a, b| {
        b.total_amount
            .partial_cmp(&a.total_amount)
            .unwrap_or(Ordering::Equal)
    });
    top_donors.truncate(TOP_DONOR_LIMIT);

    let monthly_trends = monthly_trends(donors);
    let donor_retention = donor_retention(donors, now);
    let forecast = generate_forecast(&monthly_trends);

    AnalysisResult {
        total_donors,
        total_amount,
        average_donation,
        donation_count,
        top_donors,
        monthly_trends,
        donor_retention,
        forecast,
    }
}

/// Base analysis plus the economic-factor adjustment layer. The base
/// forecaster and the adjustment compose as independent functions; the
/// adjustment only sees the base forecast it reweights.
pub fn analyze_with_economic_factors(
    donors: &[Donor],
    indicators: &[EconomicIndicator],
    now: NaiveDate,
) -> EnhancedAnalysisResult {
    let analysis = analyze(donors, now);
    let enhanced_forecast = adjust_forecast(&analysis.forecast, indicators);
    EnhancedAnalysisResult {
        analysis,
        enhanced_forecast,
    }
}

/// Relative growth between two analyzed periods. A zero base period
/// yields 0 growth rather than dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodGrowth {
    pub donor_growth: f64,
    pub amount_growth: f64,
    pub average_donation_growth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub period1: AnalysisResult,
    pub period2: AnalysisResult,
    pub comparison: PeriodGrowth,
}

pub fn compare_periods(
    period1_donors: &[Donor],
    period2_donors: &[Donor],
    now: NaiveDate,
) -> PeriodComparison {
    let period1 = analyze(period1_donors, now);
    let period2 = analyze(period2_donors, now);

    let comparison = PeriodGrowth {
        donor_growth: growth(period1.total_donors as f64, period2.total_donors as f64),
        amount_growth: growth(period1.total_amount, period2.total_amount),
        average_donation_growth: growth(period1.average_donation, period2.average_donation),
    };

    PeriodComparison {
        period1,
        period2,
        comparison,
    }
}

fn growth(base: f64, current: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        (current - base) / base
    }
}
