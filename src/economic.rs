use crate::schema::{
    AdjustedPrediction, AdjustedPredictions, Donor, EconomicDataPoint, EconomicFactors,
    EconomicIndicator, EnhancedForecastData, ForecastData, ForecastPoint, TrendDirection,
};
use crate::trends::seasonal_patterns;
use std::cmp::Ordering;

pub const CONSUMER_CONFIDENCE: &str = "Consumer Confidence Index";
pub const MARKET_PERFORMANCE: &str = "S&P 500 Performance";
pub const UNEMPLOYMENT_RATE: &str = "Unemployment Rate";
pub const GDP_GROWTH: &str = "GDP Growth Rate";

/// Policy weights for the composite adjustment; they sum to 1.0 and are
/// fixed, not derived.
const CONSUMER_CONFIDENCE_WEIGHT: f64 = 0.30;
const MARKET_PERFORMANCE_WEIGHT: f64 = 0.25;
const UNEMPLOYMENT_WEIGHT: f64 = 0.25;
const GDP_GROWTH_WEIGHT: f64 = 0.20;

/// Damping bound on the composite adjustment, limiting forecast swing to
/// plus or minus 30 percent.
const MAX_COMPOSITE_ADJUSTMENT: f64 = 0.30;

const CONFIDENCE_CAP: f64 = 0.95;
const CONFIDENCE_BOOST_PER_UNIT: f64 = 0.1;

/// Relative change in an indicator's recent mean that counts as movement.
const TREND_CHANGE_THRESHOLD: f64 = 0.02;

/// Impact of one indicator: relative change of the 3-observation recent
/// mean against the mean of the up-to-9 observations before it, weighted
/// by the absolute correlation coefficient. Series with fewer than 2
/// points, or with an empty or zero-mean prior window, contribute 0.
pub fn indicator_impact(indicator: Option<&EconomicIndicator>) -> f64 {
    let Some(indicator) = indicator else {
        return 0.0;
    };
    if indicator.data.len() < 2 {
        return 0.0;
    }

    let values: Vec<f64> = indicator.data.iter().map(|p| p.value).collect();
    let recent_start = values.len().saturating_sub(3);
    let prior_start = values.len().saturating_sub(12);
    let recent = &values[recent_start..];
    let prior = &values[prior_start..recent_start];

    if prior.is_empty() {
        return 0.0;
    }

    let recent_mean = mean(recent);
    let prior_mean = mean(prior);
    if prior_mean == 0.0 {
        return 0.0;
    }

    let percent_change = (recent_mean - prior_mean) / prior_mean;
    percent_change * indicator.correlation.abs()
}

/// Resolves the four canonical indicators by name; anything absent or
/// unrecognized yields a zero factor, so an empty indicator set produces
/// a neutral adjustment.
pub fn economic_factors(indicators: &[EconomicIndicator]) -> EconomicFactors {
    let find = |name: &str| indicators.iter().find(|i| i.name == name);

    EconomicFactors {
        consumer_confidence: indicator_impact(find(CONSUMER_CONFIDENCE)),
        market_performance: indicator_impact(find(MARKET_PERFORMANCE)),
        unemployment_impact: indicator_impact(find(UNEMPLOYMENT_RATE)),
        gdp_growth_impact: indicator_impact(find(GDP_GROWTH)),
    }
}

/// Weighted composite of the per-indicator impacts, clamped to the
/// damping bound.
pub fn composite_adjustment(factors: &EconomicFactors) -> f64 {
    let raw = factors.consumer_confidence * CONSUMER_CONFIDENCE_WEIGHT
        + factors.market_performance * MARKET_PERFORMANCE_WEIGHT
        + factors.unemployment_impact * UNEMPLOYMENT_WEIGHT
        + factors.gdp_growth_impact * GDP_GROWTH_WEIGHT;
    raw.clamp(-MAX_COMPOSITE_ADJUSTMENT, MAX_COMPOSITE_ADJUSTMENT)
}

/// Reweights a base forecast by the damped composite adjustment. Adjusted
/// confidence grows with the magnitude of the adjustment, capped at 0.95.
pub fn adjust_forecast(
    base: &ForecastData,
    indicators: &[EconomicIndicator],
) -> EnhancedForecastData {
    let factors = economic_factors(indicators);
    let damped = composite_adjustment(&factors);

    let adjust = |point: &ForecastPoint| AdjustedPrediction {
        base_amount: point.predicted_amount,
        economic_adjustment: point.predicted_amount * damped,
        final_amount: point.predicted_amount * (1.0 + damped),
        confidence: (point.confidence + damped.abs() * CONFIDENCE_BOOST_PER_UNIT)
            .min(CONFIDENCE_CAP),
    };

    EnhancedForecastData {
        forecast: base.clone(),
        economic_factors: factors,
        adjusted_predictions: AdjustedPredictions {
            next_month: adjust(&base.next_month),
            next_quarter: adjust(&base.next_quarter),
        },
    }
}

/// Classifies a series' recent direction: mean of the last 3 observations
/// against the mean of the 3 before them.
pub fn indicator_trend(data: &[EconomicDataPoint]) -> TrendDirection {
    if data.len() < 2 {
        return TrendDirection::Stable;
    }

    let values: Vec<f64> = data.iter().map(|p| p.value).collect();
    let recent_start = values.len().saturating_sub(3);
    let older_start = values.len().saturating_sub(6);
    let recent = &values[recent_start..];
    let older = &values[older_start..recent_start];

    if older.is_empty() {
        return TrendDirection::Stable;
    }
    let older_mean = mean(older);
    if older_mean == 0.0 {
        return TrendDirection::Stable;
    }

    let change = (mean(recent) - older_mean) / older_mean;
    if change > TREND_CHANGE_THRESHOLD {
        TrendDirection::Up
    } else if change < -TREND_CHANGE_THRESHOLD {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    }
}

/// Builds the four canonical indicators from externally fetched series.
/// Correlation coefficients are fixed policy values; the unemployment
/// series carries a negative correlation (inverse relationship with
/// giving).
pub fn standard_indicators(
    consumer_confidence: Vec<EconomicDataPoint>,
    market_performance: Vec<EconomicDataPoint>,
    unemployment: Vec<EconomicDataPoint>,
    gdp_growth: Vec<EconomicDataPoint>,
) -> Vec<EconomicIndicator> {
    vec![
        build_indicator(
            CONSUMER_CONFIDENCE,
            consumer_confidence,
            "High correlation with discretionary giving",
            "Monitor monthly CCI reports for campaign timing",
            0.75,
        ),
        build_indicator(
            MARKET_PERFORMANCE,
            market_performance,
            "Stock market gains often increase charitable giving",
            "Track quarterly performance for major gift timing",
            0.68,
        ),
        build_indicator(
            UNEMPLOYMENT_RATE,
            unemployment,
            "Inverse relationship with donation frequency",
            "Adjust fundraising strategies during economic downturns",
            -0.62,
        ),
        build_indicator(
            GDP_GROWTH,
            gdp_growth,
            "Economic expansion correlates with increased giving",
            "Capitalize on growth periods for capital campaigns",
            0.71,
        ),
    ]
}

fn build_indicator(
    name: &str,
    data: Vec<EconomicDataPoint>,
    impact: &str,
    recommendation: &str,
    correlation: f64,
) -> EconomicIndicator {
    EconomicIndicator {
        name: name.to_string(),
        impact: impact.to_string(),
        recommendation: recommendation.to_string(),
        current_value: data.last().map(|p| p.value).unwrap_or(0.0),
        trend: indicator_trend(&data),
        correlation,
        data,
    }
}

/// Campaign timing recommendation combining indicator state with the
/// organization's own seasonal giving history.
#[derive(Debug, Clone)]
pub struct CampaignTiming {
    pub recommended_months: Vec<String>,
    pub reasoning: String,
    pub confidence_score: f64,
}

pub fn optimal_campaign_timing(
    indicators: &[EconomicIndicator],
    donors: &[Donor],
) -> CampaignTiming {
    let find = |name: &str| indicators.iter().find(|i| i.name == name);

    let mut score: f64 = 0.0;
    let mut reasoning = String::new();

    if let Some(cci) = find(CONSUMER_CONFIDENCE) {
        if cci.trend == TrendDirection::Up && cci.current_value > 95.0 {
            score += 0.3;
            reasoning.push_str("Consumer confidence is rising, indicating favorable giving conditions. ");
        }
    }

    if let Some(market) = find(MARKET_PERFORMANCE) {
        if market.trend == TrendDirection::Up {
            score += 0.25;
            reasoning.push_str("Stock market performance is positive, potentially increasing donor wealth. ");
        }
    }

    let mut patterns = seasonal_patterns(donors);
    patterns.sort_by(|a, b| {
        b.average_amount
            .partial_cmp(&a.average_amount)
            .unwrap_or(Ordering::Equal)
    });
    let recommended_months: Vec<String> = patterns.iter().take(3).map(|p| p.month.clone()).collect();

    score += 0.45;
    reasoning.push_str(&format!(
        "Historical data shows strongest giving in {}.",
        recommended_months.join(", ")
    ));

    CampaignTiming {
        recommended_months,
        reasoning,
        confidence_score: score.min(1.0),
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
