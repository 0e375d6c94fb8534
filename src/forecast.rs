use crate::schema::{ForecastData, ForecastPoint, MonthlyTrend, TrendDirection};

/// Number of trailing monthly buckets the regression is fitted over.
pub const RECENT_WINDOW_MONTHS: usize = 6;

/// Slope thresholds for trend classification, in amount units per index
/// step. Deliberately not normalized by series magnitude.
const SLOPE_THRESHOLD: f64 = 0.1;

const DEGENERATE_VARIANCE: f64 = 1e-12;

/// Ordinary least-squares line fitted over index positions 0..n-1.
#[derive(Debug, Clone, Copy)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Closed-form normal equations over index positions. A constant series
/// has no variance to explain; its fit is treated as perfect when the
/// residuals also vanish, and worthless otherwise.
pub fn fit_least_squares(values: &[f64]) -> LinearFit {
    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, v)| i as f64 * v).sum();
    let sum_xx: f64 = (0..values.len()).map(|i| (i * i) as f64).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    let slope = if denominator == 0.0 {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denominator
    };
    let intercept = (sum_y - slope * sum_x) / n;

    let y_mean = sum_y / n;
    let ss_res: f64 = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let predicted = slope * i as f64 + intercept;
            (v - predicted).powi(2)
        })
        .sum();
    let ss_tot: f64 = values.iter().map(|v| (v - y_mean).powi(2)).sum();

    let r_squared = if ss_tot < DEGENERATE_VARIANCE {
        if ss_res < DEGENERATE_VARIANCE {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    LinearFit {
        slope,
        intercept,
        r_squared,
    }
}

/// Projects next-month and next-quarter revenue from the chronological
/// monthly series. Fewer than 3 months of history is a valid input and
/// yields the zero-confidence stable forecast, not an error. Predictions
/// are floored at 0; R-squared, clamped to [0, 1], serves as the
/// confidence proxy.
pub fn generate_forecast(monthly_trends: &[MonthlyTrend]) -> ForecastData {
    if monthly_trends.len() < 3 {
        return ForecastData::insufficient_history();
    }

    let amounts: Vec<f64> = monthly_trends.iter().map(|t| t.amount).collect();
    let start = amounts.len().saturating_sub(RECENT_WINDOW_MONTHS);
    let recent = &amounts[start..];

    let fit = fit_least_squares(recent);
    let n = recent.len() as f64;

    let next_month = fit.predict(n).max(0.0);
    let next_quarter =
        ((fit.predict(n) + fit.predict(n + 1.0) + fit.predict(n + 2.0)) / 3.0).max(0.0);
    let confidence = fit.r_squared.clamp(0.0, 1.0);

    let trend_direction = if fit.slope > SLOPE_THRESHOLD {
        TrendDirection::Up
    } else if fit.slope < -SLOPE_THRESHOLD {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };

    ForecastData {
        next_month: ForecastPoint {
            predicted_amount: next_month,
            confidence,
        },
        next_quarter: ForecastPoint {
            predicted_amount: next_quarter,
            confidence,
        },
        trend_direction,
    }
}
