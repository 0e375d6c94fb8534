use crate::schema::{Donor, MonthlyTrend};
use crate::utils::{month_label, month_name};
use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet};

struct MonthBucket {
    amount: f64,
    donors: BTreeSet<String>,
}

/// Buckets every donation into its calendar month and reports totals,
/// distinct contributing donors, and averages. Buckets are keyed by the
/// (year, month) integer pair, so the output is chronologically sorted
/// regardless of how the month labels would collate.
pub fn monthly_trends(donors: &[Donor]) -> Vec<MonthlyTrend> {
    let mut buckets: BTreeMap<(i32, u32), MonthBucket> = BTreeMap::new();

    for donor in donors {
        for donation in &donor.donations {
            let bucket = buckets
                .entry((donation.date.year(), donation.date.month()))
                .or_insert_with(|| MonthBucket {
                    amount: 0.0,
                    donors: BTreeSet::new(),
                });
            bucket.amount += donation.amount;
            bucket.donors.insert(donor.id.clone());
        }
    }

    buckets
        .into_iter()
        .map(|((year, month), bucket)| MonthlyTrend {
            month: month_label(year, month),
            year,
            month_number: month,
            amount: bucket.amount,
            donor_count: bucket.donors.len(),
            average_donation: bucket.amount / bucket.donors.len() as f64,
        })
        .collect()
}

/// Year-agnostic giving profile for one calendar month, summed over the
/// full donation history.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalPattern {
    pub month: String,
    pub month_number: u32,
    pub total_amount: f64,
    pub donation_count: usize,
    pub average_amount: f64,
}

/// Collapses all donations onto the 12 calendar months, regardless of
/// year. Months with no giving history are omitted.
pub fn seasonal_patterns(donors: &[Donor]) -> Vec<SeasonalPattern> {
    let mut totals = [0.0f64; 12];
    let mut counts = [0usize; 12];

    for donor in donors {
        for donation in &donor.donations {
            let idx = donation.date.month0() as usize;
            totals[idx] += donation.amount;
            counts[idx] += 1;
        }
    }

    (0..12)
        .filter(|&idx| counts[idx] > 0)
        .map(|idx| SeasonalPattern {
            month: month_name(idx as u32 + 1).to_string(),
            month_number: idx as u32 + 1,
            total_amount: totals[idx],
            donation_count: counts[idx],
            average_amount: totals[idx] / counts[idx] as f64,
        })
        .collect()
}
