use crate::schema::{Donor, RetentionData};
use crate::utils::previous_month;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;

/// Compares the donors active in the calendar month containing `now`
/// against those active in the month before it. With no prior-month
/// donors the retention rate is defined as 0 rather than dividing by
/// zero.
pub fn donor_retention(donors: &[Donor], now: NaiveDate) -> RetentionData {
    let current_key = (now.year(), now.month());
    let prior_key = previous_month(now.year(), now.month());

    let mut current_donors: BTreeSet<&str> = BTreeSet::new();
    let mut prior_donors: BTreeSet<&str> = BTreeSet::new();

    for donor in donors {
        for donation in &donor.donations {
            let key = (donation.date.year(), donation.date.month());
            if key == current_key {
                current_donors.insert(donor.id.as_str());
            }
            if key == prior_key {
                prior_donors.insert(donor.id.as_str());
            }
        }
    }

    let returning_donors = current_donors.intersection(&prior_donors).count();
    let new_donors = current_donors.len() - returning_donors;
    let retention_rate = if prior_donors.is_empty() {
        0.0
    } else {
        returning_donors as f64 / prior_donors.len() as f64
    };

    RetentionData {
        new_donors,
        returning_donors,
        retention_rate,
        churn_rate: 1.0 - retention_rate,
    }
}
