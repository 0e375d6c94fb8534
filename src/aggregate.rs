use crate::schema::{donor_key, Donation, DonationRecord, Donor, FrequencyTier};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Frequency tier is a pure step function of lifetime donation count.
pub fn frequency_for_count(count: usize) -> FrequencyTier {
    match count {
        0 | 1 => FrequencyTier::OneTime,
        2 | 3 => FrequencyTier::Occasional,
        4..=6 => FrequencyTier::Regular,
        _ => FrequencyTier::Frequent,
    }
}

/// Groups validated donation records by donor identity key, minting one
/// donor per group and back-filling each donation's owner reference.
/// Grouping is keyed through a BTreeMap so donor order is deterministic.
pub fn aggregate_donors(records: Vec<DonationRecord>) -> Vec<Donor> {
    let mut groups: BTreeMap<String, Vec<DonationRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(donor_key(&record.first_name, &record.last_name))
            .or_default()
            .push(record);
    }

    groups.into_values().map(build_donor).collect()
}

fn build_donor(records: Vec<DonationRecord>) -> Donor {
    let donor_id = Uuid::new_v4().to_string();
    let head = &records[0];

    let donations: Vec<Donation> = records
        .iter()
        .map(|record| Donation {
            id: record.id.clone(),
            amount: record.amount,
            date: record.date,
            month: record.month.clone(),
            year: record.year,
            donor_id: donor_id.clone(),
        })
        .collect();

    let mut donor = Donor {
        id: donor_id,
        first_name: head.first_name.clone(),
        last_name: head.last_name.clone(),
        email: head.email.clone(),
        phone: head.phone.clone(),
        total_amount: 0.0,
        donation_count: 0,
        average_donation: 0.0,
        first_donation: head.date,
        last_donation: head.date,
        frequency: FrequencyTier::OneTime,
        donations,
    };
    recompute_metrics(&mut donor);
    donor
}

/// Recomputes every derived metric from the owned donation sequence,
/// sorted by date ascending. Recomputation is always total, never
/// incremental. A donor is only created from at least one donation, so
/// the sequence is never empty here.
pub fn recompute_metrics(donor: &mut Donor) {
    donor.donations.sort_by_key(|d| d.date);

    donor.total_amount = donor.donations.iter().map(|d| d.amount).sum();
    donor.donation_count = donor.donations.len();
    donor.average_donation = donor.total_amount / donor.donation_count as f64;
    if let (Some(first), Some(last)) = (donor.donations.first(), donor.donations.last()) {
        donor.first_donation = first.date;
        donor.last_donation = last.date;
    }
    donor.frequency = frequency_for_count(donor.donation_count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(first: &str, last: &str, amount: f64, date: NaiveDate) -> DonationRecord {
        DonationRecord {
            id: Uuid::new_v4().to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            amount,
            date,
            month: date.format("%B %Y").to_string(),
            year: chrono::Datelike::year(&date),
            email: None,
            phone: None,
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_frequency_tiers() {
        assert_eq!(frequency_for_count(1), FrequencyTier::OneTime);
        assert_eq!(frequency_for_count(3), FrequencyTier::Occasional);
        assert_eq!(frequency_for_count(4), FrequencyTier::Regular);
        assert_eq!(frequency_for_count(6), FrequencyTier::Regular);
        assert_eq!(frequency_for_count(10), FrequencyTier::Frequent);
    }

    #[test]
    fn test_groups_by_case_insensitive_name() {
        let donors = aggregate_donors(vec![
            record("Jane", "Doe", 100.0, date(2024, 1, 15)),
            record("JANE", "DOE", 50.0, date(2024, 2, 10)),
            record("John", "Smith", 25.0, date(2024, 1, 20)),
        ]);

        assert_eq!(donors.len(), 2);
        let jane = donors.iter().find(|d| d.first_name == "Jane").unwrap();
        assert_eq!(jane.donation_count, 2);
        assert_eq!(jane.total_amount, 150.0);
        assert_eq!(jane.average_donation, 75.0);
        assert_eq!(jane.frequency, FrequencyTier::Occasional);
    }

    #[test]
    fn test_donations_carry_owner_back_reference() {
        let donors = aggregate_donors(vec![
            record("Jane", "Doe", 100.0, date(2024, 1, 15)),
            record("Jane", "Doe", 50.0, date(2024, 2, 10)),
        ]);

        let jane = &donors[0];
        assert!(jane.donations.iter().all(|d| d.donor_id == jane.id));
    }

    #[test]
    fn test_metrics_and_date_bounds() {
        let donors = aggregate_donors(vec![
            record("Jane", "Doe", 30.0, date(2024, 3, 1)),
            record("Jane", "Doe", 10.0, date(2023, 11, 5)),
            record("Jane", "Doe", 20.0, date(2024, 1, 20)),
        ]);

        let jane = &donors[0];
        assert_eq!(jane.first_donation, date(2023, 11, 5));
        assert_eq!(jane.last_donation, date(2024, 3, 1));
        assert_eq!(jane.total_amount, 60.0);
        assert_eq!(jane.average_donation, 20.0);
        // Owned sequence is kept sorted by date ascending.
        let dates: Vec<NaiveDate> = jane.donations.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![date(2023, 11, 5), date(2024, 1, 20), date(2024, 3, 1)]
        );
    }
}
