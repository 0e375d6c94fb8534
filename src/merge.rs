use crate::aggregate::recompute_metrics;
use crate::schema::{Donation, Donor};
use log::debug;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

/// Outcome of merging one upload into the existing donor set: a fresh
/// merged snapshot plus counters describing what changed. The inputs are
/// never mutated.
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub donors: Vec<Donor>,
    pub donors_added: usize,
    pub donors_merged: usize,
    pub donations_added: usize,
    pub duplicates_suppressed: usize,
}

/// Merges a freshly aggregated donor batch into an existing donor set,
/// returning a new snapshot. Identity collisions resolve by donor key;
/// duplicate donations are suppressed in two layers: exact identifier
/// match first, then a (date, amount) match that catches re-imports which
/// regenerate identifiers but repeat the same transaction. Every donor in
/// the output is duplicate-free under both layers, so merge output is a
/// fixed point: merging a snapshot with itself changes nothing. Merge
/// never fails.
pub fn merge_donor_sets(existing: &[Donor], incoming: &[Donor]) -> MergeReport {
    let mut donors_added = 0;
    let mut donors_merged = 0;
    let mut donations_added = 0;
    let mut duplicates_suppressed = 0;

    let mut merged: BTreeMap<String, Donor> = BTreeMap::new();
    for donor in existing {
        let (clean, suppressed) = suppress_internal_duplicates(donor);
        duplicates_suppressed += suppressed;
        merged.insert(clean.identity_key(), clean);
    }

    for new_donor in incoming {
        match merged.entry(new_donor.identity_key()) {
            Entry::Vacant(slot) => {
                let (clean, suppressed) = suppress_internal_duplicates(new_donor);
                duplicates_suppressed += suppressed;
                donors_added += 1;
                donations_added += clean.donation_count;
                slot.insert(clean);
            }
            Entry::Occupied(mut slot) => {
                let donor = slot.get_mut();
                donors_merged += 1;

                let known_ids: HashSet<&str> =
                    donor.donations.iter().map(|d| d.id.as_str()).collect();
                let survivors: Vec<Donation> = new_donor
                    .donations
                    .iter()
                    .filter(|candidate| !known_ids.contains(candidate.id.as_str()))
                    .filter(|candidate| {
                        !donor
                            .donations
                            .iter()
                            .any(|d| d.date == candidate.date && d.amount == candidate.amount)
                    })
                    .cloned()
                    .collect();

                duplicates_suppressed += new_donor.donations.len() - survivors.len();

                if !survivors.is_empty() {
                    donations_added += survivors.len();
                    for mut donation in survivors {
                        donation.donor_id = donor.id.clone();
                        donor.donations.push(donation);
                    }
                    recompute_metrics(donor);
                }

                if donor.email.is_none() {
                    donor.email = new_donor.email.clone();
                }
                if donor.phone.is_none() {
                    donor.phone = new_donor.phone.clone();
                }
            }
        }
    }

    debug!(
        "merge: {} donors added, {} merged, {} donations added, {} duplicates suppressed",
        donors_added, donors_merged, donations_added, duplicates_suppressed
    );

    MergeReport {
        donors: merged.into_values().collect(),
        donors_added,
        donors_merged,
        donations_added,
        duplicates_suppressed,
    }
}

/// Applies both suppression layers within a single donor's owned
/// sequence, keeping the first occurrence. A freshly aggregated batch may
/// carry the same transaction twice (e.g. the same gift listed once as
/// text and once as a number); a snapshot that already passed through
/// merge comes back unchanged.
fn suppress_internal_duplicates(donor: &Donor) -> (Donor, usize) {
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut kept: Vec<Donation> = Vec::new();

    for donation in &donor.donations {
        if !seen_ids.insert(donation.id.as_str()) {
            continue;
        }
        if kept
            .iter()
            .any(|d| d.date == donation.date && d.amount == donation.amount)
        {
            continue;
        }
        kept.push(donation.clone());
    }

    let suppressed = donor.donations.len() - kept.len();
    let mut clean = donor.clone();
    if suppressed > 0 {
        clean.donations = kept;
        recompute_metrics(&mut clean);
    }
    (clean, suppressed)
}
