use crate::schema::{CellValue, RawRow};
use std::collections::BTreeMap;

const FIRST_NAME_ALIASES: &[&str] = &["first_name", "firstname", "fname", "first", "given_name"];
const LAST_NAME_ALIASES: &[&str] = &[
    "last_name",
    "lastname",
    "lname",
    "last",
    "surname",
    "family_name",
];
const AMOUNT_ALIASES: &[&str] = &["amount", "donation", "gift", "contribution", "value", "total"];
const DATE_ALIASES: &[&str] = &[
    "date",
    "donation_date",
    "gift_date",
    "received_date",
    "timestamp",
];
const MONTH_ALIASES: &[&str] = &["month", "donation_month", "gift_month"];
const EMAIL_ALIASES: &[&str] = &["email", "email_address", "e_mail"];
const PHONE_ALIASES: &[&str] = &["phone", "phone_number", "telephone", "mobile"];

/// A raw row reduced to canonical fields. A field with no matching header
/// alias is simply absent; that is not an error.
#[derive(Debug, Clone, Default)]
pub struct MappedRow {
    pub first_name: Option<CellValue>,
    pub last_name: Option<CellValue>,
    pub amount: Option<CellValue>,
    pub date: Option<CellValue>,
    pub month: Option<CellValue>,
    pub email: Option<CellValue>,
    pub phone: Option<CellValue>,
}

/// Lowercases a header and collapses whitespace runs to underscores, so
/// "First Name", "first_name" and "FIRST  NAME" all normalize alike.
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Maps observed column headers onto canonical fields using the ordered
/// alias lists above; the first alias present in the row wins.
pub fn map_row(row: &RawRow) -> MappedRow {
    let normalized: BTreeMap<String, &CellValue> = row
        .iter()
        .map(|(header, value)| (normalize_header(header), value))
        .collect();

    let pick = |aliases: &[&str]| -> Option<CellValue> {
        aliases
            .iter()
            .find_map(|alias| normalized.get(*alias).map(|v| (*v).clone()))
    };

    MappedRow {
        first_name: pick(FIRST_NAME_ALIASES),
        last_name: pick(LAST_NAME_ALIASES),
        amount: pick(AMOUNT_ALIASES),
        date: pick(DATE_ALIASES),
        month: pick(MONTH_ALIASES),
        email: pick(EMAIL_ALIASES),
        phone: pick(PHONE_ALIASES),
    }
}
