//! Independent dimensions: date, category, store, supplier, customer.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::{Rng, RngCore};

use grocery_core::{
    CategoryRow, CustomerRow, CustomerType, DateRow, Error, Result, StoreRow, SupplierRow,
};

use crate::faker::{self, LocaleKey};

pub const CATEGORY_NAMES: [&str; 8] = [
    "Vegetables",
    "Fruits",
    "Dairy",
    "Bakery",
    "Beverages",
    "Snacks",
    "Frozen",
    "Grains",
];

/// `(store_name, city, state)`
pub const STORES: [(&str, &str, &str); 2] = [
    ("Main Store", "Delhi", "Delhi"),
    ("Branch Store", "Noida", "UP"),
];

const LEAD_TIME_DAYS: std::ops::RangeInclusive<i64> = 2..=10;
const RELIABILITY: std::ops::RangeInclusive<f64> = 0.70..=0.98;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Key of a calendar day: `YYYYMMDD` as an integer.
pub fn date_key(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

pub fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

/// One row per day of `start..=end`.
pub fn generate_dates(start: NaiveDate, end: NaiveDate) -> Result<Vec<DateRow>> {
    if start > end {
        return Err(Error::InvalidRange(format!(
            "date range start {start} is after end {end}"
        )));
    }

    Ok(start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(date_row)
        .collect())
}

fn date_row(date: NaiveDate) -> DateRow {
    let month = date.month();
    DateRow {
        date_id: date_key(date),
        full_date: date,
        day: date.day(),
        month,
        month_name: MONTH_NAMES[date.month0() as usize].to_string(),
        quarter: quarter_of(month),
        year: date.year(),
        is_weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
    }
}

pub fn generate_categories() -> Vec<CategoryRow> {
    CATEGORY_NAMES
        .iter()
        .map(|name| CategoryRow {
            category_name: name.to_string(),
        })
        .collect()
}

pub fn generate_stores() -> Vec<StoreRow> {
    STORES
        .iter()
        .map(|(name, city, state)| StoreRow {
            store_name: name.to_string(),
            city: city.to_string(),
            state: state.to_string(),
        })
        .collect()
}

pub fn generate_suppliers(
    count: usize,
    locale: LocaleKey,
    rng: &mut dyn RngCore,
) -> Vec<SupplierRow> {
    (0..count)
        .map(|_| SupplierRow {
            supplier_name: faker::company(locale, rng),
            lead_time_days: rng.random_range(LEAD_TIME_DAYS),
            reliability_score: round2(rng.random_range(RELIABILITY)),
        })
        .collect()
}

pub fn generate_customers(
    count: usize,
    locale: LocaleKey,
    rng: &mut dyn RngCore,
) -> Vec<CustomerRow> {
    (0..count)
        .map(|_| {
            let customer_type = CustomerType::ALL[rng.random_range(0..CustomerType::ALL.len())];
            CustomerRow {
                customer_type,
                location: faker::city(locale, rng),
                loyalty_member: rng.random_bool(0.5),
            }
        })
        .collect()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
