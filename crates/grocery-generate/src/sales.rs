use std::ops::RangeInclusive;

use rand::{Rng, RngCore};

use grocery_core::{Error, Result, SalesFact, Table, TabularSource, read_keys};

use crate::dimensions::round2;
use crate::model::CountRange;

pub const QUANTITY: RangeInclusive<i64> = 1..=5;
pub const UNIT_PRICE: RangeInclusive<f64> = 20.0..=200.0;
pub const MARGIN: RangeInclusive<f64> = 0.60..=0.80;

/// Materialized keys of the four dimensions a sale references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceKeys {
    pub dates: Vec<i64>,
    pub products: Vec<i64>,
    pub customers: Vec<i64>,
    pub stores: Vec<i64>,
}

impl ReferenceKeys {
    /// Read the product, customer and store keys back from the source.
    ///
    /// `dates` are the date keys the sink assigned to this run's date rows, so
    /// days persisted by earlier runs never receive new sales.
    pub async fn load<S: TabularSource + ?Sized>(source: &S, dates: Vec<i64>) -> Result<Self> {
        Ok(Self {
            dates,
            products: read_keys(source, Table::Product).await?,
            customers: read_keys(source, Table::Customer).await?,
            stores: read_keys(source, Table::Store).await?,
        })
    }

    /// Fail on the first key set that cannot supply a foreign key.
    pub fn ensure_non_empty(&self) -> Result<()> {
        let sets = [
            (Table::Date, &self.dates),
            (Table::Product, &self.products),
            (Table::Customer, &self.customers),
            (Table::Store, &self.stores),
        ];
        for (table, keys) in sets {
            if keys.is_empty() {
                return Err(Error::EmptyReferenceSet(format!(
                    "no {table} keys to reference from fact_sales"
                )));
            }
        }
        Ok(())
    }
}

/// Simulate `daily` transactions for every date key.
///
/// Keys are drawn independently and with replacement. Nothing is produced
/// unless all four key sets are non-empty.
pub fn generate_sales(
    keys: &ReferenceKeys,
    daily: CountRange,
    rng: &mut dyn RngCore,
) -> Result<Vec<SalesFact>> {
    keys.ensure_non_empty()?;
    daily.validate("daily_transactions")?;

    let mut sales = Vec::new();
    for &date_id in &keys.dates {
        let daily_count = rng.random_range(daily.min..=daily.max);
        for _ in 0..daily_count {
            sales.push(draw_sale(keys, date_id, rng));
        }
    }
    Ok(sales)
}

fn draw_sale(keys: &ReferenceKeys, date_id: i64, rng: &mut dyn RngCore) -> SalesFact {
    let product_id = pick(&keys.products, rng);
    let customer_id = pick(&keys.customers, rng);
    let store_id = pick(&keys.stores, rng);
    let quantity = rng.random_range(QUANTITY);
    let unit_price = round2(rng.random_range(UNIT_PRICE));
    let unit_cost = round2(unit_price * rng.random_range(MARGIN));

    SalesFact {
        date_id,
        product_id,
        customer_id,
        store_id,
        quantity,
        revenue: round2(quantity as f64 * unit_price),
        cost: round2(quantity as f64 * unit_cost),
    }
}

fn pick(keys: &[i64], rng: &mut dyn RngCore) -> i64 {
    keys[rng.random_range(0..keys.len())]
}
