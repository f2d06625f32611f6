use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use grocery_core::{
    Error, InventorySnapshot, ProductSalesRow, ReadSpec, Result, SalesFact, TableRow,
    TabularSource,
};

pub const DEFAULT_BASELINE: i64 = 100;
pub const DEFAULT_THRESHOLD: i64 = 20;

/// Quantity sold for one (date, product, store) group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesAggregate {
    pub date_id: i64,
    pub product_id: i64,
    pub store_id: i64,
    pub qty_sold: i64,
}

/// One baseline snapshot per product, without date or store granularity.
pub fn initialize(product_keys: &[i64], baseline: i64) -> Result<Vec<InventorySnapshot>> {
    if product_keys.is_empty() {
        return Err(Error::EmptyReferenceSet(
            "no product keys to initialize inventory".to_string(),
        ));
    }

    Ok(product_keys
        .iter()
        .map(|&product_id| InventorySnapshot {
            date_id: None,
            product_id,
            store_id: None,
            stock_qty: baseline,
        })
        .collect())
}

/// Sum quantity per (date, product, store), ordered by that key.
///
/// The result does not depend on the order of `facts`.
pub fn aggregate_sales(facts: &[SalesFact]) -> Vec<SalesAggregate> {
    let mut groups: BTreeMap<(i64, i64, i64), i64> = BTreeMap::new();
    for fact in facts {
        *groups
            .entry((fact.date_id, fact.product_id, fact.store_id))
            .or_insert(0) += fact.quantity;
    }

    groups
        .into_iter()
        .map(|((date_id, product_id, store_id), qty_sold)| SalesAggregate {
            date_id,
            product_id,
            store_id,
            qty_sold,
        })
        .collect()
}

/// Per-period snapshots: `baseline - qty_sold` for every sales group.
///
/// The baseline is reused for each group rather than depleted across dates,
/// and the result is not clamped, so an oversold group goes negative.
/// A level outside the `i64` range is an `InvalidRange`.
pub fn update(facts: &[SalesFact], baseline: i64) -> Result<Vec<InventorySnapshot>> {
    aggregate_sales(facts)
        .into_iter()
        .map(|group| {
            let stock_qty = baseline.checked_sub(group.qty_sold).ok_or_else(|| {
                Error::InvalidRange(format!(
                    "baseline {baseline} minus {} sold overflows stock_qty",
                    group.qty_sold
                ))
            })?;
            Ok(InventorySnapshot {
                date_id: Some(group.date_id),
                product_id: group.product_id,
                store_id: Some(group.store_id),
                stock_qty,
            })
        })
        .collect()
}

/// Snapshots strictly below `threshold`, in input order.
pub fn low_stock(snapshots: &[InventorySnapshot], threshold: i64) -> Vec<InventorySnapshot> {
    snapshots
        .iter()
        .filter(|snapshot| snapshot.stock_qty < threshold)
        .cloned()
        .collect()
}

/// Low-stock snapshots read through a parameterized query.
pub async fn query_low_stock<S: TabularSource + ?Sized>(
    source: &S,
    threshold: i64,
) -> Result<Vec<InventorySnapshot>> {
    let records = source.query(&ReadSpec::LowStock { threshold }).await?;
    records.iter().map(InventorySnapshot::from_record).collect()
}

/// Best-selling products by total quantity.
pub async fn top_products<S: TabularSource + ?Sized>(
    source: &S,
    limit: i64,
) -> Result<Vec<ProductSalesRow>> {
    let records = source.query(&ReadSpec::TopProducts { limit }).await?;
    records.iter().map(ProductSalesRow::from_record).collect()
}
