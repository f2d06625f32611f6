use std::time::Instant;

use tracing::{info, warn};

use grocery_core::{
    InventorySnapshot, Result, SalesFact, Table, TabularSource, Warehouse, append_rows,
    read_keys, read_rows,
};

use crate::model::{ReconcileOptions, ReconciliationReport};
use crate::reconcile::{initialize, query_low_stock, update};

/// Result of a full reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconciliationOutcome {
    pub report: ReconciliationReport,
    pub low_stock: Vec<InventorySnapshot>,
}

/// Derives inventory snapshots from persisted facts and appends them.
///
/// Every pass appends new rows; nothing is merged or updated in place.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn new_report(&self) -> ReconciliationReport {
        ReconciliationReport {
            run_id: uuid::Uuid::new_v4().to_string(),
            baseline: self.options.baseline,
            threshold: self.options.threshold,
            ..ReconciliationReport::default()
        }
    }

    /// Append one baseline snapshot per product read back from the warehouse.
    pub async fn initialize<W: Warehouse + ?Sized>(
        &self,
        warehouse: &W,
        report: &mut ReconciliationReport,
    ) -> Result<Vec<i64>> {
        let product_keys = read_keys(warehouse, Table::Product).await?;
        let snapshots = initialize(&product_keys, self.options.baseline)?;
        let keys = append_rows(warehouse, &snapshots).await?;
        report.initialized += keys.len() as u64;
        info!(
            products = product_keys.len(),
            baseline = self.options.baseline,
            "inventory initialized"
        );
        Ok(keys)
    }

    /// Append grouped snapshots derived from every persisted sales fact.
    pub async fn update<W: Warehouse + ?Sized>(
        &self,
        warehouse: &W,
        report: &mut ReconciliationReport,
    ) -> Result<Vec<InventorySnapshot>> {
        let facts: Vec<SalesFact> = read_rows(warehouse).await?;
        let snapshots = update(&facts, self.options.baseline)?;

        let mut oversold = 0_u64;
        for snapshot in snapshots.iter().filter(|snapshot| snapshot.stock_qty < 0) {
            oversold += 1;
            warn!(
                date_id = snapshot.date_id,
                product_id = snapshot.product_id,
                store_id = snapshot.store_id,
                stock_qty = snapshot.stock_qty,
                "group sold more than its baseline"
            );
        }

        append_rows(warehouse, &snapshots).await?;
        report.facts_read += facts.len() as u64;
        report.groups += snapshots.len() as u64;
        report.oversold_groups += oversold;
        info!(
            facts = facts.len(),
            groups = snapshots.len(),
            oversold,
            "inventory updated"
        );
        Ok(snapshots)
    }

    /// Snapshots below the configured threshold.
    pub async fn alerts<S: TabularSource + ?Sized>(
        &self,
        source: &S,
        report: &mut ReconciliationReport,
    ) -> Result<Vec<InventorySnapshot>> {
        let rows = query_low_stock(source, self.options.threshold).await?;
        report.low_stock = rows.len() as u64;
        info!(
            threshold = self.options.threshold,
            rows = rows.len(),
            "low stock queried"
        );
        Ok(rows)
    }

    /// Optional initialization pass, then update, then low-stock alerts.
    pub async fn run<W: Warehouse + ?Sized>(
        &self,
        warehouse: &W,
        with_initialize: bool,
    ) -> Result<ReconciliationOutcome> {
        let start = Instant::now();
        let mut report = self.new_report();
        info!(
            run_id = %report.run_id,
            baseline = self.options.baseline,
            threshold = self.options.threshold,
            "reconciliation started"
        );

        if with_initialize {
            self.initialize(warehouse, &mut report).await?;
        }
        self.update(warehouse, &mut report).await?;
        let low_stock = self.alerts(warehouse, &mut report).await?;

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %report.run_id,
            groups = report.groups,
            low_stock = report.low_stock,
            duration_ms = report.duration_ms,
            "reconciliation completed"
        );
        Ok(ReconciliationOutcome { report, low_stock })
    }
}
