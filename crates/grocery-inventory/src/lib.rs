//! Inventory reconciliation for the grocery analytics warehouse.
//!
//! Stock levels are derived from aggregated sales facts against a flat
//! baseline rather than tracked incrementally.

pub mod engine;
pub mod model;
pub mod reconcile;

pub use engine::{ReconciliationOutcome, Reconciler};
pub use model::{ReconcileOptions, ReconciliationReport};
pub use reconcile::{
    DEFAULT_BASELINE, DEFAULT_THRESHOLD, SalesAggregate, aggregate_sales, initialize, low_stock,
    query_low_stock, top_products, update,
};
