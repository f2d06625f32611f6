//! Core contracts for the grocery analytics warehouse.
//!
//! This crate defines the star-schema catalog, typed rows and their record
//! encoding, the error taxonomy, and the Tabular Sink/Source traits shared by
//! the generators, the inventory reconciler and the store adapters.

pub mod catalog;
pub mod error;
pub mod rows;
pub mod validation;
pub mod value;
pub mod warehouse;

pub use catalog::{Column, ColumnKind, ForeignKey, Table};
pub use error::{Error, Result};
pub use rows::{
    CategoryRow, CustomerRow, CustomerType, DateRow, InventorySnapshot, ProductRow,
    ProductSalesRow, SalesFact, StoreRow, SupplierRow, TableRow,
};
pub use validation::validate_record;
pub use value::{Record, Value};
pub use warehouse::{
    ReadSpec, TabularSink, TabularSource, Warehouse, append_rows, read_keys, read_rows,
};
