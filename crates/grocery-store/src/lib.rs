//! Tabular Sink/Source backends.

pub mod export;
pub mod memory;
pub mod postgres;

pub use export::{export_columns, write_table_csv};
pub use memory::{ExportedTable, InMemoryWarehouse};
pub use postgres::PostgresWarehouse;
