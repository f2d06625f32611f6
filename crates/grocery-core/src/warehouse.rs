//! Tabular Sink/Source contracts.
//!
//! The generators and the reconciler never hold a connection of their own; the
//! caller constructs a warehouse and passes it to each step.

use async_trait::async_trait;

use crate::catalog::Table;
use crate::error::{Error, Result};
use crate::rows::TableRow;
use crate::value::{Record, Value};

/// Parameterized read description understood by every [`TabularSource`].
///
/// Parameters are always bound by the source, never spliced into statement text.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadSpec {
    /// Key column of every row of a table, in key order.
    Keys { table: Table },
    /// Every row of a table, key column included.
    Rows { table: Table },
    /// Inventory snapshots with `stock_qty < threshold`.
    LowStock { threshold: i64 },
    /// Total quantity sold per product name, best sellers first.
    TopProducts { limit: i64 },
}

impl ReadSpec {
    /// Table the read is rooted at.
    pub fn table(&self) -> Table {
        match self {
            ReadSpec::Keys { table } | ReadSpec::Rows { table } => *table,
            ReadSpec::LowStock { .. } => Table::Inventory,
            ReadSpec::TopProducts { .. } => Table::Sales,
        }
    }

    /// Named parameters bound by the source.
    pub fn parameters(&self) -> Vec<(&'static str, Value)> {
        match self {
            ReadSpec::Keys { .. } | ReadSpec::Rows { .. } => Vec::new(),
            ReadSpec::LowStock { threshold } => vec![("threshold", Value::Int(*threshold))],
            ReadSpec::TopProducts { limit } => vec![("limit", Value::Int(*limit))],
        }
    }
}

/// Append-only writer of uniformly shaped record batches.
#[async_trait]
pub trait TabularSink: Send + Sync {
    /// Persist `records` into `table` as one all-or-nothing batch.
    ///
    /// Returns the key assigned to each record, in input order.
    async fn append(&self, table: Table, records: &[Record]) -> Result<Vec<i64>>;
}

/// Reader of previously persisted rows.
#[async_trait]
pub trait TabularSource: Send + Sync {
    async fn query(&self, spec: &ReadSpec) -> Result<Vec<Record>>;
}

/// A backend that is both sink and source.
pub trait Warehouse: TabularSink + TabularSource {}

impl<T: TabularSink + TabularSource> Warehouse for T {}

/// Read back the keys of `table`.
pub async fn read_keys<S: TabularSource + ?Sized>(source: &S, table: Table) -> Result<Vec<i64>> {
    let records = source.query(&ReadSpec::Keys { table }).await?;
    let key_column = table.key_column();
    records
        .iter()
        .map(|record| {
            record.int(key_column).map_err(|err| {
                Error::SinkUnavailable(format!("malformed key row from {table}: {err}"))
            })
        })
        .collect()
}

/// Read every row of `T::TABLE` as typed rows.
pub async fn read_rows<T: TableRow, S: TabularSource + ?Sized>(source: &S) -> Result<Vec<T>> {
    let records = source
        .query(&ReadSpec::Rows { table: T::TABLE })
        .await?;
    records.iter().map(T::from_record).collect()
}

/// Append typed rows, returning their assigned keys.
pub async fn append_rows<T: TableRow, S: TabularSink + ?Sized>(
    sink: &S,
    rows: &[T],
) -> Result<Vec<i64>> {
    let records: Vec<Record> = rows.iter().map(TableRow::to_record).collect();
    sink.append(T::TABLE, &records).await
}
