use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use grocery_core::{
    Error, ReadSpec, Record, Result, Table, TabularSink, TabularSource, Value, validate_record,
};

use crate::export::write_table_csv;

/// In-process warehouse with sink-assigned keys and foreign key enforcement.
///
/// Keys start at 1 per table. A batch is validated in full before any row is
/// committed, so a rejected append leaves the table untouched.
#[derive(Debug, Default)]
pub struct InMemoryWarehouse {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeMap<Table, TableData>,
}

#[derive(Debug, Default)]
struct TableData {
    rows: BTreeMap<i64, Record>,
    last_key: i64,
}

/// Summary of one exported CSV file.
#[derive(Debug, Clone)]
pub struct ExportedTable {
    pub table: Table,
    pub path: PathBuf,
    pub rows: u64,
    pub bytes: u64,
}

impl InMemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored in `table`.
    pub fn row_count(&self, table: Table) -> Result<usize> {
        let state = self.lock()?;
        Ok(state.tables.get(&table).map_or(0, |data| data.rows.len()))
    }

    /// Snapshot of every row of `table`, key column included, in key order.
    pub fn records(&self, table: Table) -> Result<Vec<Record>> {
        let state = self.lock()?;
        Ok(state.rows(table).cloned().collect())
    }

    /// Write one `<table>.csv` per non-empty table into `dir`.
    pub fn export_csv(&self, dir: &Path) -> std::result::Result<Vec<ExportedTable>, csv::Error> {
        let snapshot: Vec<(Table, Vec<Record>)> = {
            let state = self
                .state
                .lock()
                .map_err(|_| csv::Error::from(std::io::Error::other("warehouse lock poisoned")))?;
            state
                .tables
                .iter()
                .filter(|(_, data)| !data.rows.is_empty())
                .map(|(table, data)| (*table, data.rows.values().cloned().collect()))
                .collect()
        };

        let mut exported = Vec::with_capacity(snapshot.len());
        for (table, records) in snapshot {
            let path = dir.join(format!("{}.csv", table.name()));
            let bytes = write_table_csv(&path, table, &records)?;
            debug!(table = %table, rows = records.len(), bytes, "table exported");
            exported.push(ExportedTable {
                table,
                path,
                rows: records.len() as u64,
                bytes,
            });
        }
        Ok(exported)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::SinkUnavailable("warehouse lock poisoned".to_string()))
    }
}

impl State {
    fn rows(&self, table: Table) -> impl Iterator<Item = &Record> {
        self.tables
            .get(&table)
            .into_iter()
            .flat_map(|data| data.rows.values())
    }

    fn has_key(&self, table: Table, key: i64) -> bool {
        self.tables
            .get(&table)
            .is_some_and(|data| data.rows.contains_key(&key))
    }

    fn append(&mut self, table: Table, records: &[Record]) -> Result<Vec<i64>> {
        let last_key = self.tables.get(&table).map_or(0, |data| data.last_key);
        let mut keys = Vec::with_capacity(records.len());
        let mut batch_keys = BTreeSet::new();

        for (idx, record) in records.iter().enumerate() {
            validate_record(table, record)?;

            for fk in table.foreign_keys() {
                let Some(value) = record.opt_int(fk.column)? else {
                    continue;
                };
                if !self.has_key(fk.references, value) {
                    return Err(Error::ConstraintViolation(format!(
                        "{table}.{} = {value} references missing {} row",
                        fk.column, fk.references
                    )));
                }
            }

            let key = if table.has_surrogate_key() {
                last_key + idx as i64 + 1
            } else {
                let key = record.int(table.key_column())?;
                if self.has_key(table, key) || !batch_keys.insert(key) {
                    return Err(Error::ConstraintViolation(format!(
                        "duplicate key {table}.{} = {key}",
                        table.key_column()
                    )));
                }
                key
            };
            keys.push(key);
        }

        let data = self.tables.entry(table).or_default();
        for (record, key) in records.iter().zip(&keys) {
            data.rows.insert(*key, keyed_record(table, *key, record));
            data.last_key = data.last_key.max(*key);
        }

        Ok(keys)
    }

    fn query(&self, spec: &ReadSpec) -> Result<Vec<Record>> {
        match spec {
            ReadSpec::Keys { table } => {
                let key_column = table.key_column();
                Ok(self
                    .tables
                    .get(table)
                    .into_iter()
                    .flat_map(|data| data.rows.keys())
                    .map(|key| Record::new().with(key_column, *key))
                    .collect())
            }
            ReadSpec::Rows { table } => Ok(self.rows(*table).cloned().collect()),
            ReadSpec::LowStock { threshold } => {
                let mut rows = Vec::new();
                for record in self.rows(Table::Inventory) {
                    if record.int("stock_qty")? < *threshold {
                        rows.push(record.clone());
                    }
                }
                Ok(rows)
            }
            ReadSpec::TopProducts { limit } => self.top_products(*limit),
        }
    }

    fn top_products(&self, limit: i64) -> Result<Vec<Record>> {
        let mut names: HashMap<i64, String> = HashMap::new();
        for record in self.rows(Table::Product) {
            names.insert(record.int("product_id")?, record.text("product_name")?);
        }

        let mut totals: BTreeMap<String, i64> = BTreeMap::new();
        for record in self.rows(Table::Sales) {
            let product_id = record.int("product_id")?;
            if let Some(name) = names.get(&product_id) {
                *totals.entry(name.clone()).or_insert(0) += record.int("quantity")?;
            }
        }

        let mut ranked: Vec<(String, i64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(name, total)| {
                Record::new()
                    .with("product_name", name)
                    .with("total_sold", total)
            })
            .collect())
    }
}

fn keyed_record(table: Table, key: i64, record: &Record) -> Record {
    if !table.has_surrogate_key() {
        return record.clone();
    }
    let mut keyed = Record::new().with(table.key_column(), key);
    for column in table.columns() {
        let value = record.get(column.name).cloned().unwrap_or(Value::Null);
        keyed.insert(column.name, value);
    }
    keyed
}

#[async_trait]
impl TabularSink for InMemoryWarehouse {
    async fn append(&self, table: Table, records: &[Record]) -> Result<Vec<i64>> {
        let mut state = self.lock()?;
        let keys = state.append(table, records)?;
        debug!(table = %table, rows = keys.len(), "batch appended");
        Ok(keys)
    }
}

#[async_trait]
impl TabularSource for InMemoryWarehouse {
    async fn query(&self, spec: &ReadSpec) -> Result<Vec<Record>> {
        let state = self.lock()?;
        state.query(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str) -> Record {
        Record::new().with("category_name", name)
    }

    fn product(category_id: i64) -> Record {
        Record::new()
            .with("product_name", "Apple")
            .with("category_id", category_id)
            .with("brand", "Acme")
            .with("unit", "kg")
    }

    #[test]
    fn assigns_sequential_keys_across_batches() {
        let mut state = State::default();
        let first = state
            .append(Table::Category, &[category("Dairy"), category("Fruits")])
            .expect("first batch");
        let second = state
            .append(Table::Category, &[category("Bakery")])
            .expect("second batch");
        assert_eq!(first, vec![1, 2]);
        assert_eq!(second, vec![3]);
    }

    #[test]
    fn dangling_foreign_key_rejects_whole_batch() {
        let mut state = State::default();
        state
            .append(Table::Category, &[category("Dairy")])
            .expect("categories");

        let result = state.append(Table::Product, &[product(1), product(99)]);
        assert!(matches!(result, Err(Error::ConstraintViolation(_))));
        assert_eq!(state.rows(Table::Product).count(), 0);
    }

    #[test]
    fn date_keys_come_from_the_record_and_must_be_unique() {
        let mut state = State::default();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        let record = Record::new()
            .with("date_id", 20240101_i64)
            .with("full_date", date)
            .with("day", 1_i64)
            .with("month", 1_i64)
            .with("month_name", "January")
            .with("quarter", 1_i64)
            .with("year", 2024_i64)
            .with("is_weekend", false);

        let keys = state
            .append(Table::Date, std::slice::from_ref(&record))
            .expect("first insert");
        assert_eq!(keys, vec![20240101]);
        assert!(matches!(
            state.append(Table::Date, &[record]),
            Err(Error::ConstraintViolation(_))
        ));
    }

    #[test]
    fn low_stock_filter_is_strict() {
        let mut state = State::default();
        state
            .append(Table::Category, &[category("Dairy")])
            .expect("categories");
        state
            .append(Table::Product, &[product(1)])
            .expect("products");
        let snapshots: Vec<Record> = [5_i64, 25, 19, 20, 0]
            .iter()
            .map(|qty| {
                Record::new()
                    .with("product_id", 1_i64)
                    .with("stock_qty", *qty)
            })
            .collect();
        state
            .append(Table::Inventory, &snapshots)
            .expect("snapshots");

        let rows = state
            .query(&ReadSpec::LowStock { threshold: 20 })
            .expect("query");
        let levels: Vec<i64> = rows
            .iter()
            .map(|row| row.int("stock_qty").expect("stock"))
            .collect();
        assert_eq!(levels, vec![5, 19, 0]);
    }
}
