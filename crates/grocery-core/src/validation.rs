use crate::catalog::{ColumnKind, Table};
use crate::error::{Error, Result};
use crate::value::{Record, Value};

/// Validate the shape of a record against the table catalog.
///
/// This checks:
/// - no unknown columns (the surrogate key column is rejected on append)
/// - every non-nullable column is present and not null
/// - every present value matches the column kind
pub fn validate_record(table: Table, record: &Record) -> Result<()> {
    for (name, _) in record.iter() {
        if table.column(name).is_none() {
            return Err(Error::ConstraintViolation(format!(
                "unknown column {table}.{name}"
            )));
        }
    }

    for column in table.columns() {
        let value = record.get(column.name).unwrap_or(&Value::Null);
        if value.is_null() {
            if column.nullable {
                continue;
            }
            return Err(Error::ConstraintViolation(format!(
                "null value in non-nullable column {table}.{}",
                column.name
            )));
        }

        let matches = matches!(
            (column.kind, value),
            (ColumnKind::Int, Value::Int(_))
                | (ColumnKind::Float, Value::Float(_) | Value::Int(_))
                | (ColumnKind::Bool, Value::Bool(_))
                | (ColumnKind::Date, Value::Date(_))
                | (ColumnKind::Text, Value::Text(_))
        );
        if !matches {
            return Err(Error::ConstraintViolation(format!(
                "column {table}.{} expected {:?}, found {value:?}",
                column.name, column.kind
            )));
        }
    }

    Ok(())
}
