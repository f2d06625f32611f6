use chrono::NaiveDate;
use sqlx::postgres::{PgArguments, PgRow, Postgres};
use sqlx::query::Query;
use sqlx::query_builder::Separated;
use sqlx::{PgConnection, PgPool, QueryBuilder, Row};

use grocery_core::{ColumnKind, Error, ReadSpec, Record, Result, Table, Value};

use crate::export::export_columns;

/// Postgres caps a statement at 65535 bind parameters.
const MAX_BIND_PARAMS: usize = 65_535;

const TOP_PRODUCTS_SQL: &str = r#"
    select p.product_name, sum(s.quantity)::bigint as total_sold
    from fact_sales s
    join dim_product p on s.product_id = p.product_id
    group by p.product_name
    order by total_sold desc, p.product_name
    limit $1
"#;

/// Map sqlx failures onto the warehouse taxonomy.
///
/// SQLSTATE class 23 (integrity constraint violation) is a rejected record;
/// anything else means the backend could not serve the call.
pub fn map_db_error(err: sqlx::Error) -> Error {
    match &err {
        sqlx::Error::Database(db) if db.code().is_some_and(|code| code.starts_with("23")) => {
            Error::ConstraintViolation(db.message().to_string())
        }
        _ => Error::SinkUnavailable(err.to_string()),
    }
}

pub fn rows_per_statement(table: Table) -> usize {
    (MAX_BIND_PARAMS / table.columns().len().max(1)).max(1)
}

pub async fn insert_batch(
    conn: &mut PgConnection,
    table: Table,
    records: &[Record],
) -> Result<Vec<i64>> {
    let columns = table.columns();

    let mut builder = QueryBuilder::<Postgres>::new("insert into ");
    builder.push(table.name()).push(" (");
    {
        let mut separated = builder.separated(", ");
        for column in columns {
            separated.push(column.name);
        }
    }
    builder.push(") ");
    builder.push_values(records, |mut row, record| {
        for column in columns {
            let value = record.get(column.name).cloned().unwrap_or(Value::Null);
            bind_value(&mut row, column.kind, value);
        }
    });
    builder.push(" returning ").push(table.key_column());

    let rows = builder
        .build()
        .fetch_all(&mut *conn)
        .await
        .map_err(map_db_error)?;

    rows.iter()
        .map(|row| row.try_get::<i64, _>(0).map_err(map_db_error))
        .collect()
}

pub async fn fetch(pool: &PgPool, spec: &ReadSpec) -> Result<Vec<Record>> {
    let sql = statement(spec);
    let rows = bind_parameters(sqlx::query(&sql), spec)
        .fetch_all(pool)
        .await
        .map_err(map_db_error)?;

    match spec {
        ReadSpec::Keys { table } => {
            let key = table.key_column();
            rows.iter()
                .map(|row| {
                    let value = row.try_get::<i64, _>(0).map_err(map_db_error)?;
                    Ok(Record::new().with(key, value))
                })
                .collect()
        }
        ReadSpec::Rows { table } => rows.iter().map(|row| decode_row(*table, row)).collect(),
        ReadSpec::LowStock { .. } => rows
            .iter()
            .map(|row| decode_row(Table::Inventory, row))
            .collect(),
        ReadSpec::TopProducts { .. } => rows
            .iter()
            .map(|row| {
                let name = row
                    .try_get::<String, _>("product_name")
                    .map_err(map_db_error)?;
                let total = row.try_get::<i64, _>("total_sold").map_err(map_db_error)?;
                Ok(Record::new()
                    .with("product_name", name)
                    .with("total_sold", total))
            })
            .collect(),
    }
}

/// Statement text for a read; `$n` refers to the n-th entry of `spec.parameters()`.
fn statement(spec: &ReadSpec) -> String {
    match spec {
        ReadSpec::Keys { table } => {
            let key = table.key_column();
            format!("select {key} from {} order by {key}", table.name())
        }
        ReadSpec::Rows { table } => select_rows(*table, ""),
        ReadSpec::LowStock { .. } => select_rows(Table::Inventory, " where stock_qty < $1"),
        ReadSpec::TopProducts { .. } => TOP_PRODUCTS_SQL.to_string(),
    }
}

fn bind_parameters<'q>(
    query: Query<'q, Postgres, PgArguments>,
    spec: &ReadSpec,
) -> Query<'q, Postgres, PgArguments> {
    spec.parameters()
        .into_iter()
        .fold(query, |query, (_, value)| match value {
            Value::Null => query.bind(None::<i64>),
            Value::Bool(value) => query.bind(value),
            Value::Int(value) => query.bind(value),
            Value::Float(value) => query.bind(value),
            Value::Date(value) => query.bind(value),
            Value::Text(value) => query.bind(value),
        })
}

fn select_rows(table: Table, filter: &str) -> String {
    format!(
        "select {} from {}{filter} order by {}",
        export_columns(table).join(", "),
        table.name(),
        table.key_column()
    )
}

fn decode_row(table: Table, row: &PgRow) -> Result<Record> {
    let mut record = Record::new();
    for name in export_columns(table) {
        let kind = table
            .column(name)
            .map_or(ColumnKind::Int, |column| column.kind);
        let value = match kind {
            ColumnKind::Int => row.try_get::<Option<i64>, _>(name).map(Value::from),
            ColumnKind::Float => row.try_get::<Option<f64>, _>(name).map(Value::from),
            ColumnKind::Bool => row.try_get::<Option<bool>, _>(name).map(Value::from),
            ColumnKind::Date => row.try_get::<Option<NaiveDate>, _>(name).map(Value::from),
            ColumnKind::Text => row.try_get::<Option<String>, _>(name).map(Value::from),
        }
        .map_err(map_db_error)?;
        record.insert(name, value);
    }
    Ok(record)
}

fn bind_value<'args>(
    row: &mut Separated<'_, 'args, Postgres, &'static str>,
    kind: ColumnKind,
    value: Value,
) {
    match value {
        Value::Null => match kind {
            ColumnKind::Int => row.push_bind(None::<i64>),
            ColumnKind::Float => row.push_bind(None::<f64>),
            ColumnKind::Bool => row.push_bind(None::<bool>),
            ColumnKind::Date => row.push_bind(None::<NaiveDate>),
            ColumnKind::Text => row.push_bind(None::<String>),
        },
        Value::Int(value) if kind == ColumnKind::Float => row.push_bind(value as f64),
        Value::Int(value) => row.push_bind(value),
        Value::Float(value) => row.push_bind(value),
        Value::Bool(value) => row.push_bind(value),
        Value::Date(value) => row.push_bind(value),
        Value::Text(value) => row.push_bind(value),
    };
}
