use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single cell crossing the sink/source boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// Render the value as a CSV cell. Floats keep two decimals (currency and scores).
    pub fn to_csv(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(value) => value.to_string(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => format!("{value:.2}"),
            Value::Date(value) => value.format("%Y-%m-%d").to_string(),
            Value::Text(value) => value.clone(),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// An ordered column-name to value mapping; one row of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column, replacing any previous value under the same name.
    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn int(&self, column: &str) -> Result<i64> {
        self.typed(column, "integer", Value::as_i64)
    }

    pub fn opt_int(&self, column: &str) -> Result<Option<i64>> {
        match self.get(column) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.int(column).map(Some),
        }
    }

    pub fn float(&self, column: &str) -> Result<f64> {
        self.typed(column, "float", Value::as_f64)
    }

    pub fn bool(&self, column: &str) -> Result<bool> {
        self.typed(column, "boolean", Value::as_bool)
    }

    pub fn date(&self, column: &str) -> Result<NaiveDate> {
        self.typed(column, "date", Value::as_date)
    }

    pub fn text(&self, column: &str) -> Result<String> {
        self.typed(column, "text", |value| value.as_str().map(str::to_string))
    }

    fn typed<T>(
        &self,
        column: &str,
        expected: &str,
        extract: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<T> {
        let value = self.get(column).ok_or_else(|| {
            Error::ConstraintViolation(format!("missing column '{column}'"))
        })?;
        extract(value).ok_or_else(|| {
            Error::ConstraintViolation(format!(
                "column '{column}' expected {expected}, found {value:?}"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_existing_column() {
        let mut record = Record::new().with("stock_qty", 10_i64);
        record.insert("stock_qty", 4_i64);
        assert_eq!(record.len(), 1);
        assert_eq!(record.int("stock_qty").expect("int"), 4);
    }

    #[test]
    fn typed_getters_report_mismatches() {
        let record = Record::new().with("city", "Delhi");
        assert!(matches!(
            record.int("city"),
            Err(Error::ConstraintViolation(_))
        ));
        assert!(matches!(
            record.int("state"),
            Err(Error::ConstraintViolation(_))
        ));
        assert_eq!(record.opt_int("state").expect("optional"), None);
    }

    #[test]
    fn csv_rendering_keeps_currency_scale() {
        assert_eq!(Value::Float(12.5).to_csv(), "12.50");
        assert_eq!(Value::Null.to_csv(), "");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap_or_default();
        assert_eq!(Value::Date(date).to_csv(), "2024-03-09");
    }

    #[test]
    fn values_serialize_untagged() {
        let record = Record::new()
            .with("product_id", 7_i64)
            .with("store_id", Value::Null)
            .with("city", "Noida");
        let json = serde_json::to_value(record.iter().map(|(_, value)| value).collect::<Vec<_>>())
            .expect("json");
        assert_eq!(json, serde_json::json!([7, null, "Noida"]));
    }
}
