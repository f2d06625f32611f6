//! Typed rows for every table and their record encoding.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::Table;
use crate::error::{Error, Result};
use crate::value::Record;

/// A typed row that can cross the sink/source boundary as a [`Record`].
///
/// Surrogate keys are not part of the typed row; they are assigned by the sink
/// and read back through [`crate::read_keys`].
pub trait TableRow: Sized {
    const TABLE: Table;

    fn to_record(&self) -> Record;

    fn from_record(record: &Record) -> Result<Self>;
}

/// One calendar day of the date dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRow {
    pub date_id: i64,
    pub full_date: NaiveDate,
    pub day: u32,
    pub month: u32,
    pub month_name: String,
    pub quarter: u32,
    pub year: i32,
    pub is_weekend: bool,
}

impl TableRow for DateRow {
    const TABLE: Table = Table::Date;

    fn to_record(&self) -> Record {
        Record::new()
            .with("date_id", self.date_id)
            .with("full_date", self.full_date)
            .with("day", i64::from(self.day))
            .with("month", i64::from(self.month))
            .with("month_name", self.month_name.as_str())
            .with("quarter", i64::from(self.quarter))
            .with("year", i64::from(self.year))
            .with("is_weekend", self.is_weekend)
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            date_id: record.int("date_id")?,
            full_date: record.date("full_date")?,
            day: narrow(record.int("day")?, "day")?,
            month: narrow(record.int("month")?, "month")?,
            month_name: record.text("month_name")?,
            quarter: narrow(record.int("quarter")?, "quarter")?,
            year: narrow(record.int("year")?, "year")?,
            is_weekend: record.bool("is_weekend")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub category_name: String,
}

impl TableRow for CategoryRow {
    const TABLE: Table = Table::Category;

    fn to_record(&self) -> Record {
        Record::new().with("category_name", self.category_name.as_str())
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            category_name: record.text("category_name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_name: String,
    pub category_id: i64,
    pub brand: String,
    pub unit: String,
}

impl TableRow for ProductRow {
    const TABLE: Table = Table::Product;

    fn to_record(&self) -> Record {
        Record::new()
            .with("product_name", self.product_name.as_str())
            .with("category_id", self.category_id)
            .with("brand", self.brand.as_str())
            .with("unit", self.unit.as_str())
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            product_name: record.text("product_name")?,
            category_id: record.int("category_id")?,
            brand: record.text("brand")?,
            unit: record.text("unit")?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerType {
    Retail,
    Wholesale,
}

impl CustomerType {
    pub const ALL: [CustomerType; 2] = [CustomerType::Retail, CustomerType::Wholesale];

    pub fn as_str(self) -> &'static str {
        match self {
            CustomerType::Retail => "Retail",
            CustomerType::Wholesale => "Wholesale",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Retail" => Some(CustomerType::Retail),
            "Wholesale" => Some(CustomerType::Wholesale),
            _ => None,
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRow {
    pub customer_type: CustomerType,
    pub location: String,
    pub loyalty_member: bool,
}

impl TableRow for CustomerRow {
    const TABLE: Table = Table::Customer;

    fn to_record(&self) -> Record {
        Record::new()
            .with("customer_type", self.customer_type.as_str())
            .with("location", self.location.as_str())
            .with("loyalty_member", self.loyalty_member)
    }

    fn from_record(record: &Record) -> Result<Self> {
        let raw_type = record.text("customer_type")?;
        let customer_type = CustomerType::parse(&raw_type).ok_or_else(|| {
            Error::ConstraintViolation(format!("unknown customer_type '{raw_type}'"))
        })?;
        Ok(Self {
            customer_type,
            location: record.text("location")?,
            loyalty_member: record.bool("loyalty_member")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRow {
    pub store_name: String,
    pub city: String,
    pub state: String,
}

impl TableRow for StoreRow {
    const TABLE: Table = Table::Store;

    fn to_record(&self) -> Record {
        Record::new()
            .with("store_name", self.store_name.as_str())
            .with("city", self.city.as_str())
            .with("state", self.state.as_str())
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            store_name: record.text("store_name")?,
            city: record.text("city")?,
            state: record.text("state")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierRow {
    pub supplier_name: String,
    pub lead_time_days: i64,
    pub reliability_score: f64,
}

impl TableRow for SupplierRow {
    const TABLE: Table = Table::Supplier;

    fn to_record(&self) -> Record {
        Record::new()
            .with("supplier_name", self.supplier_name.as_str())
            .with("lead_time_days", self.lead_time_days)
            .with("reliability_score", self.reliability_score)
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            supplier_name: record.text("supplier_name")?,
            lead_time_days: record.int("lead_time_days")?,
            reliability_score: record.float("reliability_score")?,
        })
    }
}

/// One sales transaction. Unit price and unit cost are folded into the totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesFact {
    pub date_id: i64,
    pub product_id: i64,
    pub customer_id: i64,
    pub store_id: i64,
    pub quantity: i64,
    pub revenue: f64,
    pub cost: f64,
}

impl TableRow for SalesFact {
    const TABLE: Table = Table::Sales;

    fn to_record(&self) -> Record {
        Record::new()
            .with("date_id", self.date_id)
            .with("product_id", self.product_id)
            .with("customer_id", self.customer_id)
            .with("store_id", self.store_id)
            .with("quantity", self.quantity)
            .with("revenue", self.revenue)
            .with("cost", self.cost)
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            date_id: record.int("date_id")?,
            product_id: record.int("product_id")?,
            customer_id: record.int("customer_id")?,
            store_id: record.int("store_id")?,
            quantity: record.int("quantity")?,
            revenue: record.float("revenue")?,
            cost: record.float("cost")?,
        })
    }
}

/// Derived stock level. Baseline snapshots carry no date or store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub date_id: Option<i64>,
    pub product_id: i64,
    pub store_id: Option<i64>,
    pub stock_qty: i64,
}

impl TableRow for InventorySnapshot {
    const TABLE: Table = Table::Inventory;

    fn to_record(&self) -> Record {
        Record::new()
            .with("date_id", self.date_id)
            .with("product_id", self.product_id)
            .with("store_id", self.store_id)
            .with("stock_qty", self.stock_qty)
    }

    fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            date_id: record.opt_int("date_id")?,
            product_id: record.int("product_id")?,
            store_id: record.opt_int("store_id")?,
            stock_qty: record.int("stock_qty")?,
        })
    }
}

/// Row of the "best sellers" report: total quantity sold per product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSalesRow {
    pub product_name: String,
    pub total_sold: i64,
}

impl ProductSalesRow {
    pub fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            product_name: record.text("product_name")?,
            total_sold: record.int("total_sold")?,
        })
    }
}

fn narrow<T: TryFrom<i64>>(value: i64, column: &str) -> Result<T> {
    T::try_from(value)
        .map_err(|_| Error::ConstraintViolation(format!("column '{column}' out of range: {value}")))
}
