//! Static catalog of the star-schema tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Float,
    Bool,
    Date,
    Text,
}

/// Data column of a table (surrogate keys excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl Column {
    const fn required(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
        }
    }

    const fn optional(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            nullable: true,
        }
    }
}

/// Foreign key from a column to the key column of another table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: Table,
}

/// Tables of the grocery analytics warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Date,
    Category,
    Product,
    Customer,
    Store,
    Supplier,
    Sales,
    Inventory,
}

use ColumnKind::{Bool, Date, Float, Int, Text};

const DATE_COLUMNS: &[Column] = &[
    Column::required("date_id", Int),
    Column::required("full_date", Date),
    Column::required("day", Int),
    Column::required("month", Int),
    Column::required("month_name", Text),
    Column::required("quarter", Int),
    Column::required("year", Int),
    Column::required("is_weekend", Bool),
];
const CATEGORY_COLUMNS: &[Column] = &[Column::required("category_name", Text)];
const PRODUCT_COLUMNS: &[Column] = &[
    Column::required("product_name", Text),
    Column::required("category_id", Int),
    Column::required("brand", Text),
    Column::required("unit", Text),
];
const CUSTOMER_COLUMNS: &[Column] = &[
    Column::required("customer_type", Text),
    Column::required("location", Text),
    Column::required("loyalty_member", Bool),
];
const STORE_COLUMNS: &[Column] = &[
    Column::required("store_name", Text),
    Column::required("city", Text),
    Column::required("state", Text),
];
const SUPPLIER_COLUMNS: &[Column] = &[
    Column::required("supplier_name", Text),
    Column::required("lead_time_days", Int),
    Column::required("reliability_score", Float),
];
const SALES_COLUMNS: &[Column] = &[
    Column::required("date_id", Int),
    Column::required("product_id", Int),
    Column::required("customer_id", Int),
    Column::required("store_id", Int),
    Column::required("quantity", Int),
    Column::required("revenue", Float),
    Column::required("cost", Float),
];
const INVENTORY_COLUMNS: &[Column] = &[
    Column::optional("date_id", Int),
    Column::required("product_id", Int),
    Column::optional("store_id", Int),
    Column::required("stock_qty", Int),
];

const PRODUCT_FKS: &[ForeignKey] = &[ForeignKey {
    column: "category_id",
    references: Table::Category,
}];
const SALES_FKS: &[ForeignKey] = &[
    ForeignKey {
        column: "date_id",
        references: Table::Date,
    },
    ForeignKey {
        column: "product_id",
        references: Table::Product,
    },
    ForeignKey {
        column: "customer_id",
        references: Table::Customer,
    },
    ForeignKey {
        column: "store_id",
        references: Table::Store,
    },
];
const INVENTORY_FKS: &[ForeignKey] = &[
    ForeignKey {
        column: "date_id",
        references: Table::Date,
    },
    ForeignKey {
        column: "product_id",
        references: Table::Product,
    },
    ForeignKey {
        column: "store_id",
        references: Table::Store,
    },
];

impl Table {
    /// Tables in dependency order: parents always precede children.
    pub const ALL: [Table; 8] = [
        Table::Date,
        Table::Category,
        Table::Product,
        Table::Customer,
        Table::Store,
        Table::Supplier,
        Table::Sales,
        Table::Inventory,
    ];

    /// Physical table name.
    pub fn name(self) -> &'static str {
        match self {
            Table::Date => "dim_date",
            Table::Category => "dim_category",
            Table::Product => "dim_product",
            Table::Customer => "dim_customer",
            Table::Store => "dim_store",
            Table::Supplier => "dim_supplier",
            Table::Sales => "fact_sales",
            Table::Inventory => "fact_inventory",
        }
    }

    /// Column holding the row key.
    pub fn key_column(self) -> &'static str {
        match self {
            Table::Date => "date_id",
            Table::Category => "category_id",
            Table::Product => "product_id",
            Table::Customer => "customer_id",
            Table::Store => "store_id",
            Table::Supplier => "supplier_id",
            Table::Sales => "sales_id",
            Table::Inventory => "inventory_id",
        }
    }

    /// Whether the key is assigned by the sink. `dim_date` derives its key from the calendar date.
    pub fn has_surrogate_key(self) -> bool {
        !matches!(self, Table::Date)
    }

    /// Data columns in insertion order.
    pub fn columns(self) -> &'static [Column] {
        match self {
            Table::Date => DATE_COLUMNS,
            Table::Category => CATEGORY_COLUMNS,
            Table::Product => PRODUCT_COLUMNS,
            Table::Customer => CUSTOMER_COLUMNS,
            Table::Store => STORE_COLUMNS,
            Table::Supplier => SUPPLIER_COLUMNS,
            Table::Sales => SALES_COLUMNS,
            Table::Inventory => INVENTORY_COLUMNS,
        }
    }

    pub fn foreign_keys(self) -> &'static [ForeignKey] {
        match self {
            Table::Product => PRODUCT_FKS,
            Table::Sales => SALES_FKS,
            Table::Inventory => INVENTORY_FKS,
            _ => &[],
        }
    }

    pub fn column(self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|column| column.name == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
