use std::fs;
use std::path::PathBuf;

use grocery_core::{
    CategoryRow, Error, ProductRow, ReadSpec, StoreRow, Table, TabularSink, append_rows,
    read_keys, read_rows,
};
use grocery_store::InMemoryWarehouse;

fn categories() -> Vec<CategoryRow> {
    ["Dairy", "Bakery"]
        .iter()
        .map(|name| CategoryRow {
            category_name: name.to_string(),
        })
        .collect()
}

#[tokio::test]
async fn keys_read_back_match_assigned_keys() {
    let warehouse = InMemoryWarehouse::new();
    let assigned = append_rows(&warehouse, &categories())
        .await
        .expect("append categories");
    let read_back = read_keys(&warehouse, Table::Category)
        .await
        .expect("read keys");
    assert_eq!(assigned, read_back);
}

#[tokio::test]
async fn rejected_batch_commits_nothing() {
    let warehouse = InMemoryWarehouse::new();
    append_rows(&warehouse, &categories())
        .await
        .expect("append categories");

    let products = vec![
        ProductRow {
            product_name: "Milk".to_string(),
            category_id: 1,
            brand: "Acme".to_string(),
            unit: "litre".to_string(),
        },
        ProductRow {
            product_name: "Bread".to_string(),
            category_id: 42,
            brand: "Acme".to_string(),
            unit: "pack".to_string(),
        },
    ];
    let result = append_rows(&warehouse, &products).await;
    assert!(matches!(result, Err(Error::ConstraintViolation(_))));
    assert_eq!(warehouse.row_count(Table::Product).expect("count"), 0);
}

#[tokio::test]
async fn typed_rows_survive_the_round_trip() {
    let warehouse = InMemoryWarehouse::new();
    let stores = vec![StoreRow {
        store_name: "Main Store".to_string(),
        city: "Delhi".to_string(),
        state: "Delhi".to_string(),
    }];
    append_rows(&warehouse, &stores).await.expect("append");
    let read: Vec<StoreRow> = read_rows(&warehouse).await.expect("read");
    assert_eq!(read, stores);
}

#[tokio::test]
async fn empty_append_is_a_no_op() {
    let warehouse = InMemoryWarehouse::new();
    let keys = warehouse.append(Table::Store, &[]).await.expect("append");
    assert!(keys.is_empty());
    assert!(read_keys(&warehouse, Table::Store)
        .await
        .expect("keys")
        .is_empty());
}

#[tokio::test]
async fn export_writes_header_and_rows() {
    let warehouse = InMemoryWarehouse::new();
    append_rows(&warehouse, &categories())
        .await
        .expect("append categories");

    let dir = temp_out_dir("export");
    let exported = warehouse.export_csv(&dir).expect("export");
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].rows, 2);

    let contents = fs::read_to_string(dir.join("dim_category.csv")).expect("read csv");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines, vec!["category_id,category_name", "1,Dairy", "2,Bakery"]);
}

#[tokio::test]
async fn top_products_ranks_by_quantity() {
    use grocery_core::{DateRow, SalesFact, TabularSource};

    let warehouse = InMemoryWarehouse::new();
    append_rows(&warehouse, &categories()).await.expect("categories");
    let products: Vec<ProductRow> = ["Milk", "Bread"]
        .iter()
        .map(|name| ProductRow {
            product_name: name.to_string(),
            category_id: 1,
            brand: "Acme".to_string(),
            unit: "pack".to_string(),
        })
        .collect();
    append_rows(&warehouse, &products).await.expect("products");
    append_rows(
        &warehouse,
        &[StoreRow {
            store_name: "Main Store".to_string(),
            city: "Delhi".to_string(),
            state: "Delhi".to_string(),
        }],
    )
    .await
    .expect("stores");
    let customer = grocery_core::CustomerRow {
        customer_type: grocery_core::CustomerType::Retail,
        location: "Springfield".to_string(),
        loyalty_member: false,
    };
    append_rows(&warehouse, &[customer]).await.expect("customers");
    let full_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    append_rows(
        &warehouse,
        &[DateRow {
            date_id: 20240101,
            full_date,
            day: 1,
            month: 1,
            month_name: "January".to_string(),
            quarter: 1,
            year: 2024,
            is_weekend: false,
        }],
    )
    .await
    .expect("dates");

    let sale = |product_id: i64, quantity: i64| SalesFact {
        date_id: 20240101,
        product_id,
        customer_id: 1,
        store_id: 1,
        quantity,
        revenue: 10.0 * quantity as f64,
        cost: 7.0 * quantity as f64,
    };
    append_rows(&warehouse, &[sale(1, 2), sale(2, 5), sale(1, 1)])
        .await
        .expect("sales");

    let rows = warehouse
        .query(&ReadSpec::TopProducts { limit: 1 })
        .await
        .expect("top products");
    let top = grocery_core::ProductSalesRow::from_record(&rows[0]).expect("decode");
    assert_eq!(rows.len(), 1);
    assert_eq!(top.product_name, "Bread");
    assert_eq!(top.total_sold, 5);
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("grocery_store_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}
