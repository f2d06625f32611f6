use std::collections::BTreeSet;

use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use grocery_core::{
    DateRow, Error, ProductRow, SalesFact, Table, append_rows, read_keys, read_rows,
};
use grocery_generate::dimensions::{generate_categories, generate_customers, generate_dates};
use grocery_generate::products::generate_products;
use grocery_generate::sales::generate_sales;
use grocery_generate::{
    CountRange, GenerateError, GenerateOptions, GenerationEngine, LocaleKey, ReferenceKeys,
};
use grocery_store::InMemoryWarehouse;

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn small_options(seed: u64) -> GenerateOptions {
    GenerateOptions {
        seed: Some(seed),
        start_date: day(2024, 1, 1),
        end_date: day(2024, 1, 2),
        products: 5,
        customers: 10,
        suppliers: 3,
        daily_transactions: CountRange::fixed(3),
        locale: LocaleKey::EnUs,
    }
}

#[tokio::test]
async fn end_to_end_small_dataset() {
    let warehouse = InMemoryWarehouse::new();
    let report = GenerationEngine::new(small_options(42))
        .run(&warehouse)
        .await
        .expect("generation");

    assert_eq!(report.rows_for(Table::Date), 2);
    assert_eq!(report.rows_for(Table::Category), 8);
    assert_eq!(report.rows_for(Table::Product), 5);
    assert_eq!(report.rows_for(Table::Store), 2);
    assert_eq!(report.rows_for(Table::Supplier), 3);
    assert_eq!(report.rows_for(Table::Sales), 6);

    let category_keys: BTreeSet<i64> = read_keys(&warehouse, Table::Category)
        .await
        .expect("category keys")
        .into_iter()
        .collect();
    let products: Vec<ProductRow> = read_rows(&warehouse).await.expect("products");
    assert!(products
        .iter()
        .all(|product| category_keys.contains(&product.category_id)));

    let product_keys: BTreeSet<i64> = read_keys(&warehouse, Table::Product)
        .await
        .expect("product keys")
        .into_iter()
        .collect();
    let sales: Vec<SalesFact> = read_rows(&warehouse).await.expect("sales");
    assert_eq!(sales.len(), 6);
    assert!(sales
        .iter()
        .all(|sale| product_keys.contains(&sale.product_id)));
}

#[tokio::test]
async fn date_rows_use_calendar_keys() {
    let warehouse = InMemoryWarehouse::new();
    GenerationEngine::new(small_options(1))
        .run(&warehouse)
        .await
        .expect("generation");

    let dates: Vec<DateRow> = read_rows(&warehouse).await.expect("dates");
    for row in &dates {
        let expected: i64 = row
            .full_date
            .format("%Y%m%d")
            .to_string()
            .parse()
            .expect("numeric key");
        assert_eq!(row.date_id, expected);
        assert!((1..=4).contains(&row.quarter));
        assert_eq!(row.quarter, (row.month - 1) / 3 + 1);
    }
}

#[tokio::test]
async fn same_seed_produces_same_dataset() {
    let first = InMemoryWarehouse::new();
    let second = InMemoryWarehouse::new();
    let mut options = small_options(7);
    options.daily_transactions = CountRange::new(20, 60);

    GenerationEngine::new(options.clone())
        .run(&first)
        .await
        .expect("first run");
    GenerationEngine::new(options)
        .run(&second)
        .await
        .expect("second run");

    for table in Table::ALL {
        assert_eq!(
            first.records(table).expect("first records"),
            second.records(table).expect("second records"),
            "{table} should be deterministic"
        );
    }
}

#[tokio::test]
async fn inverted_date_range_fails_before_writing() {
    let warehouse = InMemoryWarehouse::new();
    let mut options = small_options(3);
    options.start_date = day(2024, 2, 1);
    options.end_date = day(2024, 1, 1);

    let err = GenerationEngine::new(options)
        .run(&warehouse)
        .await
        .expect_err("must fail");
    assert!(matches!(err.core(), Error::InvalidRange(_)));
    let GenerateError::Failed { report, .. } = err;
    assert!(report.tables.is_empty());
    assert_eq!(warehouse.row_count(Table::Date).expect("count"), 0);
}

#[tokio::test]
async fn empty_store_set_writes_no_sales() {
    let warehouse = InMemoryWarehouse::new();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let dates = generate_dates(day(2024, 1, 1), day(2024, 1, 2)).expect("dates");
    let date_keys = append_rows(&warehouse, &dates).await.expect("dates");
    append_rows(&warehouse, &generate_categories())
        .await
        .expect("categories");
    let category_keys = read_keys(&warehouse, Table::Category)
        .await
        .expect("category keys");
    let products =
        generate_products(&category_keys, 5, LocaleKey::EnUs, &mut rng).expect("products");
    append_rows(&warehouse, &products).await.expect("products");
    let customers = generate_customers(4, LocaleKey::EnUs, &mut rng);
    append_rows(&warehouse, &customers)
        .await
        .expect("customers");

    let keys = ReferenceKeys::load(&warehouse, date_keys)
        .await
        .expect("keys");
    assert_eq!(keys.dates, vec![20240101, 20240102]);
    assert!(keys.stores.is_empty());

    let result = generate_sales(&keys, CountRange::fixed(3), &mut rng);
    assert!(matches!(result, Err(Error::EmptyReferenceSet(_))));
    assert_eq!(warehouse.row_count(Table::Sales).expect("count"), 0);
}

#[tokio::test]
async fn rerun_over_new_range_only_sells_on_its_own_dates() {
    let warehouse = InMemoryWarehouse::new();
    let mut first = small_options(11);
    first.daily_transactions = CountRange::fixed(2);
    GenerationEngine::new(first)
        .run(&warehouse)
        .await
        .expect("first run");

    let mut second = small_options(12);
    second.start_date = day(2024, 2, 1);
    second.end_date = day(2024, 2, 1);
    second.daily_transactions = CountRange::fixed(2);
    let report = GenerationEngine::new(second)
        .run(&warehouse)
        .await
        .expect("second run");
    assert_eq!(report.rows_for(Table::Sales), 2);

    let sales: Vec<SalesFact> = read_rows(&warehouse).await.expect("sales");
    let january = sales
        .iter()
        .filter(|sale| sale.date_id < 20240201)
        .count();
    assert_eq!(january, 4);
    assert_eq!(sales.len(), 6);
    assert_eq!(
        sales
            .iter()
            .filter(|sale| sale.date_id == 20240201)
            .count(),
        2
    );
}
