use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use grocery_core::{Result, Table, TableRow, Warehouse, append_rows, read_keys};

use crate::dimensions::{
    generate_categories, generate_customers, generate_dates, generate_stores, generate_suppliers,
};
use crate::errors::GenerateError;
use crate::model::{GenerateOptions, GenerationReport};
use crate::products::generate_products;
use crate::sales::{ReferenceKeys, generate_sales};

/// Entry point for populating a warehouse with a synthetic dataset.
///
/// Phases run strictly in order: dimensions are appended first, their keys are
/// read back, and only then are facts generated against those keys. Sales are
/// drawn over the dates of this run only.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub async fn run<W: Warehouse + ?Sized>(
        &self,
        warehouse: &W,
    ) -> std::result::Result<GenerationReport, GenerateError> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let seed = self
            .options
            .seed
            .unwrap_or_else(|| rand::rng().random::<u64>());
        let mut report = GenerationReport::new(run_id.clone(), seed);

        info!(
            run_id = %run_id,
            seed,
            start_date = %self.options.start_date,
            end_date = %self.options.end_date,
            locale = %self.options.locale,
            "generation started"
        );

        let outcome = self.run_phases(warehouse, seed, &mut report).await;
        report.duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                info!(
                    run_id = %run_id,
                    tables = report.tables.len(),
                    rows = report.rows_total,
                    duration_ms = report.duration_ms,
                    "generation completed"
                );
                Ok(report)
            }
            Err(err) => {
                warn!(
                    run_id = %run_id,
                    error = %err,
                    committed_tables = report.tables.len(),
                    "generation failed"
                );
                Err(GenerateError::Failed {
                    source: err,
                    report: Box::new(report),
                })
            }
        }
    }

    async fn run_phases<W: Warehouse + ?Sized>(
        &self,
        warehouse: &W,
        seed: u64,
        report: &mut GenerationReport,
    ) -> Result<()> {
        let options = &self.options;
        options.daily_transactions.validate("daily_transactions")?;

        let dates = generate_dates(options.start_date, options.end_date)?;
        let date_keys = persist(warehouse, &dates, report).await?;

        persist(warehouse, &generate_categories(), report).await?;
        let category_keys = read_keys(warehouse, Table::Category).await?;

        let mut rng = table_rng(seed, Table::Product);
        let products =
            generate_products(&category_keys, options.products, options.locale, &mut rng)?;
        persist(warehouse, &products, report).await?;

        let mut rng = table_rng(seed, Table::Customer);
        let customers = generate_customers(options.customers, options.locale, &mut rng);
        persist(warehouse, &customers, report).await?;

        persist(warehouse, &generate_stores(), report).await?;

        let mut rng = table_rng(seed, Table::Supplier);
        let suppliers = generate_suppliers(options.suppliers, options.locale, &mut rng);
        persist(warehouse, &suppliers, report).await?;

        let keys = ReferenceKeys::load(warehouse, date_keys).await?;
        let mut rng = table_rng(seed, Table::Sales);
        let sales = generate_sales(&keys, options.daily_transactions, &mut rng)?;
        persist(warehouse, &sales, report).await?;

        Ok(())
    }
}

async fn persist<T: TableRow, W: Warehouse + ?Sized>(
    warehouse: &W,
    rows: &[T],
    report: &mut GenerationReport,
) -> Result<Vec<i64>> {
    let table_start = Instant::now();
    let keys = append_rows(warehouse, rows).await?;
    report.record_table(T::TABLE, keys.len() as u64);
    info!(
        table = %T::TABLE,
        rows = keys.len(),
        duration_ms = table_start.elapsed().as_millis() as u64,
        "table persisted"
    );
    Ok(keys)
}

/// RNG for one table, independent of every other table's draws.
fn table_rng(seed: u64, table: Table) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(hash_seed(seed, table.name()))
}

/// Mix a run seed with a stable key (FNV-1a over the key bytes).
pub fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
