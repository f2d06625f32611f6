use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use grocery_core::{Error, Result, Table};

use crate::faker::LocaleKey;

/// Inclusive count range, e.g. transactions per simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Range that always yields `count`.
    pub const fn fixed(count: u32) -> Self {
        Self::new(count, count)
    }

    pub fn validate(&self, label: &str) -> Result<()> {
        if self.min > self.max {
            return Err(Error::InvalidRange(format!(
                "{label}: min {} > max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Options for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Seed for every RNG of the run. A random seed is drawn when absent.
    pub seed: Option<u64>,
    /// First calendar day of the date dimension.
    pub start_date: NaiveDate,
    /// Last calendar day of the date dimension (inclusive).
    pub end_date: NaiveDate,
    pub products: usize,
    pub customers: usize,
    pub suppliers: usize,
    /// Sales transactions drawn per simulated day.
    pub daily_transactions: CountRange,
    /// Locale of the synthetic text source.
    pub locale: LocaleKey,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed: None,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            products: 60,
            customers: 200,
            suppliers: 15,
            daily_transactions: CountRange::new(20, 60),
            locale: LocaleKey::EnUs,
        }
    }
}

/// Rows persisted for one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub rows_generated: u64,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub tables: Vec<TableReport>,
    pub rows_total: u64,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64) -> Self {
        Self {
            run_id,
            seed,
            tables: Vec::new(),
            rows_total: 0,
            duration_ms: 0,
        }
    }

    pub fn record_table(&mut self, table: Table, rows: u64) {
        self.rows_total += rows;
        self.tables.push(TableReport {
            table: table.name().to_string(),
            rows_generated: rows,
        });
    }

    /// Rows persisted for `table`, zero if the phase never ran.
    pub fn rows_for(&self, table: Table) -> u64 {
        self.tables
            .iter()
            .filter(|report| report.table == table.name())
            .map(|report| report.rows_generated)
            .sum()
    }
}
