use serde::{Deserialize, Serialize};

use crate::reconcile::{DEFAULT_BASELINE, DEFAULT_THRESHOLD};

/// Options for reconciliation runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    /// Stock every product starts a period with.
    pub baseline: i64,
    /// Snapshots strictly below this level are reported as low stock.
    pub threshold: i64,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            baseline: DEFAULT_BASELINE,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

/// Report for a reconciliation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub run_id: String,
    pub baseline: i64,
    pub threshold: i64,
    /// Baseline snapshots appended by the initialization pass.
    pub initialized: u64,
    /// Sales facts read for the update pass.
    pub facts_read: u64,
    /// Grouped snapshots appended by the update pass.
    pub groups: u64,
    /// Groups whose derived stock went negative.
    pub oversold_groups: u64,
    pub low_stock: u64,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_fall_back_to_defaults() {
        let options: ReconcileOptions =
            serde_json::from_str(r#"{ "threshold": 5 }"#).expect("options");
        assert_eq!(options.baseline, DEFAULT_BASELINE);
        assert_eq!(options.threshold, 5);
    }
}
