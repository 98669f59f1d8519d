use std::path::{Path, PathBuf};

use crate::{metrics::BaselineRule, record::TimeField};

/// Knobs shared by both analyses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub baseline_rule: BaselineRule,
    /// Which log timing drives the schedule metrics.
    pub schedule_time: TimeField,
}

impl AnalysisConfig {
    pub fn with_baseline_rule(mut self, rule: BaselineRule) -> Self {
        self.baseline_rule = rule;
        self
    }

    pub fn with_schedule_time(mut self, field: TimeField) -> Self {
        self.schedule_time = field;
        self
    }
}

/// `results/results.csv` -> `results/results_with_speedup.csv`
pub fn default_speedup_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    input.with_file_name(format!("{stem}_with_speedup.csv"))
}
