//! Performance analysis for parallel k-means benchmark runs.
//!
//! Two inputs are supported: a CSV table of runs swept over thread counts,
//! and the plain-text log of a schedule sweep over OpenMP policies and chunk
//! sizes. Both go through the same stages: parse, group, derive per-record
//! metrics against a baseline, aggregate, then deliver to [`sink::MetricSink`]s.

pub mod config;
pub mod error;
pub mod group;
pub mod metrics;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod sink;
pub mod stats;
pub mod table;

#[cfg(test)]
mod test_utils;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, ParseError, SchemaError, SinkError};
pub use metrics::{BaselineRule, MetricStatus};
pub use pipeline::{run_schedule, run_speedup, Outcome, ScheduleAnalysis, SpeedupAnalysis};
pub use record::{ExperimentRecord, SchedulePolicy, ScheduleRecord, TimeField};
pub use sink::{ConsoleSummary, MetricSink, ScheduleCsv, SpeedupCsv};
