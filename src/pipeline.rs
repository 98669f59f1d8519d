use std::path::Path;

use log::{debug, info, warn};

use crate::{
    config::AnalysisConfig,
    error::{AnalysisError, SinkError},
    group::{
        by_chunk, by_config, by_sweep, chunk_axis, thread_counts, ChunkKey, ConfigKey, SweepKey,
    },
    metrics::{derive_all, fastest_time, relative_all, SweepMetrics},
    parser::{read_log, read_table, LogLoad, LogParse, Table},
    record::{ExperimentRecord, SchedulePolicy, ScheduleRecord, TimeField},
    report::{global_best, policy_stats, summarize_all, GroupReport, PolicyStats},
    sink::MetricSink,
    table::speedup_column,
};

/// Speedup and efficiency of a thread-count sweep table.
#[derive(Debug)]
pub struct SpeedupAnalysis<'a> {
    pub table: &'a Table,
    pub groups: Vec<GroupReport<'a, ConfigKey, ExperimentRecord>>,
    /// One entry per input row, in input order.
    pub speedups: Vec<Option<f64>>,
    pub best: Option<(ConfigKey, &'a ExperimentRecord)>,
}

impl<'a> SpeedupAnalysis<'a> {
    pub fn new(table: &'a Table, config: &AnalysisConfig) -> Self {
        let grouped = by_config(&table.records);
        for group in &grouped {
            debug!("{}: threads {:?}", group.key, thread_counts(&group.records));
        }
        let groups = summarize_all(
            derive_all(&grouped, config.baseline_rule, ExperimentRecord::elapsed),
            ExperimentRecord::elapsed,
        );
        let speedups = speedup_column(&table.records, &groups);
        let best = global_best(
            groups.iter().map(|g| (g.key, g.time.fastest)),
            ExperimentRecord::elapsed,
        );
        info!(
            "{} record(s) in {} configuration(s)",
            table.records.len(),
            groups.len()
        );
        SpeedupAnalysis {
            table,
            groups,
            speedups,
            best,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table.records.is_empty()
    }
}

/// Policy and chunk-size comparison of a schedule sweep log.
#[derive(Debug)]
pub struct ScheduleAnalysis<'a> {
    pub parse: &'a LogParse,
    pub field: TimeField,
    pub policies: Vec<PolicyStats<'a>>,
    pub sweeps: Vec<SweepMetrics<'a, SweepKey>>,
    /// Speedup across thread counts per policy and chunk size. Empty unless
    /// the log has single-thread runs to compare against.
    pub thread_sweeps: Vec<GroupReport<'a, ChunkKey, ScheduleRecord>>,
    pub chunk_axis: Vec<u32>,
    pub fastest: Option<f64>,
    pub best: Option<(SchedulePolicy, &'a ScheduleRecord)>,
}

impl<'a> ScheduleAnalysis<'a> {
    pub fn new(parse: &'a LogParse, config: &AnalysisConfig) -> Self {
        let field = config.schedule_time;
        let time = |r: &ScheduleRecord| r.time(field);
        let records = &parse.records;

        let policies = policy_stats(records, field);
        let fastest = fastest_time(records, field);
        let sweeps = relative_all(&by_sweep(records), fastest, field);
        let thread_sweeps = if records.iter().any(|r| r.thread_count == 1) {
            summarize_all(derive_all(&by_chunk(records), config.baseline_rule, time), time)
        } else {
            info!("no single-thread runs in log, skipping thread speedup");
            Vec::new()
        };
        let best = global_best(policies.iter().map(|p| (p.policy, p.time.fastest)), time);

        ScheduleAnalysis {
            parse,
            field,
            policies,
            sweeps,
            thread_sweeps,
            chunk_axis: chunk_axis(records),
            fastest,
            best,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parse.is_empty()
    }
}

/// How a run ended. Empty input is an outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NoResults,
    Completed { records: usize, sink_failures: usize },
}

/// Loads `path` and hands the analysis to every sink. A failing sink is logged
/// and counted, and the remaining sinks still run.
pub fn run_speedup<P: AsRef<Path>>(
    path: P,
    config: &AnalysisConfig,
    sinks: &mut [&mut dyn MetricSink],
) -> Result<Outcome, AnalysisError> {
    let table = read_table(path)?;
    if table.records.is_empty() {
        return Ok(Outcome::NoResults);
    }
    let analysis = SpeedupAnalysis::new(&table, config);
    let sink_failures = deliver(sinks, |sink| sink.speedup(&analysis));
    Ok(Outcome::Completed {
        records: table.records.len(),
        sink_failures,
    })
}

pub fn run_schedule<P: AsRef<Path>>(
    path: P,
    config: &AnalysisConfig,
    sinks: &mut [&mut dyn MetricSink],
) -> Result<Outcome, AnalysisError> {
    let parse = match read_log(path)? {
        LogLoad::NotFound(path) => {
            warn!("{} not found", path.display());
            return Ok(Outcome::NoResults);
        }
        LogLoad::Loaded(parse) => parse,
    };
    if parse.is_empty() {
        return Ok(Outcome::NoResults);
    }
    let analysis = ScheduleAnalysis::new(&parse, config);
    let sink_failures = deliver(sinks, |sink| sink.schedule(&analysis));
    Ok(Outcome::Completed {
        records: parse.records.len(),
        sink_failures,
    })
}

fn deliver<F>(sinks: &mut [&mut dyn MetricSink], mut send: F) -> usize
where
    F: FnMut(&mut dyn MetricSink) -> Result<(), SinkError>,
{
    let mut failures = 0;
    for sink in sinks.iter_mut() {
        debug!("delivering to {}", sink.name());
        if let Err(e) = send(&mut **sink) {
            warn!("{e}");
            failures += 1;
        }
    }
    failures
}
