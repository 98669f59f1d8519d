use std::fmt::Display;

use log::{debug, warn};

use crate::{
    group::Group,
    record::{Measurement, ScheduleRecord, TimeField},
};

/// How a group's serial reference run is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaselineRule {
    /// Only `thread_count == 1` counts as serial.
    #[default]
    ThreadCount,
    /// `thread_count == 1` first; if a group has none, the first run carrying
    /// the explicit serial marker.
    ThreadCountOrSerialFlag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineSource {
    ThreadCount,
    SerialFlag,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    /// Position of the reference run inside its group.
    pub index: usize,
    pub time: f64,
    /// How many runs qualified. Only the first one is used.
    pub candidates: usize,
    pub source: BaselineSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricStatus {
    Computed,
    MissingBaseline,
    /// The baseline run itself has zero elapsed time.
    DegenerateBaseline,
    /// This run has zero elapsed time.
    DegenerateTime,
}

impl MetricStatus {
    pub fn is_defined(&self) -> bool {
        matches!(self, MetricStatus::Computed)
    }
}

/// A record paired with its derived metrics. The record is borrowed, never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow<'a, R> {
    pub record: &'a R,
    pub speedup: Option<f64>,
    pub efficiency: Option<f64>,
    pub status: MetricStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMetrics<'a, K, R> {
    pub key: K,
    pub baseline: Option<Baseline>,
    pub rows: Vec<MetricRow<'a, R>>,
}

impl<K, R> GroupMetrics<'_, K, R> {
    pub fn speedups(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().filter_map(|row| row.speedup)
    }

    pub fn efficiencies(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().filter_map(|row| row.efficiency)
    }
}

/// Finds the reference run of a group. Ties go to input order.
pub fn resolve_baseline<M, F>(records: &[M], rule: BaselineRule, time: F) -> Option<Baseline>
where
    M: Measurement,
    F: Fn(&M) -> f64,
{
    let by_threads: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.thread_count() == 1)
        .map(|(i, _)| i)
        .collect();

    let (candidates, source) = match rule {
        BaselineRule::ThreadCountOrSerialFlag if by_threads.is_empty() => {
            let by_flag: Vec<usize> = records
                .iter()
                .enumerate()
                .filter(|(_, r)| r.serial_hint())
                .map(|(i, _)| i)
                .collect();
            (by_flag, BaselineSource::SerialFlag)
        }
        _ => (by_threads, BaselineSource::ThreadCount),
    };

    let &index = candidates.first()?;
    Some(Baseline {
        index,
        time: time(&records[index]),
        candidates: candidates.len(),
        source,
    })
}

/// `baseline_time / elapsed`, or `None` when the division would not give a finite ratio.
pub fn speedup(baseline_time: f64, elapsed: f64) -> Option<f64> {
    if elapsed == 0.0 {
        return None;
    }
    let ratio = baseline_time / elapsed;
    ratio.is_finite().then_some(ratio)
}

pub fn efficiency(speedup: Option<f64>, thread_count: u32) -> Option<f64> {
    if thread_count == 0 {
        return None;
    }
    speedup.map(|s| s / f64::from(thread_count))
}

/// Metrics of one run, which took `elapsed`, against its group's baseline.
pub fn metric_row<'a, R: Measurement>(
    record: &'a R,
    elapsed: f64,
    baseline: Option<&Baseline>,
) -> MetricRow<'a, R> {
    let (speedup, status) = match baseline {
        None => (None, MetricStatus::MissingBaseline),
        Some(b) if b.time == 0.0 => (None, MetricStatus::DegenerateBaseline),
        Some(b) => match speedup(b.time, elapsed) {
            Some(s) => (Some(s), MetricStatus::Computed),
            None => (None, MetricStatus::DegenerateTime),
        },
    };
    MetricRow {
        record,
        speedup,
        efficiency: efficiency(speedup, record.thread_count()),
        status,
    }
}

/// Derives speedup and efficiency for every run in one group.
pub fn derive_rows<'a, R, F>(
    records: &[&'a R],
    rule: BaselineRule,
    time: F,
) -> (Option<Baseline>, Vec<MetricRow<'a, R>>)
where
    R: Measurement,
    F: Fn(&R) -> f64,
{
    let baseline = resolve_baseline(records, rule, |r: &&R| time(*r));
    let rows = records
        .iter()
        .map(|&record| metric_row(record, time(record), baseline.as_ref()))
        .collect();
    (baseline, rows)
}

/// Derives metrics for every group, in group order, timing each run with `time`.
pub fn derive_all<'a, K, R, F>(
    groups: &[Group<K, &'a R>],
    rule: BaselineRule,
    time: F,
) -> Vec<GroupMetrics<'a, K, R>>
where
    K: Clone + Display,
    R: Measurement,
    F: Fn(&R) -> f64,
{
    groups
        .iter()
        .map(|group| {
            let (baseline, rows) = derive_rows(&group.records, rule, &time);
            match &baseline {
                None => warn!("{}: no serial baseline, speedup not available", group.key),
                Some(b) => {
                    if b.candidates > 1 {
                        warn!(
                            "{}: {} serial candidates, using the first ({})",
                            group.key, b.candidates, b.time
                        );
                    }
                    if b.source == BaselineSource::SerialFlag {
                        warn!(
                            "{}: no single-thread run, falling back to the serial flag",
                            group.key
                        );
                    }
                    debug!("{}: baseline time {}", group.key, b.time);
                }
            }
            for row in &rows {
                if row.record.serial_hint() && row.record.thread_count() != 1 {
                    warn!(
                        "{}: run marked serial but has {} threads",
                        group.key,
                        row.record.thread_count()
                    );
                }
                if row.status == MetricStatus::DegenerateTime {
                    warn!(
                        "{}: zero elapsed time at {} threads, speedup not available",
                        group.key,
                        row.record.thread_count()
                    );
                }
            }
            GroupMetrics {
                key: group.key.clone(),
                baseline,
                rows,
            }
        })
        .collect()
}

/// A schedule run paired with its change against the default-chunk run.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeRow<'a> {
    pub record: &'a ScheduleRecord,
    /// Signed percentage. Negative means faster than the reference.
    pub delta_pct: Option<f64>,
    /// `fastest / time` across the whole log.
    pub vs_fastest: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepMetrics<'a, K> {
    pub key: K,
    pub reference: Option<&'a ScheduleRecord>,
    pub rows: Vec<RelativeRow<'a>>,
}

/// `(time - reference) / reference * 100`.
pub fn relative_change(reference: f64, time: f64) -> Option<f64> {
    if reference == 0.0 {
        return None;
    }
    let pct = (time - reference) / reference * 100.0;
    pct.is_finite().then_some(pct)
}

/// The run every other run of a sweep is compared to: its first default-chunk run.
pub fn sweep_reference<'a>(sweep: &[&'a ScheduleRecord]) -> Option<&'a ScheduleRecord> {
    sweep.iter().copied().find(|r| r.chunk_size == 0)
}

/// Shortest strictly positive time among `records`.
pub fn fastest_time(records: &[ScheduleRecord], field: TimeField) -> Option<f64> {
    records
        .iter()
        .map(|r| r.time(field))
        .filter(|t| *t > 0.0)
        .min_by(f64::total_cmp)
}

pub fn relative_all<'a, K>(
    sweeps: &[Group<K, &'a ScheduleRecord>],
    fastest: Option<f64>,
    field: TimeField,
) -> Vec<SweepMetrics<'a, K>>
where
    K: Clone + Display,
{
    sweeps
        .iter()
        .map(|sweep| {
            let reference = sweep_reference(&sweep.records);
            if reference.is_none() {
                warn!(
                    "{}: no default-chunk run, relative performance not available",
                    sweep.key
                );
            }
            let rows = sweep
                .records
                .iter()
                .map(|&record| RelativeRow {
                    record,
                    delta_pct: reference
                        .and_then(|r| relative_change(r.time(field), record.time(field))),
                    vs_fastest: fastest.and_then(|f| speedup(f, record.time(field))),
                })
                .collect();
            SweepMetrics {
                key: sweep.key.clone(),
                reference,
                rows,
            }
        })
        .collect()
}
