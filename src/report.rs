use crate::{
    group::{group_by, Group},
    metrics::{Baseline, GroupMetrics, MetricRow},
    record::{Measurement, SchedulePolicy, ScheduleRecord, TimeField},
    stats::{argmax, argmin, Summary},
};

/// Marker printed wherever a metric has no value.
pub const NOT_AVAILABLE: &str = "n/a";

/// Formats a metric with `precision` decimals, or [`NOT_AVAILABLE`].
pub fn fmt_metric(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Elapsed-time statistics of one group.
#[derive(Debug)]
pub struct TimeStats<'a, R> {
    pub summary: Option<Summary>,
    pub fastest: Option<&'a R>,
}

fn usable_time(t: f64) -> bool {
    t.is_finite() && t > 0.0
}

pub fn time_stats<'a, R, F>(records: &[&'a R], time: F) -> TimeStats<'a, R>
where
    F: Fn(&R) -> f64,
{
    let usable: Vec<&'a R> = records
        .iter()
        .copied()
        .filter(|r| usable_time(time(*r)))
        .collect();
    let summary = Summary::of(usable.iter().map(|r| time(*r)));
    let fastest = argmin(usable.iter().map(|r| time(*r))).map(|i| usable[i]);
    TimeStats { summary, fastest }
}

#[derive(Debug)]
pub struct GroupReport<'a, K, R> {
    pub key: K,
    pub baseline: Option<Baseline>,
    pub rows: Vec<MetricRow<'a, R>>,
    pub time: TimeStats<'a, R>,
    pub speedup: Option<Summary>,
    pub efficiency: Option<Summary>,
    best_speedup: Option<usize>,
}

impl<'a, K, R> GroupReport<'a, K, R> {
    /// The run with the highest defined speedup. `None` means no valid speedup.
    pub fn best_speedup(&self) -> Option<&MetricRow<'a, R>> {
        self.best_speedup.map(|i| &self.rows[i])
    }

    pub fn baseline_record(&self) -> Option<&'a R> {
        self.baseline.map(|b| self.rows[b.index].record)
    }
}

pub fn summarize<'a, K, R, F>(metrics: GroupMetrics<'a, K, R>, time: F) -> GroupReport<'a, K, R>
where
    R: Measurement,
    F: Fn(&R) -> f64,
{
    let GroupMetrics {
        key,
        baseline,
        rows,
    } = metrics;
    let records: Vec<&'a R> = rows.iter().map(|row| row.record).collect();
    let time = time_stats(&records, time);
    let speedup = Summary::of(rows.iter().filter_map(|row| row.speedup));
    let efficiency = Summary::of(rows.iter().filter_map(|row| row.efficiency));
    let best_speedup = argmax(rows.iter().map(|row| row.speedup));
    GroupReport {
        key,
        baseline,
        rows,
        time,
        speedup,
        efficiency,
        best_speedup,
    }
}

pub fn summarize_all<'a, K, R, F>(
    metrics: Vec<GroupMetrics<'a, K, R>>,
    time: F,
) -> Vec<GroupReport<'a, K, R>>
where
    R: Measurement,
    F: Fn(&R) -> f64,
{
    metrics
        .into_iter()
        .map(|group| summarize(group, &time))
        .collect()
}

/// Fastest record across groups, folded from each group's own fastest run.
/// Earlier groups win ties.
pub fn global_best<'a, K, R, I, F>(candidates: I, time: F) -> Option<(K, &'a R)>
where
    I: IntoIterator<Item = (K, Option<&'a R>)>,
    F: Fn(&R) -> f64,
{
    candidates
        .into_iter()
        .filter_map(|(key, fastest)| fastest.map(|r| (key, r)))
        .fold(None, |best, (key, r)| match best {
            Some((_, b)) if time(b) <= time(r) => best,
            _ => Some((key, r)),
        })
}

/// Elapsed-time statistics of every run of one policy.
#[derive(Debug)]
pub struct PolicyStats<'a> {
    pub policy: SchedulePolicy,
    pub time: TimeStats<'a, ScheduleRecord>,
}

pub fn policy_stats(records: &[ScheduleRecord], field: TimeField) -> Vec<PolicyStats<'_>> {
    group_by(records, |r| r.schedule_policy)
        .into_iter()
        .map(|Group { key, records }| PolicyStats {
            policy: key,
            time: time_stats(&records, |r| r.time(field)),
        })
        .collect()
}
