use std::{collections::HashMap, fs::File, io::Write, path::Path};

use csv::StringRecord;
use serde::Serialize;

use crate::{
    group::ConfigKey,
    metrics::{metric_row, Baseline, RelativeRow},
    parser::{tabular::SPEEDUP, Table},
    record::{ExperimentRecord, SchedulePolicy},
    report::GroupReport,
};

/// Speedup of every record of `records`, in their order, using the baselines of `groups`.
pub fn speedup_column(
    records: &[ExperimentRecord],
    groups: &[GroupReport<'_, ConfigKey, ExperimentRecord>],
) -> Vec<Option<f64>> {
    let baselines: HashMap<ConfigKey, Option<Baseline>> =
        groups.iter().map(|g| (g.key, g.baseline)).collect();
    records
        .iter()
        .map(|record| {
            let baseline = baselines.get(&ConfigKey::from(record)).copied().flatten();
            metric_row(record, record.elapsed(), baseline.as_ref()).speedup
        })
        .collect()
}

/// Writes `table` back with its own header and cells, plus the speedup of each
/// row. An existing `speedup` column is overwritten in place, otherwise one is
/// appended. Undefined speedups are empty cells.
pub fn write_speedup_table<W: Write>(
    out: W,
    table: &Table,
    speedups: &[Option<f64>],
) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let existing = table.column(SPEEDUP);

    let mut header = table.headers.clone();
    if existing.is_none() {
        header.push_field(SPEEDUP);
    }
    writer.write_record(&header)?;

    for (raw, speedup) in table.rows.iter().zip(speedups) {
        let cell = speedup.map(|s| s.to_string()).unwrap_or_default();
        let row: StringRecord = match existing {
            Some(col) => raw
                .iter()
                .enumerate()
                .map(|(i, value)| if i == col { cell.as_str() } else { value })
                .collect(),
            None => {
                let mut row = raw.clone();
                row.push_field(&cell);
                row
            }
        };
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_speedup_path<P: AsRef<Path>>(
    path: P,
    table: &Table,
    speedups: &[Option<f64>],
) -> csv::Result<()> {
    let file = File::create(path)?;
    write_speedup_table(file, table, speedups)
}

#[derive(Debug, Serialize)]
struct ScheduleRow {
    n_points: u64,
    k_clusters: u32,
    schedule: SchedulePolicy,
    threads: u32,
    chunk_size: u32,
    time_ms: f64,
    time_seconds: f64,
    iterations: Option<u32>,
    sse: Option<f64>,
    silhouette: Option<f64>,
    relative_pct: Option<f64>,
    speedup_vs_fastest: Option<f64>,
}

impl From<&RelativeRow<'_>> for ScheduleRow {
    fn from(row: &RelativeRow<'_>) -> Self {
        let r = row.record;
        ScheduleRow {
            n_points: r.point_count,
            k_clusters: r.cluster_count,
            schedule: r.schedule_policy,
            threads: r.thread_count,
            chunk_size: r.chunk_size,
            time_ms: r.elapsed_time_ms,
            time_seconds: r.elapsed_time_s,
            iterations: r.iterations,
            sse: r.sse,
            silhouette: r.silhouette,
            relative_pct: row.delta_pct,
            speedup_vs_fastest: row.vs_fastest,
        }
    }
}

/// Writes one line per schedule run, sweep by sweep.
pub fn write_schedule_table<'r, 'a: 'r, W, I>(out: W, rows: I) -> csv::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'r RelativeRow<'a>>,
{
    let mut writer = csv::Writer::from_writer(out);
    for row in rows {
        writer.serialize(ScheduleRow::from(row))?;
    }
    writer.flush()?;
    Ok(())
}
