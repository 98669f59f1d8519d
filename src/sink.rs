use std::{
    io::{self, Write},
    path::PathBuf,
};

use log::info;

use crate::{
    error::SinkError,
    group::{sorted_by_threads, ConfigKey},
    pipeline::{ScheduleAnalysis, SpeedupAnalysis},
    record::chunk_label,
    report::{fmt_metric, NOT_AVAILABLE},
    stats,
    table::{write_schedule_table, write_speedup_path},
};

/// Consumer of a finished analysis, such as a chart renderer. Sinks only get
/// shared references to the results.
pub trait MetricSink {
    fn name(&self) -> &'static str;

    fn speedup(&mut self, _analysis: &SpeedupAnalysis<'_>) -> Result<(), SinkError> {
        Ok(())
    }

    fn schedule(&mut self, _analysis: &ScheduleAnalysis<'_>) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Human-readable summary written to any [`Write`], usually stdout.
pub struct ConsoleSummary<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSummary<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn io(&self, source: io::Error) -> SinkError {
        SinkError::Io {
            sink: "console",
            source,
        }
    }

    fn write_speedup(&mut self, analysis: &SpeedupAnalysis<'_>) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out, "=== PERFORMANCE SUMMARY ===")?;
        writeln!(out)?;

        for group in &analysis.groups {
            writeln!(out, "Configuration: {}", group.key)?;
            writeln!(out, "{}", "-".repeat(50))?;
            let serial = group.baseline.map(|b| b.time);
            writeln!(out, "Serial time: {} ms", fmt_metric(serial, 1))?;

            for row in sorted_by_threads(&group.rows, |row| row.record.thread_count) {
                writeln!(
                    out,
                    "  {:2} threads: {:8.1} ms | Speedup: {:>6}x | Efficiency: {:>6}",
                    row.record.thread_count,
                    row.record.elapsed_time,
                    fmt_metric(row.speedup, 2),
                    percent(row.efficiency),
                )?;
            }

            match group.best_speedup() {
                Some(best) => writeln!(
                    out,
                    "  Best speedup: {}x with {} threads",
                    fmt_metric(best.speedup, 2),
                    best.record.thread_count
                )?,
                None => writeln!(out, "  Best speedup: no valid speedup")?,
            }
            writeln!(out)?;
        }

        writeln!(out, "TIME (ms)")?;
        writeln!(out, "{} | configuration", stats::header())?;
        for group in &analysis.groups {
            if let Some(time) = &group.time.summary {
                writeln!(out, "{time} | {}", group.key)?;
            }
        }
        writeln!(out)?;

        if let Some((key, best)) = analysis.best {
            writeln!(
                out,
                "Fastest run: {} with {} threads, {:.1} ms",
                key, best.thread_count, best.elapsed_time
            )?;
        }
        Ok(())
    }

    fn write_schedule(&mut self, analysis: &ScheduleAnalysis<'_>) -> io::Result<()> {
        let unit = analysis.field.unit();
        let out = &mut self.out;
        writeln!(out, "PERFORMANCE SUMMARY")?;
        writeln!(out)?;
        if let Some(first) = analysis.parse.records.first() {
            writeln!(out, "Dataset: {}", ConfigKey::from(first))?;
            writeln!(out, "Threads: {}", first.thread_count)?;
        }
        writeln!(
            out,
            "Sections: {} parsed, {} skipped",
            analysis.parse.records.len(),
            analysis.parse.skipped.len()
        )?;
        for skipped in &analysis.parse.skipped {
            writeln!(out, "  skipped at byte {}: {}", skipped.offset, skipped.reason)?;
        }
        writeln!(out)?;

        for policy in &analysis.policies {
            writeln!(
                out,
                "{} SCHEDULE:",
                policy.policy.as_str().to_ascii_uppercase()
            )?;
            match &policy.time.summary {
                Some(s) => {
                    writeln!(out, "  Mean time: {:.3}{unit} ± {:.3}{unit}", s.mean, s.std_dev)?;
                    writeln!(out, "  Best time: {:.3}{unit}", s.min)?;
                    writeln!(out, "  Range: {:.3}{unit}", s.range())?;
                }
                None => writeln!(out, "  no data")?,
            }
            writeln!(out)?;
        }

        writeln!(out, "RELATIVE PERFORMANCE vs default chunk:")?;
        for sweep in &analysis.sweeps {
            writeln!(out, "  {}", sweep.key)?;
            for row in &sweep.rows {
                writeln!(
                    out,
                    "    chunk {:>7}: {:.3}{unit} | {:>8} | {:>6}x of fastest",
                    row.record.chunk_label(),
                    row.record.time(analysis.field),
                    signed_percent(row.delta_pct),
                    fmt_metric(row.vs_fastest, 2),
                )?;
            }
        }
        writeln!(out)?;

        for group in &analysis.thread_sweeps {
            writeln!(out, "Thread speedup: {}", group.key)?;
            for row in &group.rows {
                writeln!(
                    out,
                    "  {:2} threads: speedup {:>6}x | efficiency {:>6}",
                    row.record.thread_count,
                    fmt_metric(row.speedup, 2),
                    percent(row.efficiency),
                )?;
            }
        }

        writeln!(out, "BEST CONFIGURATION:")?;
        match analysis.best {
            Some((policy, best)) => {
                writeln!(out, "  Schedule: {policy}")?;
                writeln!(out, "  Chunk size: {}", chunk_label(best.chunk_size))?;
                writeln!(out, "  Time: {:.3}{unit}", best.time(analysis.field))?;
            }
            None => writeln!(out, "  {NOT_AVAILABLE}")?,
        }
        Ok(())
    }
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}%", v * 100.0),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn signed_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+.1}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}

impl<W: Write> MetricSink for ConsoleSummary<W> {
    fn name(&self) -> &'static str {
        "console"
    }

    fn speedup(&mut self, analysis: &SpeedupAnalysis<'_>) -> Result<(), SinkError> {
        self.write_speedup(analysis).map_err(|e| self.io(e))
    }

    fn schedule(&mut self, analysis: &ScheduleAnalysis<'_>) -> Result<(), SinkError> {
        self.write_schedule(analysis).map_err(|e| self.io(e))
    }
}

/// Writes the speedup table next to the input.
pub struct SpeedupCsv {
    path: PathBuf,
}

impl SpeedupCsv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetricSink for SpeedupCsv {
    fn name(&self) -> &'static str {
        "speedup-csv"
    }

    fn speedup(&mut self, analysis: &SpeedupAnalysis<'_>) -> Result<(), SinkError> {
        write_speedup_path(&self.path, analysis.table, &analysis.speedups).map_err(|source| {
            SinkError::Csv {
                sink: "speedup-csv",
                source,
            }
        })?;
        info!("wrote {}", self.path.display());
        Ok(())
    }
}

/// Writes one row per schedule run with its relative metrics.
pub struct ScheduleCsv {
    path: PathBuf,
}

impl ScheduleCsv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetricSink for ScheduleCsv {
    fn name(&self) -> &'static str {
        "schedule-csv"
    }

    fn schedule(&mut self, analysis: &ScheduleAnalysis<'_>) -> Result<(), SinkError> {
        let file = std::fs::File::create(&self.path).map_err(|source| SinkError::Io {
            sink: "schedule-csv",
            source,
        })?;
        write_schedule_table(file, analysis.sweeps.iter().flat_map(|s| &s.rows)).map_err(
            |source| SinkError::Csv {
                sink: "schedule-csv",
                source,
            },
        )?;
        info!("wrote {}", self.path.display());
        Ok(())
    }
}
