use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// One row of the tabular results file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentRecord {
    pub point_count: u64,
    pub cluster_count: u32,
    pub thread_count: u32,
    /// Milliseconds, as written by the benchmark driver.
    pub elapsed_time: f64,
    /// Legacy `serial_omp` column. `thread_count == 1` is what decides the baseline.
    pub is_serial_marker: bool,
}

impl ExperimentRecord {
    pub fn elapsed(&self) -> f64 {
        self.elapsed_time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulePolicy {
    Static,
    Dynamic,
}

impl SchedulePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulePolicy::Static => "static",
            SchedulePolicy::Dynamic => "dynamic",
        }
    }
}

impl Display for SchedulePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulePolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(SchedulePolicy::Static),
            "dynamic" => Ok(SchedulePolicy::Dynamic),
            _ => Err(ParseError::UnknownPolicy(s.to_string())),
        }
    }
}

/// One test section of a schedule sweep log.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRecord {
    pub point_count: u64,
    pub cluster_count: u32,
    pub schedule_policy: SchedulePolicy,
    pub thread_count: u32,
    /// 0 means the runtime's default chunking.
    pub chunk_size: u32,
    pub elapsed_time_ms: f64,
    pub elapsed_time_s: f64,
    pub iterations: Option<u32>,
    pub sse: Option<f64>,
    pub silhouette: Option<f64>,
}

impl ScheduleRecord {
    pub fn time(&self, field: TimeField) -> f64 {
        match field {
            TimeField::Seconds => self.elapsed_time_s,
            TimeField::Millis => self.elapsed_time_ms,
        }
    }

    /// Chunk size as shown in reports: `default` for 0.
    pub fn chunk_label(&self) -> String {
        chunk_label(self.chunk_size)
    }
}

pub fn chunk_label(chunk_size: u32) -> String {
    if chunk_size == 0 {
        "default".to_string()
    } else {
        chunk_size.to_string()
    }
}

/// Which of the two timings in a log section drives schedule metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeField {
    /// `omp_get_wtime()` seconds.
    #[default]
    Seconds,
    Millis,
}

impl TimeField {
    pub fn unit(&self) -> &'static str {
        match self {
            TimeField::Seconds => "s",
            TimeField::Millis => "ms",
        }
    }
}

/// Anything the speedup calculator can derive metrics for. Which timing to
/// use is chosen by the caller, since a log section carries two.
pub trait Measurement {
    fn thread_count(&self) -> u32;

    /// Explicit "this run was serial" marker carried by the source, if any.
    fn serial_hint(&self) -> bool {
        false
    }
}

impl Measurement for ExperimentRecord {
    fn thread_count(&self) -> u32 {
        self.thread_count
    }

    fn serial_hint(&self) -> bool {
        self.is_serial_marker
    }
}

impl Measurement for ScheduleRecord {
    fn thread_count(&self) -> u32 {
        self.thread_count
    }
}

impl<M: Measurement + ?Sized> Measurement for &M {
    fn thread_count(&self) -> u32 {
        (**self).thread_count()
    }

    fn serial_hint(&self) -> bool {
        (**self).serial_hint()
    }
}
