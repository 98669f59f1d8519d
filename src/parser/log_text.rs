//! Reader for the schedule sweep log.
//!
//! The log is a sequence of test sections, each opened by a `TESTANDO:` line:
//!
//! ```text
//! TESTANDO: 1000000 pontos, 16 clusters, Schedule: dynamic, Threads: 32 Chunk Sizes: 10
//! ...
//! Iterações: 12 | SSE final: 1234.5 | Tempo: 120.3 ms
//! Tempo medido com omp_get_wtime(): 0.120300 segundos
//! ```
//!
//! A section that is cut short, has its fields out of order, or carries
//! garbage in a numeric slot is skipped on its own; the rest of the log is
//! still read.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
    sync::LazyLock,
};

use log::{debug, info, warn};
use regex::{Captures, Regex};

use crate::{
    error::{AnalysisError, ParseError},
    record::{SchedulePolicy, ScheduleRecord},
};

const SECTION_MARKER: &str = "TESTANDO:";

const HEADER: &str = r"TESTANDO:\s*(?P<points>[^\s,]+) pontos,\s*(?P<clusters>[^\s,]+) clusters,\s*Schedule:\s*(?P<policy>[^\s,]+),\s*Threads:\s*(?P<threads>[^\s,]+)\s+Chunk Sizes:\s*(?P<chunk>[^\s,]+)";
const MILLIS: &str = r"Tempo:\s*(?P<ms>[^\s,|]+)\s*ms";
const SECONDS: &str = r"Tempo medido com omp_get_wtime\(\):\s*(?P<secs>[^\s,]+)\s*segundos";

static TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s)^{HEADER}.*?{MILLIS}.*?{SECONDS}")).unwrap()
});
static MILLIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(MILLIS).unwrap());
static SECONDS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(SECONDS).unwrap());
static ITERATIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Itera(?:ções|coes|tions):\s*(\d+)").unwrap());
static SSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SSE final:\s*([-+0-9.eE]+)").unwrap());
static SILHOUETTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Coeficiente silhouette m[ée]dio:\s*([-+0-9.eE]+)").unwrap()
});

/// Labels in the order the template expects them, with the field name each one introduces.
const LABELS: [(&str, &str); 7] = [
    ("pontos", "points"),
    ("clusters", "clusters"),
    ("Schedule:", "schedule"),
    ("Threads:", "threads"),
    ("Chunk Sizes:", "chunk_size"),
    ("Tempo:", "time_ms"),
    ("Tempo medido com omp_get_wtime():", "time_s"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum SectionOutcome {
    Parsed(ScheduleRecord),
    Skipped(SkippedSection),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSection {
    /// Byte offset of the section's `TESTANDO:` marker.
    pub offset: usize,
    pub reason: ParseError,
}

/// Result of reading a whole log: parsed records in document order plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogParse {
    pub records: Vec<ScheduleRecord>,
    pub skipped: Vec<SkippedSection>,
}

impl LogParse {
    pub fn sections_seen(&self) -> usize {
        self.records.len() + self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<SectionOutcome> for LogParse {
    fn from_iter<I: IntoIterator<Item = SectionOutcome>>(iter: I) -> Self {
        let mut parse = LogParse::default();
        for outcome in iter {
            match outcome {
                SectionOutcome::Parsed(record) => parse.records.push(record),
                SectionOutcome::Skipped(skipped) => parse.skipped.push(skipped),
            }
        }
        parse
    }
}

/// What the caller gets back from [`read_log`]. A missing file is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum LogLoad {
    NotFound(PathBuf),
    Loaded(LogParse),
}

pub fn read_log<P: AsRef<Path>>(path: P) -> Result<LogLoad, AnalysisError> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(LogLoad::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(AnalysisError::io(path, e)),
    };
    let parse = parse_log(&text);
    info!(
        "{}: {} section(s), {} parsed, {} skipped",
        path.display(),
        parse.sections_seen(),
        parse.records.len(),
        parse.skipped.len()
    );
    Ok(LogLoad::Loaded(parse))
}

pub fn parse_log(text: &str) -> LogParse {
    sections(text)
        .map(|(offset, section)| match parse_section(section) {
            Ok(record) => {
                debug!("section at byte {offset}: {record:?}");
                SectionOutcome::Parsed(record)
            }
            Err(reason) => {
                warn!("skipping section at byte {offset}: {reason}");
                SectionOutcome::Skipped(SkippedSection { offset, reason })
            }
        })
        .collect()
}

/// Splits the log at every section marker. Text before the first marker is not a section.
fn sections(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let starts: Vec<usize> = text.match_indices(SECTION_MARKER).map(|(i, _)| i).collect();
    let ends: Vec<usize> = starts.iter().skip(1).copied().chain([text.len()]).collect();
    starts
        .into_iter()
        .zip(ends)
        .map(move |(start, end)| (start, &text[start..end]))
}

/// Parses one section, which must begin with the section marker.
pub fn parse_section(section: &str) -> Result<ScheduleRecord, ParseError> {
    let Some(caps) = TEMPLATE_RE.captures(section) else {
        return Err(diagnose(section));
    };

    let schedule_policy = caps["policy"].parse::<SchedulePolicy>()?;
    let elapsed_time_ms = parse_time(&caps, "ms", "time_ms")?;
    let elapsed_time_s = parse_time(&caps, "secs", "time_s")?;

    Ok(ScheduleRecord {
        point_count: parse_number(&caps, "points", "points")?,
        cluster_count: parse_number(&caps, "clusters", "clusters")?,
        schedule_policy,
        thread_count: parse_number(&caps, "threads", "threads")?,
        chunk_size: parse_number(&caps, "chunk", "chunk_size")?,
        elapsed_time_ms,
        elapsed_time_s,
        iterations: optional(&ITERATIONS_RE, section),
        sse: optional(&SSE_RE, section),
        silhouette: optional(&SILHOUETTE_RE, section),
    })
}

/// Works out why a section did not match the full template.
fn diagnose(section: &str) -> ParseError {
    for (label, field) in LABELS {
        let present = match field {
            "time_ms" => MILLIS_RE.is_match(section),
            "time_s" => SECONDS_RE.is_match(section),
            _ => section.contains(label),
        };
        if !present {
            return ParseError::MissingField(field);
        }
    }
    ParseError::OutOfOrder
}

fn parse_number<T: FromStr>(
    caps: &Captures<'_>,
    group: &str,
    field: &'static str,
) -> Result<T, ParseError> {
    let raw = &caps[group];
    raw.parse::<T>().map_err(|_| ParseError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn parse_time(caps: &Captures<'_>, group: &str, field: &'static str) -> Result<f64, ParseError> {
    let value: f64 = parse_number(caps, group, field)?;
    if !value.is_finite() || value < 0.0 {
        return Err(ParseError::InvalidNumber {
            field,
            value: caps[group].to_string(),
        });
    }
    Ok(value)
}

fn optional<T: FromStr>(re: &Regex, section: &str) -> Option<T> {
    re.captures(section)?.get(1)?.as_str().parse().ok()
}
