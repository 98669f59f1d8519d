use std::{fs::File, io::Read, path::Path};

use log::{debug, info};
use csv::StringRecord;
use serde::{Deserialize, Deserializer};

use crate::{
    error::{AnalysisError, RecordError, SchemaError},
    record::ExperimentRecord,
};

pub const POINTS: &str = "n_pontos";
pub const CLUSTERS: &str = "n_centroids";
pub const THREADS: &str = "n_threads";
pub const TIME: &str = "tempo";
pub const SERIAL_FLAG: &str = "serial_omp";
pub const SPEEDUP: &str = "speedup";

const REQUIRED: [&str; 4] = [POINTS, CLUSTERS, THREADS, TIME];

/// Typed records in input order, next to the trimmed header and raw cells they
/// were read from. Columns beyond the required ones are kept but not interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
    pub records: Vec<ExperimentRecord>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

#[derive(Debug, Deserialize)]
struct RawRow {
    n_pontos: u64,
    n_centroids: u32,
    n_threads: u32,
    tempo: f64,
    #[serde(default, deserialize_with = "deserialize_flag")]
    serial_omp: bool,
}

/// Accepts the spellings pandas and hand-written files use for booleans.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(serde::de::Error::custom(format!(
            "invalid serial flag `{v}`"
        ))),
    }
}

pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Table, AnalysisError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let table = parse_table(file)?;
    info!(
        "loaded {} record(s) from {}",
        table.records.len(),
        path.display()
    );
    Ok(table)
}

pub fn parse_table<R: Read>(input: R) -> Result<Table, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers().map_err(SchemaError::Header)?.clone();
    for column in REQUIRED {
        if !headers.iter().any(|h| h == column) {
            return Err(SchemaError::MissingColumn(column).into());
        }
    }

    let mut rows = Vec::new();
    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        let raw: RawRow = row.deserialize(Some(&headers))?;
        let record = validate(idx + 1, raw)?;
        debug!("row {}: {:?}", idx + 1, record);
        rows.push(row);
        records.push(record);
    }

    Ok(Table {
        headers,
        rows,
        records,
    })
}

fn validate(row: usize, raw: RawRow) -> Result<ExperimentRecord, RecordError> {
    let invalid = |column: &'static str, value: String| RecordError { row, column, value };
    if raw.n_pontos == 0 {
        return Err(invalid(POINTS, raw.n_pontos.to_string()));
    }
    if raw.n_centroids == 0 {
        return Err(invalid(CLUSTERS, raw.n_centroids.to_string()));
    }
    if raw.n_threads == 0 {
        return Err(invalid(THREADS, raw.n_threads.to_string()));
    }
    if !raw.tempo.is_finite() || raw.tempo < 0.0 {
        return Err(invalid(TIME, raw.tempo.to_string()));
    }
    Ok(ExperimentRecord {
        point_count: raw.n_pontos,
        cluster_count: raw.n_centroids,
        thread_count: raw.n_threads,
        elapsed_time: raw.tempo,
        is_serial_marker: raw.serial_omp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestDir, SAMPLE_CSV};

    #[test]
    fn test_parse_trims_header_whitespace() {
        let input = "n_pontos, n_centroids , n_threads,tempo, serial_omp\n\
                     1000,4,1,100.0,True\n\
                     1000,4,2,55.0,False\n";
        let table = parse_table(input.as_bytes()).unwrap();
        assert_eq!(table.column(SERIAL_FLAG), Some(4));
        assert_eq!(&table.headers[1], CLUSTERS);
        assert_eq!(table.records.len(), 2);
        assert_eq!(
            table.records[0],
            ExperimentRecord {
                point_count: 1000,
                cluster_count: 4,
                thread_count: 1,
                elapsed_time: 100.0,
                is_serial_marker: true,
            }
        );
        assert!(!table.records[1].is_serial_marker);
    }

    #[test]
    fn test_parse_preserves_row_order() {
        let table = parse_table(SAMPLE_CSV.as_bytes()).unwrap();
        let threads: Vec<u32> = table.records.iter().map(|r| r.thread_count).collect();
        assert_eq!(threads, vec![1, 2, 4, 8, 1, 2, 4, 8]);
    }

    #[test]
    fn test_serial_flag_is_optional() {
        let input = "n_pontos,n_centroids,n_threads,tempo\n1000,4,1,10\n";
        let table = parse_table(input.as_bytes()).unwrap();
        assert_eq!(table.column(SERIAL_FLAG), None);
        assert!(!table.records[0].is_serial_marker);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let input = "n_pontos,n_centroids,tempo\n1000,4,10\n";
        let err = parse_table(input.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Schema(SchemaError::MissingColumn(THREADS))
        ));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let input = "n_pontos,n_centroids,n_threads,tempo\n1000,4,0,10\n";
        let err = parse_table(input.as_bytes()).unwrap_err();
        match err {
            AnalysisError::Record(e) => {
                assert_eq!(e.row, 1);
                assert_eq!(e.column, THREADS);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_cell_is_an_error() {
        let input = "n_pontos,n_centroids,n_threads,tempo\n1000,4,two,10\n";
        assert!(matches!(
            parse_table(input.as_bytes()),
            Err(AnalysisError::Csv(_))
        ));
    }

    #[test]
    fn test_raw_cells_kept_alongside_records() {
        let input = "n_threads,n_pontos,n_centroids,tempo,serial_omp,iteracoes\n\
                     1,1000,4,100.0,1,21\n\
                     2,1000,4,50.0,0,21\n";
        let table = parse_table(input.as_bytes()).unwrap();
        assert_eq!(table.column(THREADS), Some(0));
        assert_eq!(table.column("iteracoes"), Some(5));
        assert_eq!(table.rows.len(), 2);
        assert_eq!(&table.rows[0][3], "100.0");
        assert_eq!(&table.rows[1][4], "0");
        assert_eq!(table.records[0].thread_count, 1);
        assert_eq!(table.records[0].point_count, 1000);
        assert!(table.records[0].is_serial_marker);
        assert!(!table.records[1].is_serial_marker);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let input = "n_pontos,n_centroids,n_threads,tempo,serial_omp,speedup\n\
                     1000,4,2,50,False,2\n\
                     1000,4,4,25,False,\n";
        let table = parse_table(input.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 2);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TestDir::new("tabular_missing_file");
        let err = read_table(dir.as_ref().join("nope.csv")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn test_read_from_disk() {
        let dir = TestDir::new("tabular_read_from_disk");
        let path = dir.as_ref().join("results.csv");
        std::fs::write(&path, SAMPLE_CSV).unwrap();
        let table = read_table(&path).unwrap();
        assert_eq!(table.records.len(), 8);
    }
}
