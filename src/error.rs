use std::{io, path::PathBuf};

use thiserror::Error;

/// The tabular input is missing something the pipeline cannot do without.
/// Nothing is computed once this is raised.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("required column `{0}` not found in header")]
    MissingColumn(&'static str),
    #[error("could not read header: {0}")]
    Header(#[from] csv::Error),
}

/// Why a single log section was dropped. Never fatal to the whole parse.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("fields are present but not in the expected order")]
    OutOfOrder,
    #[error("field `{field}` is not a number: `{value}`")]
    InvalidNumber { field: &'static str, value: String },
    #[error("unknown schedule policy `{0}`")]
    UnknownPolicy(String),
}

/// A data row whose cells do not fit the record model.
#[derive(Debug, Error)]
#[error("row {row}: column `{column}` has invalid value `{value}`")]
pub struct RecordError {
    pub row: usize,
    pub column: &'static str,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Reported by a consumer of the finished metrics.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink `{sink}` failed: {source}")]
    Io {
        sink: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("sink `{sink}` failed: {source}")]
    Csv {
        sink: &'static str,
        #[source]
        source: csv::Error,
    },
}
