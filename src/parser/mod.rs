pub mod log_text;
pub mod tabular;

pub use log_text::{parse_log, read_log, LogLoad, LogParse, SectionOutcome, SkippedSection};
pub use tabular::{parse_table, read_table, Table};
