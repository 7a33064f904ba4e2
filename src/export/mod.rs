//! Export Module
//!
//! CSV files built from stored weighings.

mod csv;
mod report;

pub use csv::{encode_csv, read_csv, CsvExporter, ExportOutcome};
pub use report::ReportKind;
