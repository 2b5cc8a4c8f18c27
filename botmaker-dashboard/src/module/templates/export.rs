///! CSV export of the filtered template rows
use super::columns::ColumnLayout;
use super::error::ExportError;
use botmaker_common::TemplateRow;
use chrono::{DateTime, TimeZone};
use serde::Serialize;

/// UTF-8 byte-order mark, so spreadsheet tools pick the right encoding.
pub const CSV_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const CSV_MIME: &str = "text/csv";

/// Row counters shown above the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub filtered: usize,
}

impl Summary {
    pub fn new(all: &[TemplateRow], filtered: &[TemplateRow]) -> Self {
        Self {
            total: all.len(),
            filtered: filtered.len(),
        }
    }
}

/// Serialize `rows` as BOM-prefixed CSV with one header line.
pub fn to_csv(rows: &[TemplateRow], layout: &ColumnLayout) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(CSV_BOM.to_vec());

    writer.write_record(layout.headers())?;
    for row in rows {
        writer.write_record(layout.cells(row))?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.error().to_string()))
}

/// `botmaker_templates_<YYYYMMDD>_<HHMMSS>.csv` for the given local time.
pub fn export_filename<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("botmaker_templates_{}.csv", at.format("%Y%m%d_%H%M%S"))
}
