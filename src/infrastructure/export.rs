use std::path::Path;

use tracing::info;

use crate::domain::{ExportError, Record};

pub struct CsvExporter;

impl CsvExporter {
    /// Writes `records` to `path` with a header row using the wire field names.
    ///
    /// Returns the path written, for the status bar.
    pub fn export_records(records: &[Record], path: impl AsRef<Path>) -> Result<String, ExportError> {
        if records.is_empty() {
            return Err(ExportError::NoRecords);
        }

        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!(path = %path.display(), count = records.len(), "exported page to CSV");
        Ok(path.display().to_string())
    }
}
