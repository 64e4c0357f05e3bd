use crate::error::Result;
use crate::models::{AnalysisResult, REPORT_COLUMNS};
use std::fs::File;
use std::path::Path;

pub struct CsvWriter {
    writer: csv::Writer<File>,
}

impl CsvWriter {
    /// Truncates `path` and writes the fixed report header.
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(REPORT_COLUMNS)?;
        Ok(Self { writer })
    }

    pub fn write_result(&mut self, result: &AnalysisResult) -> Result<()> {
        self.writer.serialize(result)?;
        Ok(())
    }

    pub fn write_results(&mut self, results: &[AnalysisResult]) -> Result<()> {
        for result in results {
            self.write_result(result)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
