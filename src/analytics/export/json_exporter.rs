use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::{ExportError, ExportFormat, FormatHandler};
use crate::analytics::aggregator::ChannelReport;

/// JSON形式エクスポーター（レポート全体）
pub struct JsonExporter {
    pretty: bool,
}

impl JsonExporter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatHandler for JsonExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn export(&self, report: &ChannelReport, path: &Path) -> Result<(), ExportError> {
        let writer = BufWriter::new(File::create(path)?);
        if self.pretty {
            serde_json::to_writer_pretty(writer, report)?;
        } else {
            serde_json::to_writer(writer, report)?;
        }
        Ok(())
    }
}
