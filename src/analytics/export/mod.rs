use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod csv_exporter;
pub mod excel_exporter;
pub mod json_exporter;

pub use csv_exporter::CsvExporter;
pub use excel_exporter::ExcelExporter;
pub use json_exporter::JsonExporter;

use crate::analytics::aggregator::ChannelReport;

/// エクスポート形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
}

impl ExportFormat {
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

/// エクスポートエラー
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Workbook error: {0}")]
    Workbook(String),
}

impl From<serde_json::Error> for ExportError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        Self::Workbook(error.to_string())
    }
}

/// エクスポート結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    pub format: ExportFormat,
    pub file_path: String,
    /// エクスポートされたコメント行数
    pub exported_records: usize,
}

/// フォーマットハンドラートレイト
pub trait FormatHandler: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn export(&self, report: &ChannelReport, path: &Path) -> Result<(), ExportError>;
}

pub fn handler_for(format: ExportFormat) -> Box<dyn FormatHandler> {
    match format {
        ExportFormat::Csv => Box::new(CsvExporter::new()),
        ExportFormat::Json => Box::new(JsonExporter::new()),
        ExportFormat::Excel => Box::new(ExcelExporter::new()),
    }
}

/// レポートを指定形式でファイルへ書き出す。
pub fn export_report(
    report: &ChannelReport,
    format: ExportFormat,
    path: &Path,
) -> Result<ExportResult, ExportError> {
    handler_for(format).export(report, path)?;
    Ok(ExportResult {
        format,
        file_path: path.display().to_string(),
        exported_records: report.comments.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extensions() {
        assert_eq!(ExportFormat::Csv.file_extension(), "csv");
        assert_eq!(ExportFormat::Json.file_extension(), "json");
        assert_eq!(ExportFormat::Excel.file_extension(), "xlsx");
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
        assert_eq!(ExportFormat::Json.mime_type(), "application/json");
    }
}
