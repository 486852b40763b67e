use std::fs;
use std::path::Path;

use super::{ExportError, ExportFormat, FormatHandler};
use crate::analytics::aggregator::ChannelReport;

/// CSV形式エクスポーター（分類済みコメントテーブル）
pub struct CsvExporter {
    delimiter: char,
    include_headers: bool,
}

impl CsvExporter {
    pub fn new() -> Self {
        Self {
            delimiter: ',',
            include_headers: true,
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_headers(mut self, include_headers: bool) -> Self {
        self.include_headers = include_headers;
        self
    }

    /// CSVフィールドをエスケープ
    fn escape_csv_field(&self, field: &str) -> String {
        if field.contains(self.delimiter)
            || field.contains('"')
            || field.contains('\n')
            || field.contains('\r')
        {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn generate_headers(&self) -> String {
        ["video_id", "comment", "sentiment"].join(&self.delimiter.to_string())
    }

    /// レポートをCSV文字列へ変換
    pub fn render(&self, report: &ChannelReport) -> String {
        let mut lines = Vec::with_capacity(report.comments.len() + 1);
        if self.include_headers {
            lines.push(self.generate_headers());
        }

        for comment in &report.comments {
            let fields = [
                self.escape_csv_field(&comment.video_id.0),
                self.escape_csv_field(&comment.text),
                comment.label.as_str().to_string(),
            ];
            lines.push(fields.join(&self.delimiter.to_string()));
        }

        lines.join("\n")
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatHandler for CsvExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn export(&self, report: &ChannelReport, path: &Path) -> Result<(), ExportError> {
        fs::write(path, self.render(report))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregator::{tally_labels, ClassifiedComment, ViewTotals};
    use crate::api::models::{Channel, ChannelId, VideoId};
    use crate::fetcher::RunWarnings;
    use crate::sentiment::SentimentLabel;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_report() -> ChannelReport {
        let comments = vec![
            ClassifiedComment {
                video_id: VideoId("vid1".to_string()),
                text: "great video".to_string(),
                label: SentimentLabel::Positive,
            },
            ClassifiedComment {
                video_id: VideoId("vid2".to_string()),
                text: "has, a comma and \"quotes\"".to_string(),
                label: SentimentLabel::Neutral,
            },
        ];
        ChannelReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            channel: Channel {
                id: ChannelId("UCtest".to_string()),
                display_name: "Test Channel".to_string(),
            },
            videos: vec![],
            tally: tally_labels(comments.iter().map(|c| c.label)),
            monthly_views: vec![],
            totals: ViewTotals::default(),
            comments,
            strategy: "lexicon".to_string(),
            warnings: RunWarnings::default(),
        }
    }

    #[test]
    fn test_render_with_headers() {
        let exporter = CsvExporter::new();
        let csv = exporter.render(&sample_report());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "video_id,comment,sentiment");
        assert_eq!(lines[1], "vid1,great video,Positive");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_fields_with_delimiter_and_quotes_are_escaped() {
        let exporter = CsvExporter::new();
        let csv = exporter.render(&sample_report());
        assert!(csv.contains(r#""has, a comma and ""quotes""""#));
    }

    #[test]
    fn test_render_without_headers() {
        let exporter = CsvExporter::new().with_headers(false);
        let csv = exporter.render(&sample_report());
        assert!(csv.starts_with("vid1,"));
    }

    #[test]
    fn test_custom_delimiter() {
        let exporter = CsvExporter::new().with_delimiter(';');
        let csv = exporter.render(&sample_report());
        assert!(csv.starts_with("video_id;comment;sentiment"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.csv");
        let report = sample_report();

        CsvExporter::new().export(&report, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("vid1,great video,Positive"));
    }

    #[test]
    fn test_tally_matches_exported_rows() {
        let report = sample_report();
        assert_eq!(report.tally.total() as usize, report.comments.len());
        assert_eq!(
            report.tally,
            tally_labels(report.comments.iter().map(|c| c.label))
        );
    }
}
