use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::{ExportError, ExportFormat, FormatHandler};
use crate::analytics::aggregator::ChannelReport;
use crate::sentiment::SentimentLabel;

/// Excel形式エクスポーター（Summary / Monthly Views / Comments の3シート）
pub struct ExcelExporter {
    use_formatting: bool,
}

impl ExcelExporter {
    pub fn new() -> Self {
        Self {
            use_formatting: true,
        }
    }

    pub fn without_formatting(mut self) -> Self {
        self.use_formatting = false;
        self
    }

    fn header_format(&self) -> Option<Format> {
        if self.use_formatting {
            Some(Format::new().set_bold())
        } else {
            None
        }
    }

    fn write_header(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        headers: &[&str],
    ) -> Result<(), XlsxError> {
        let format = self.header_format();
        for (col, header) in headers.iter().enumerate() {
            match &format {
                Some(format) => {
                    worksheet.write_string_with_format(row, col as u16, *header, format)?;
                }
                None => {
                    worksheet.write_string(row, col as u16, *header)?;
                }
            }
        }
        Ok(())
    }

    /// サマリーシート
    fn write_summary_sheet(
        &self,
        workbook: &mut Workbook,
        report: &ChannelReport,
    ) -> Result<(), XlsxError> {
        let worksheet = workbook.add_worksheet().set_name("Summary")?;

        self.write_header(worksheet, 0, &["item", "value"])?;

        let rows: Vec<(&str, String)> = vec![
            ("channel", report.channel.display_name.clone()),
            ("channel_id", report.channel.id.0.clone()),
            ("run_id", report.run_id.to_string()),
            ("generated_at", report.generated_at.to_rfc3339()),
            ("strategy", report.strategy.clone()),
            ("videos", report.videos.len().to_string()),
            ("total_views", report.totals.total_views.to_string()),
            ("total_likes", report.totals.total_likes.to_string()),
            ("classified_comments", report.tally.total().to_string()),
        ];
        for (index, (label, value)) in rows.iter().enumerate() {
            let row = index as u32 + 1;
            worksheet.write_string(row, 0, *label)?;
            worksheet.write_string(row, 1, value)?;
        }

        let tally_start = rows.len() as u32 + 2;
        self.write_header(worksheet, tally_start, &["sentiment", "count", "percent"])?;
        for (offset, label) in SentimentLabel::all().iter().enumerate() {
            let row = tally_start + offset as u32 + 1;
            worksheet.write_string(row, 0, label.as_str())?;
            worksheet.write_number(row, 1, report.tally.count(*label) as f64)?;
            worksheet.write_number(row, 2, report.tally.percentage(*label))?;
        }

        Ok(())
    }

    /// 月別視聴数シート
    fn write_monthly_sheet(
        &self,
        workbook: &mut Workbook,
        report: &ChannelReport,
    ) -> Result<(), XlsxError> {
        let worksheet = workbook.add_worksheet().set_name("Monthly Views")?;

        self.write_header(worksheet, 0, &["month", "total_views"])?;
        for (index, bucket) in report.monthly_views.iter().enumerate() {
            let row = index as u32 + 1;
            worksheet.write_string(row, 0, &bucket.month_key)?;
            worksheet.write_number(row, 1, bucket.total_views as f64)?;
        }

        Ok(())
    }

    /// 分類済みコメントシート
    fn write_comments_sheet(
        &self,
        workbook: &mut Workbook,
        report: &ChannelReport,
    ) -> Result<(), XlsxError> {
        let worksheet = workbook.add_worksheet().set_name("Comments")?;

        self.write_header(worksheet, 0, &["video_id", "comment", "sentiment"])?;
        for (index, comment) in report.comments.iter().enumerate() {
            let row = index as u32 + 1;
            worksheet.write_string(row, 0, &comment.video_id.0)?;
            worksheet.write_string(row, 1, &comment.text)?;
            worksheet.write_string(row, 2, comment.label.as_str())?;
        }

        Ok(())
    }
}

impl Default for ExcelExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatHandler for ExcelExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Excel
    }

    fn export(&self, report: &ChannelReport, path: &Path) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        self.write_summary_sheet(&mut workbook, report)?;
        self.write_monthly_sheet(&mut workbook, report)?;
        self.write_comments_sheet(&mut workbook, report)?;
        workbook.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregator::{
        monthly_view_buckets, tally_labels, view_totals, ClassifiedComment,
    };
    use crate::api::models::{Channel, ChannelId, Video, VideoId};
    use crate::fetcher::RunWarnings;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn sample_report() -> ChannelReport {
        let videos = vec![Video {
            id: VideoId("vid1".to_string()),
            title: "v".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            view_count: 100,
            like_count: 5,
        }];
        let comments = vec![ClassifiedComment {
            video_id: VideoId("vid1".to_string()),
            text: "good stuff".to_string(),
            label: SentimentLabel::Positive,
        }];
        ChannelReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            channel: Channel {
                id: ChannelId("UCtest".to_string()),
                display_name: "Test Channel".to_string(),
            },
            totals: view_totals(&videos),
            monthly_views: monthly_view_buckets(&videos),
            tally: tally_labels(comments.iter().map(|c| c.label)),
            videos,
            comments,
            strategy: "lexicon".to_string(),
            warnings: RunWarnings::default(),
        }
    }

    #[test]
    fn test_export_creates_workbook_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");

        ExcelExporter::new().export(&sample_report(), &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_export_without_formatting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.xlsx");

        ExcelExporter::new()
            .without_formatting()
            .export(&sample_report(), &path)
            .unwrap();

        assert!(path.exists());
    }
}
