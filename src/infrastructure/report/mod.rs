// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 报告输出
//!
//! 把校验结果写成按日期命名的 CSV 明细和 HTML 报告

pub mod csv_report;
pub mod html_report;

use crate::config::settings::OutputSettings;
use crate::domain::models::sitemap_index::FetchOutcome;
use crate::domain::services::verification_service::VerificationRun;
use crate::utils::errors::SiteCheckError;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

pub use csv_report::CsvReportWriter;
pub use html_report::HtmlReportWriter;

/// 一次运行的报告数据
pub struct RunReport<'a> {
    pub run: &'a VerificationRun,
    pub sitemap: &'a FetchOutcome,
    pub environment: &'a str,
    pub base_url: &'a str,
    pub generated_at: DateTime<Local>,
}

impl RunReport<'_> {
    /// 文件名中使用的日期（YYYY-MM-DD）
    pub fn date_stamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d").to_string()
    }
}

/// 报告写入器特质
pub trait ReportWriter: Send + Sync {
    /// 写入报告，返回生成的文件路径
    fn write(&self, report: &RunReport<'_>, dir: &Path) -> Result<PathBuf, SiteCheckError>;

    /// 写入器名称
    fn name(&self) -> &'static str;
}

/// 报告输出器
///
/// 按配置组合 CSV 和 HTML 写入器
pub struct ReportSink {
    dir: PathBuf,
    writers: Vec<Box<dyn ReportWriter>>,
}

impl ReportSink {
    pub fn new(settings: &OutputSettings) -> Self {
        let mut writers: Vec<Box<dyn ReportWriter>> = Vec::new();
        if settings.csv {
            writers.push(Box::new(CsvReportWriter));
        }
        if settings.html {
            writers.push(Box::new(HtmlReportWriter));
        }
        Self {
            dir: PathBuf::from(&settings.dir),
            writers,
        }
    }

    /// 写入全部启用的报告
    pub fn write_all(&self, report: &RunReport<'_>) -> Result<Vec<PathBuf>, SiteCheckError> {
        if self.writers.is_empty() {
            return Ok(Vec::new());
        }
        std::fs::create_dir_all(&self.dir)?;

        let mut paths = Vec::with_capacity(self.writers.len());
        for writer in &self.writers {
            let path = writer.write(report, &self.dir)?;
            info!(writer = writer.name(), path = %path.display(), "Report written");
            paths.push(path);
        }
        Ok(paths)
    }
}

/// 重定向链格式化为 `301,302`
pub(crate) fn format_chain(chain: &[u16]) -> String {
    chain
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
