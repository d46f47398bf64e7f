// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{format_chain, ReportWriter, RunReport};
use crate::domain::models::verdict::Verdict;
use crate::utils::errors::SiteCheckError;
use std::path::{Path, PathBuf};

const HEADER: [&str; 18] = [
    "test_type",
    "original_url",
    "expected_url",
    "tested_url",
    "status_code",
    "response_time",
    "redirect_chain",
    "attempts",
    "url_accessible",
    "expected_in_sitemap",
    "original_removed",
    "sitemap_compliant",
    "url_inaccessible",
    "removal_class",
    "removed_from_sitemap",
    "fully_removed",
    "success",
    "error",
];

fn flag(value: bool) -> String {
    value.to_string()
}

/// CSV 明细写入器：`test_results_<日期>.csv`
pub struct CsvReportWriter;

impl CsvReportWriter {
    fn row(verdict: &Verdict) -> Vec<String> {
        let record = verdict.record();
        let probe = record.probe();

        // Per-kind flag columns stay empty for the other kind
        let flags: [String; 8] = match verdict {
            Verdict::Redirect(v) => [
                flag(v.url_accessible),
                flag(v.expected_in_sitemap),
                flag(v.original_removed),
                flag(v.sitemap_compliant),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ],
            Verdict::Removal(v) => [
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                flag(v.url_inaccessible),
                format!("{:?}", v.removal_class),
                flag(v.removed_from_sitemap),
                flag(v.fully_removed),
            ],
        };

        let mut row = vec![
            record.kind().to_string(),
            record.original_url().to_string(),
            record.target_url().to_string(),
            probe.requested_url.clone(),
            probe
                .resolved_status
                .map(|status| status.to_string())
                .unwrap_or_default(),
            format!("{:.3}", probe.elapsed.as_secs_f64()),
            format_chain(&probe.redirect_chain),
            probe.attempts.to_string(),
        ];
        row.extend(flags);
        row.push(flag(record.passed()));
        row.push(record.failure_reason().unwrap_or_default());
        row
    }
}

impl ReportWriter for CsvReportWriter {
    fn write(&self, report: &RunReport<'_>, dir: &Path) -> Result<PathBuf, SiteCheckError> {
        let path = dir.join(format!("test_results_{}.csv", report.date_stamp()));
        let mut writer = csv::Writer::from_path(&path)?;

        writer.write_record(HEADER)?;
        for verdict in &report.run.verdicts {
            writer.write_record(Self::row(verdict))?;
        }
        writer.flush()?;

        Ok(path)
    }

    fn name(&self) -> &'static str {
        "csv"
    }
}
