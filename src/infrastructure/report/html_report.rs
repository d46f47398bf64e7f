// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::{format_chain, ReportWriter, RunReport};
use crate::domain::models::verdict::Verdict;
use crate::utils::errors::SiteCheckError;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 40px; background-color: #f5f5f5; }
.container { background-color: white; padding: 30px; border-radius: 8px; }
.header { text-align: center; border-bottom: 2px solid #007acc; padding-bottom: 20px; }
.stats { display: flex; justify-content: space-around; margin: 30px 0; }
.stat-box { text-align: center; padding: 20px; background-color: #f8f9fa; border-radius: 5px; }
.stat-number { font-size: 2em; font-weight: bold; }
.success { color: #28a745; }
.failure { color: #dc3545; }
table { width: 100%; border-collapse: collapse; margin: 20px 0; }
th, td { padding: 10px; text-align: left; border-bottom: 1px solid #ddd; }
th { background-color: #007acc; color: white; }
.pass { background-color: #d4edda; }
.fail { background-color: #f8d7da; }
.warning { color: #856404; background-color: #fff3cd; padding: 10px; }
";

/// HTML 报告写入器：`test_report_<日期>.html`
pub struct HtmlReportWriter;

impl HtmlReportWriter {
    /// 渲染完整的HTML文档
    pub fn render(report: &RunReport<'_>) -> String {
        let redirects = report.run.redirect_summary();
        let removals = report.run.removal_summary();
        let sitemap = report.sitemap;
        let analysis = report.run.sitemap_analysis();

        let mut html = String::new();
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Sitemap Verification Report</title>\n<style>\n{}</style>\n</head>\n<body>\n\
             <div class=\"container\">\n<div class=\"header\">\n<h1>Sitemap Verification Report</h1>\n\
             <p>Generated on {}</p>\n<p>Environment: <strong>{}</strong> ({})</p>\n</div>\n",
            STYLE,
            report.generated_at.format("%Y-%m-%d at %H:%M:%S"),
            encode_text(&report.environment.to_uppercase()),
            encode_text(report.base_url),
        );

        if report.run.interrupted {
            html.push_str("<p class=\"warning\">Run interrupted: results are partial.</p>\n");
        }
        for warning in &report.run.warnings {
            let _ = writeln!(html, "<p class=\"warning\">{}</p>", encode_text(warning));
        }

        html.push_str("<div class=\"stats\">\n");
        for (number, label, class) in [
            (redirects.passed, "Redirects Passed", "success"),
            (redirects.total - redirects.passed, "Redirects Failed", "failure"),
            (removals.passed, "URLs Removed", "success"),
            (removals.total - removals.passed, "Remove Failed", "failure"),
        ] {
            let _ = writeln!(
                html,
                "<div class=\"stat-box\"><div class=\"stat-number {}\">{}</div><div>{}</div></div>",
                class, number, label
            );
        }
        html.push_str("</div>\n");

        let _ = writeln!(
            html,
            "<div class=\"section\">\n<h2>Sitemap</h2>\n<p>Source: <a href=\"{}\">{}</a></p>\n\
             <p>Status: {}{}</p>\n<p>Size: {} bytes</p>\n<p>Total URLs in sitemap: {}</p>\n\
             <p>Expected URLs found: {}/{}</p>\n<p>Original URLs still listed: {}/{}</p>\n\
             <p>Removed URLs still listed: {}/{}</p>\n</div>",
            encode_double_quoted_attribute(&sitemap.source_url),
            encode_text(&sitemap.source_url),
            if sitemap.success && sitemap.error.is_none() {
                "loaded"
            } else {
                "failed"
            },
            if sitemap.used_fallback {
                " (production fallback)"
            } else {
                ""
            },
            sitemap.byte_size,
            analysis.sitemap_urls,
            analysis.expected_found,
            analysis.redirects,
            analysis.originals_listed(),
            analysis.redirects,
            analysis.removals_listed(),
            analysis.removals,
        );
        if let Some(error) = &sitemap.error {
            let _ = writeln!(html, "<p class=\"failure\">{}</p>", encode_text(error));
        }

        Self::redirect_table(&mut html, report);
        Self::removal_table(&mut html, report);

        html.push_str("</div>\n</body>\n</html>\n");
        html
    }

    fn redirect_table(html: &mut String, report: &RunReport<'_>) {
        html.push_str(
            "<div class=\"section\">\n<h2>Redirect URL Results</h2>\n<table>\n<tr><th>Original URL</th>\
             <th>Expected URL</th><th>Status Code</th><th>Redirect Chain</th><th>Response Time</th>\
             <th>In Sitemap</th><th>Original Removed</th><th>Result</th><th>Error</th></tr>\n",
        );
        for verdict in &report.run.verdicts {
            let Verdict::Redirect(v) = verdict else {
                continue;
            };
            let _ = writeln!(
                html,
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.3}s</td>\
                 <td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                row_class(verdict),
                encode_text(&v.rule.original_url),
                encode_text(&v.probe.requested_url),
                status_text(verdict),
                format_chain(&v.probe.redirect_chain),
                v.probe.elapsed.as_secs_f64(),
                yes_no(v.expected_in_sitemap),
                yes_no(v.original_removed),
                if v.overall_success { "PASS" } else { "FAIL" },
                encode_text(&verdict.record().failure_reason().unwrap_or_default()),
            );
        }
        html.push_str("</table>\n</div>\n");
    }

    fn removal_table(html: &mut String, report: &RunReport<'_>) {
        html.push_str(
            "<div class=\"section\">\n<h2>Remove URL Results</h2>\n<table>\n<tr><th>URL to Remove</th>\
             <th>Status Code</th><th>Redirect Chain</th><th>Response Time</th>\
             <th>Removed From Sitemap</th><th>Result</th><th>Error</th></tr>\n",
        );
        for verdict in &report.run.verdicts {
            let Verdict::Removal(v) = verdict else {
                continue;
            };
            let _ = writeln!(
                html,
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{:.3}s</td>\
                 <td>{}</td><td>{}</td><td>{}</td></tr>",
                row_class(verdict),
                encode_text(&v.prepared_original),
                status_text(verdict),
                format_chain(&v.probe.redirect_chain),
                v.probe.elapsed.as_secs_f64(),
                yes_no(v.removed_from_sitemap),
                if v.fully_removed {
                    "REMOVED"
                } else {
                    "STILL ACCESSIBLE"
                },
                encode_text(&verdict.record().failure_reason().unwrap_or_default()),
            );
        }
        html.push_str("</table>\n</div>\n");
    }
}

fn row_class(verdict: &Verdict) -> &'static str {
    if verdict.passed() {
        "pass"
    } else {
        "fail"
    }
}

fn status_text(verdict: &Verdict) -> String {
    verdict
        .record()
        .probe()
        .resolved_status
        .map(|status| status.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

impl ReportWriter for HtmlReportWriter {
    fn write(&self, report: &RunReport<'_>, dir: &Path) -> Result<PathBuf, SiteCheckError> {
        let path = dir.join(format!("test_report_{}.html", report.date_stamp()));
        std::fs::write(&path, Self::render(report))?;
        Ok(path)
    }

    fn name(&self) -> &'static str {
        "html"
    }
}
