// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{ColumnMapping, ColumnRef, InputSettings};
use crate::domain::models::rule::{RedirectRule, RemovalRule, Rule, RuleSet};
use crate::domain::models::site::SiteProfile;
use crate::utils::errors::SiteCheckError;
use crate::utils::url_utils::{strip_host, strip_scheme};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// 规则提取器
///
/// 从 CSV 输入中提取重定向规则和删除规则。列映射在读取表头时解析，
/// 缺失或有歧义的列会在任何探测开始前报错。
#[derive(Debug, Clone)]
pub struct RuleExtractor {
    columns: ColumnMapping,
    target_status: u16,
    removal_marker: String,
    site: SiteProfile,
}

/// 解析后的列下标
#[derive(Debug, Clone, Copy)]
struct ResolvedColumns {
    original_url: usize,
    status_code: usize,
    expected_url: usize,
}

impl RuleExtractor {
    pub fn new(input: &InputSettings, site: SiteProfile) -> Self {
        Self {
            columns: input.columns.clone(),
            target_status: input.target_status,
            removal_marker: input.removal_marker.trim().to_string(),
            site,
        }
    }

    /// 从文件提取规则
    ///
    /// # 返回值
    ///
    /// * `Ok(RuleSet)` - 按输入顺序排列的规则
    /// * `Err(SiteCheckError::NotFound)` - 文件不存在
    /// * `Err(SiteCheckError::Validation)` - 列映射无效
    pub fn extract_from_path(&self, path: &Path) -> Result<RuleSet, SiteCheckError> {
        if !path.is_file() {
            return Err(SiteCheckError::NotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        let rules = self.extract_from_reader(file)?;
        info!(
            path = %path.display(),
            rows = rules.total_rows(),
            redirects = rules.redirects().count(),
            removals = rules.removals().count(),
            "Loaded rules"
        );
        Ok(rules)
    }

    /// 从任意读取器提取规则（第一行为表头）
    pub fn extract_from_reader<R: Read>(&self, reader: R) -> Result<RuleSet, SiteCheckError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns = self.resolve_columns(&headers)?;

        let mut rules = Vec::new();
        let mut total_rows = 0;

        for record in csv_reader.records() {
            let record = record?;
            total_rows += 1;
            if let Some(rule) = self.rule_from_record(&record, columns) {
                rules.push(rule);
            } else {
                debug!(row = total_rows, "Row does not qualify as a rule");
            }
        }

        Ok(RuleSet::new(rules, total_rows))
    }

    fn resolve_columns(&self, headers: &StringRecord) -> Result<ResolvedColumns, SiteCheckError> {
        let columns = ResolvedColumns {
            original_url: resolve_column(headers, &self.columns.original_url, "original_url")?,
            status_code: resolve_column(headers, &self.columns.status_code, "status_code")?,
            expected_url: resolve_column(headers, &self.columns.expected_url, "expected_url")?,
        };

        if columns.original_url == columns.status_code
            || columns.original_url == columns.expected_url
            || columns.status_code == columns.expected_url
        {
            return Err(SiteCheckError::Validation(format!(
                "column mapping is ambiguous: original_url={}, status_code={}, expected_url={}",
                columns.original_url, columns.status_code, columns.expected_url
            )));
        }

        Ok(columns)
    }

    fn rule_from_record(&self, record: &StringRecord, columns: ResolvedColumns) -> Option<Rule> {
        let cell = |index: usize| record.get(index).unwrap_or("");

        let expected_raw = cell(columns.expected_url);
        let status = parse_status(cell(columns.status_code));
        let original_url = self.clean_url(cell(columns.original_url));

        if self.is_removal_marker(expected_raw) {
            if original_url.is_empty() {
                return None;
            }
            return Some(Rule::Removal(RemovalRule {
                original_url,
                declared_status: status,
            }));
        }

        if status != Some(self.target_status) {
            return None;
        }

        let expected_url = self.clean_url(expected_raw);
        if original_url.is_empty() || expected_url.is_empty() {
            return None;
        }

        Some(Rule::Redirect(RedirectRule {
            original_url,
            expected_url,
            declared_status: self.target_status,
        }))
    }

    /// 是否为删除标记（去空白，大小写不敏感）
    pub fn is_removal_marker(&self, value: &str) -> bool {
        value.trim().eq_ignore_ascii_case(&self.removal_marker)
    }

    /// 清理URL
    ///
    /// 去掉协议；外部子域名原样保留；环境主机名统一为生产主机名；
    /// 顶级域名补上 `www.`；其他值视为站内路径。
    pub fn clean_url(&self, raw: &str) -> String {
        let mut url = raw.trim();
        if url.is_empty() {
            return String::new();
        }
        if let Some(rest) = strip_scheme(url) {
            url = rest;
        }

        if self
            .site
            .external_hosts()
            .iter()
            .any(|host| strip_host(url, host).is_some())
        {
            return url.to_string();
        }

        let production = self.site.production_host();
        if let Some(rest) = strip_host(url, production) {
            return format!("{}{}", production, rest);
        }
        if let Some(rest) = self
            .site
            .alias_hosts()
            .iter()
            .find_map(|alias| strip_host(url, alias))
        {
            return format!("{}{}", production, rest);
        }
        if let Some(rest) = strip_host(url, self.site.apex_host()) {
            return format!("{}{}", production, rest);
        }

        if url.starts_with('/') {
            url.to_string()
        } else {
            format!("/{}", url)
        }
    }
}

fn resolve_column(
    headers: &StringRecord,
    column: &ColumnRef,
    role: &str,
) -> Result<usize, SiteCheckError> {
    match column {
        ColumnRef::Index(index) => {
            if *index < headers.len() {
                Ok(*index)
            } else {
                Err(SiteCheckError::Validation(format!(
                    "{} column index {} is out of range (input has {} columns)",
                    role,
                    index,
                    headers.len()
                )))
            }
        }
        ColumnRef::Name(name) => {
            let matches: Vec<usize> = headers
                .iter()
                .enumerate()
                .filter(|(_, header)| header.trim().eq_ignore_ascii_case(name.trim()))
                .map(|(index, _)| index)
                .collect();
            match matches.as_slice() {
                [index] => Ok(*index),
                [] => Err(SiteCheckError::Validation(format!(
                    "{} column '{}' not found in header",
                    role, name
                ))),
                _ => Err(SiteCheckError::Validation(format!(
                    "{} column '{}' is ambiguous ({} header matches)",
                    role,
                    name,
                    matches.len()
                ))),
            }
        }
    }
}

/// 解析状态码单元格，接受 `301` 和 `301.0`
fn parse_status(value: &str) -> Option<u16> {
    let value = value.trim();
    if let Ok(status) = value.parse::<u16>() {
        return Some(status);
    }
    let float = value.parse::<f64>().ok()?;
    if float.is_finite() && float.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&float) {
        Some(float as u16)
    } else {
        None
    }
}
