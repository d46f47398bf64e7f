// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::probe::{ProbeResult, RemovalClass};
use crate::domain::models::rule::{RedirectRule, RemovalRule};

/// 校验结果的公共报告接口
pub trait VerdictRecord {
    /// 规则类型（"redirect" / "remove"）
    fn kind(&self) -> &'static str;
    fn original_url(&self) -> &str;
    /// 目标URL（删除规则为删除标记）
    fn target_url(&self) -> &str;
    fn probe(&self) -> &ProbeResult;
    /// 权威成功标志
    fn passed(&self) -> bool;
    /// 失败原因摘要
    fn failure_reason(&self) -> Option<String>;
}

/// 重定向规则校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectVerdict {
    pub rule: RedirectRule,
    /// 按请求规则准备后的原始URL
    pub prepared_original: String,
    pub url_accessible: bool,
    pub expected_in_sitemap: bool,
    pub original_removed: bool,
    pub sitemap_compliant: bool,
    pub overall_success: bool,
    pub probe: ProbeResult,
}

impl RedirectVerdict {
    /// 由探测结果和站点地图查询结果构建
    ///
    /// 派生字段在此统一计算，保证 `overall_success` 蕴含三个条件同时成立。
    /// `original_removed` 只有在站点地图可用且确认不含原始URL时才为 `true`。
    pub fn new(
        rule: RedirectRule,
        prepared_original: String,
        probe: ProbeResult,
        expected_in_sitemap: bool,
        original_removed: bool,
    ) -> Self {
        let url_accessible = probe.is_ok_200();
        let sitemap_compliant = expected_in_sitemap && original_removed;
        Self {
            rule,
            prepared_original,
            url_accessible,
            expected_in_sitemap,
            original_removed,
            sitemap_compliant,
            overall_success: url_accessible && sitemap_compliant,
            probe,
        }
    }
}

impl VerdictRecord for RedirectVerdict {
    fn kind(&self) -> &'static str {
        "redirect"
    }

    fn original_url(&self) -> &str {
        &self.rule.original_url
    }

    fn target_url(&self) -> &str {
        &self.rule.expected_url
    }

    fn probe(&self) -> &ProbeResult {
        &self.probe
    }

    fn passed(&self) -> bool {
        self.overall_success
    }

    fn failure_reason(&self) -> Option<String> {
        if self.overall_success {
            return None;
        }
        let mut reasons = Vec::new();
        if let Some(error) = &self.probe.error {
            reasons.push(error.to_string());
        } else if !self.url_accessible {
            match self.probe.resolved_status {
                Some(status) => reasons.push(format!("Expected URL returns {}", status)),
                None => reasons.push("Expected URL unreachable".to_string()),
            }
        }
        if !self.expected_in_sitemap {
            reasons.push("Expected URL missing from sitemap".to_string());
        }
        if !self.original_removed {
            reasons.push("Original URL still in sitemap".to_string());
        }
        Some(reasons.join("; "))
    }
}

/// 删除规则校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalVerdict {
    pub rule: RemovalRule,
    pub prepared_original: String,
    pub removal_class: RemovalClass,
    pub url_inaccessible: bool,
    pub removed_from_sitemap: bool,
    /// 权威成功标志
    pub fully_removed: bool,
    pub probe: ProbeResult,
}

impl RemovalVerdict {
    /// 由探测结果和站点地图查询结果构建
    ///
    /// 探测侧是否成功由删除分类决定：只有 404/410 或重定向离开算作不可访问。
    /// 没有任何响应、其他状态码（包括内容过小的 200）都不能证明URL已删除。
    pub fn new(
        rule: RemovalRule,
        prepared_original: String,
        probe: ProbeResult,
        removed_from_sitemap: bool,
    ) -> Self {
        let removal_class = probe.removal_class();
        let url_inaccessible = removal_class.is_acceptable();
        Self {
            rule,
            prepared_original,
            removal_class,
            url_inaccessible,
            removed_from_sitemap,
            fully_removed: url_inaccessible && removed_from_sitemap,
            probe,
        }
    }
}

impl VerdictRecord for RemovalVerdict {
    fn kind(&self) -> &'static str {
        "remove"
    }

    fn original_url(&self) -> &str {
        &self.rule.original_url
    }

    fn target_url(&self) -> &str {
        ""
    }

    fn probe(&self) -> &ProbeResult {
        &self.probe
    }

    fn passed(&self) -> bool {
        self.fully_removed
    }

    fn failure_reason(&self) -> Option<String> {
        if self.fully_removed {
            return None;
        }
        let mut reasons = Vec::new();
        if let Some(error) = &self.probe.error {
            reasons.push(error.to_string());
        }
        if let RemovalClass::StillServed(status) = self.removal_class {
            reasons.push(format!("URL should be removed but returns {}", status));
        }
        if !self.removed_from_sitemap {
            reasons.push("URL still in sitemap".to_string());
        }
        if reasons.is_empty() {
            reasons.push("URL still accessible".to_string());
        }
        Some(reasons.join("; "))
    }
}

/// 单条规则的校验结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Redirect(RedirectVerdict),
    Removal(RemovalVerdict),
}

impl Verdict {
    /// 作为公共报告接口使用
    pub fn record(&self) -> &dyn VerdictRecord {
        match self {
            Verdict::Redirect(v) => v,
            Verdict::Removal(v) => v,
        }
    }

    pub fn passed(&self) -> bool {
        self.record().passed()
    }
}
