// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::rule::{RedirectRule, RemovalRule, Rule, RuleSet};
use crate::domain::models::sitemap_index::SitemapIndex;
use crate::domain::models::verdict::{RedirectVerdict, RemovalVerdict, Verdict};
use crate::engines::traits::{ProbeRequest, UrlProber};
use crate::utils::retry_policy::Sleeper;
use crate::utils::url_utils::UrlResolver;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 校验运行结果
#[derive(Debug, Clone, Default)]
pub struct VerificationRun {
    /// 按规则输入顺序排列的结果
    pub verdicts: Vec<Verdict>,
    /// 是否被中断（此时结果不完整）
    pub interrupted: bool,
    /// 运行期间的非致命警告
    pub warnings: Vec<String>,
    /// 站点地图中的URL数量
    pub sitemap_urls: usize,
}

/// 分类统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindSummary {
    pub total: usize,
    pub passed: usize,
}

/// 站点地图分析
///
/// 统计各类URL在站点地图中的确认情况；站点地图不可用时所有"已确认"计数为 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SitemapAnalysis {
    pub sitemap_urls: usize,
    pub redirects: usize,
    /// 期望URL出现在站点地图中的数量
    pub expected_found: usize,
    /// 原始URL确认已从站点地图移除的数量
    pub originals_removed: usize,
    pub removals: usize,
    /// 删除URL确认不在站点地图中的数量
    pub removals_absent: usize,
}

impl SitemapAnalysis {
    /// 仍列在站点地图中（或无法确认）的原始URL数量
    pub fn originals_listed(&self) -> usize {
        self.redirects - self.originals_removed
    }

    /// 仍列在站点地图中（或无法确认）的删除URL数量
    pub fn removals_listed(&self) -> usize {
        self.removals - self.removals_absent
    }
}

impl VerificationRun {
    /// 所有规则都通过且运行未被中断
    pub fn all_passed(&self) -> bool {
        !self.interrupted && self.verdicts.iter().all(Verdict::passed)
    }

    pub fn redirect_summary(&self) -> KindSummary {
        self.summarize(|verdict| matches!(verdict, Verdict::Redirect(_)))
    }

    pub fn removal_summary(&self) -> KindSummary {
        self.summarize(|verdict| matches!(verdict, Verdict::Removal(_)))
    }

    /// 汇总站点地图相关的检查结果
    pub fn sitemap_analysis(&self) -> SitemapAnalysis {
        self.verdicts.iter().fold(
            SitemapAnalysis {
                sitemap_urls: self.sitemap_urls,
                ..SitemapAnalysis::default()
            },
            |mut analysis, verdict| {
                match verdict {
                    Verdict::Redirect(v) => {
                        analysis.redirects += 1;
                        analysis.expected_found += usize::from(v.expected_in_sitemap);
                        analysis.originals_removed += usize::from(v.original_removed);
                    }
                    Verdict::Removal(v) => {
                        analysis.removals += 1;
                        analysis.removals_absent += usize::from(v.removed_from_sitemap);
                    }
                }
                analysis
            },
        )
    }

    fn summarize(&self, filter: impl Fn(&Verdict) -> bool) -> KindSummary {
        self.verdicts
            .iter()
            .filter(|verdict| filter(verdict))
            .fold(KindSummary::default(), |mut summary, verdict| {
                summary.total += 1;
                if verdict.passed() {
                    summary.passed += 1;
                }
                summary
            })
    }
}

/// 校验引擎
///
/// 按输入顺序逐条处理规则，每条规则之间插入固定的礼貌间隔。
/// 探测失败只记录在结果中，不会中断批量校验；引擎只返回数据，不做输出。
pub struct VerificationService {
    prober: Arc<dyn UrlProber>,
    index: Arc<SitemapIndex>,
    resolver: UrlResolver,
    sleeper: Arc<dyn Sleeper>,
    timeout: Duration,
    max_retries: u32,
    request_interval: Duration,
}

impl VerificationService {
    pub fn new(
        prober: Arc<dyn UrlProber>,
        index: Arc<SitemapIndex>,
        resolver: UrlResolver,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            prober,
            index,
            resolver,
            sleeper,
            timeout: Duration::from_secs(5),
            max_retries: 3,
            request_interval: Duration::from_millis(100),
        }
    }

    /// 设置单次探测的超时和最大尝试次数
    pub fn with_probe_limits(mut self, timeout: Duration, max_retries: u32) -> Self {
        self.timeout = timeout;
        self.max_retries = max_retries;
        self
    }

    /// 设置规则之间的间隔
    pub fn with_request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    fn request(&self, url: String) -> ProbeRequest {
        ProbeRequest {
            url,
            timeout: self.timeout,
            max_retries: self.max_retries,
        }
    }

    /// 校验重定向规则
    ///
    /// 探测期望URL，再检查期望URL在站点地图中、原始URL已从站点地图移除
    pub async fn verify_redirect(&self, rule: &RedirectRule) -> RedirectVerdict {
        let target = self.resolver.prepare(&rule.expected_url);
        let probe = self.prober.probe(&self.request(target)).await;

        let expected_in_sitemap = self.index.contains(&probe.requested_url, false);
        let prepared_original = self.resolver.prepare(&rule.original_url);
        let original_removed = self.index.excludes(&prepared_original, true);

        let verdict = RedirectVerdict::new(
            rule.clone(),
            prepared_original,
            probe,
            expected_in_sitemap,
            original_removed,
        );
        debug!(
            original = %rule.original_url,
            expected = %rule.expected_url,
            status = ?verdict.probe.resolved_status,
            accessible = verdict.url_accessible,
            sitemap_compliant = verdict.sitemap_compliant,
            "Redirect rule checked"
        );
        verdict
    }

    /// 校验删除规则
    pub async fn verify_removal(&self, rule: &RemovalRule) -> RemovalVerdict {
        let prepared_original = self.resolver.prepare(&rule.original_url);
        let probe = self
            .prober
            .probe(&self.request(prepared_original.clone()))
            .await;
        let removed_from_sitemap = self.index.excludes(&prepared_original, false);

        let verdict =
            RemovalVerdict::new(rule.clone(), prepared_original, probe, removed_from_sitemap);
        debug!(
            original = %rule.original_url,
            status = ?verdict.probe.resolved_status,
            class = ?verdict.removal_class,
            removed_from_sitemap = verdict.removed_from_sitemap,
            "Removal rule checked"
        );
        verdict
    }

    /// 校验单条规则
    pub async fn verify(&self, rule: &Rule) -> Verdict {
        match rule {
            Rule::Redirect(rule) => Verdict::Redirect(self.verify_redirect(rule).await),
            Rule::Removal(rule) => Verdict::Removal(self.verify_removal(rule).await),
        }
    }

    /// 校验全部规则
    ///
    /// 收到关闭信号时放弃当前规则，返回已完成的结果并标记 `interrupted`
    ///
    /// # 参数
    ///
    /// * `rules` - 规则集合
    /// * `shutdown` - 关闭信号，值变为 `true` 时停止
    pub async fn run(&self, rules: &RuleSet, mut shutdown: watch::Receiver<bool>) -> VerificationRun {
        let mut run = VerificationRun {
            sitemap_urls: self.index.len(),
            ..VerificationRun::default()
        };

        if !self.index.is_usable() {
            let outcome = self.index.outcome();
            let message = format!(
                "Sitemap unavailable from {}: {}; all sitemap checks will fail",
                outcome.source_url,
                outcome.error.as_deref().unwrap_or("no data")
            );
            warn!("{}", message);
            run.warnings.push(message);
        }

        info!(
            rules = rules.len(),
            engine = self.prober.name(),
            sitemap_urls = self.index.len(),
            "Starting verification"
        );

        for (position, rule) in rules.rules().iter().enumerate() {
            if position > 0 {
                tokio::select! {
                    biased;
                    _ = wait_for_shutdown(&mut shutdown) => {
                        run.interrupted = true;
                        break;
                    }
                    _ = self.sleeper.sleep(self.request_interval) => {}
                }
            }

            tokio::select! {
                biased;
                _ = wait_for_shutdown(&mut shutdown) => {
                    run.interrupted = true;
                    break;
                }
                verdict = self.verify(rule) => run.verdicts.push(verdict),
            }
        }

        if run.interrupted {
            warn!(
                completed = run.verdicts.len(),
                total = rules.len(),
                "Verification interrupted"
            );
        } else {
            info!(completed = run.verdicts.len(), "Verification finished");
        }

        run
    }
}

/// 等待关闭信号；发送端被丢弃时永不返回
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
#[path = "verification_service_test.rs"]
mod tests;
