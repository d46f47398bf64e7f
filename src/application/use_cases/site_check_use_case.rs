// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    config::settings::Settings,
    domain::{
        models::{site::SiteProfile, sitemap_index::FetchOutcome},
        services::{
            rule_extractor::RuleExtractor,
            verification_service::{VerificationRun, VerificationService},
        },
    },
    engines::reqwest_engine::ReqwestProbe,
    infrastructure::{
        report::{ReportSink, RunReport},
        sitemap_loader::{SitemapFetcher, SitemapLoader},
    },
    utils::{errors::SiteCheckError, retry_policy::Sleeper, url_utils::UrlResolver},
};
use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// 站点检查结果
#[derive(Debug, Clone)]
pub struct SiteCheckOutcome {
    pub run: VerificationRun,
    pub sitemap: FetchOutcome,
    /// 输入文件中的数据行数
    pub total_rows: usize,
    /// 生成的报告文件
    pub reports: Vec<PathBuf>,
}

impl SiteCheckOutcome {
    /// 全部规则通过且运行完整
    pub fn succeeded(&self) -> bool {
        self.run.all_passed()
    }

    pub fn failed_count(&self) -> usize {
        self.run.verdicts.iter().filter(|v| !v.passed()).count()
    }
}

/// 站点检查用例
///
/// 编排一次完整运行：读取规则、加载站点地图、逐条校验、写出报告。
/// 输入错误在任何探测之前返回。
pub struct SiteCheckUseCase {
    settings: Settings,
    sleeper: Arc<dyn Sleeper>,
}

impl SiteCheckUseCase {
    pub fn new(settings: Settings, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { settings, sleeper }
    }

    /// 执行站点检查
    ///
    /// # 参数
    ///
    /// * `shutdown` - 关闭信号；触发后返回已完成部分的结果，报告照常写出
    ///
    /// # 返回值
    ///
    /// * `Ok(SiteCheckOutcome)` - 运行结果
    /// * `Err(SiteCheckError)` - 配置、输入文件或报告写入错误
    pub async fn execute(
        &self,
        shutdown: watch::Receiver<bool>,
    ) -> Result<SiteCheckOutcome, SiteCheckError> {
        let settings = &self.settings;
        let profile = SiteProfile::from_settings(&settings.site)?;
        info!(
            environment = profile.active_environment(),
            base_url = %profile.base_url(),
            "Site profile resolved"
        );

        let rules = RuleExtractor::new(&settings.input, profile.clone())
            .extract_from_path(Path::new(&settings.input.path))?;

        let prober = ReqwestProbe::new(&settings.probe, self.sleeper.clone())?;
        let loader = SitemapLoader::new(
            SitemapFetcher::new(prober.client().clone()),
            settings.sitemap.clone(),
            profile.clone(),
            settings.probe.timeout(),
        );
        let index = Arc::new(loader.load().await);

        let service = VerificationService::new(
            Arc::new(prober),
            index.clone(),
            UrlResolver::new(profile.clone()),
            self.sleeper.clone(),
        )
        .with_probe_limits(settings.probe.timeout(), settings.probe.max_retries)
        .with_request_interval(settings.engine.request_interval());

        let run = service.run(&rules, shutdown).await;
        log_summary(&run);

        let base_url = profile.base_url();
        let report = RunReport {
            run: &run,
            sitemap: index.outcome(),
            environment: profile.active_environment(),
            base_url: &base_url,
            generated_at: Local::now(),
        };
        let reports = ReportSink::new(&settings.output).write_all(&report)?;

        Ok(SiteCheckOutcome {
            sitemap: index.outcome().clone(),
            total_rows: rules.total_rows(),
            reports,
            run,
        })
    }
}

fn log_summary(run: &VerificationRun) {
    for verdict in run.verdicts.iter().filter(|v| !v.passed()) {
        let record = verdict.record();
        warn!(
            kind = record.kind(),
            url = record.original_url(),
            status = ?record.probe().resolved_status,
            reason = %record.failure_reason().unwrap_or_default(),
            "Rule failed"
        );
    }

    let redirects = run.redirect_summary();
    let removals = run.removal_summary();
    info!(
        redirects_passed = redirects.passed,
        redirects_total = redirects.total,
        removals_passed = removals.passed,
        removals_total = removals.total,
        interrupted = run.interrupted,
        "Verification summary"
    );

    let analysis = run.sitemap_analysis();
    info!(
        sitemap_urls = analysis.sitemap_urls,
        expected_found = analysis.expected_found,
        expected_total = analysis.redirects,
        originals_listed = analysis.originals_listed(),
        removals_listed = analysis.removals_listed(),
        removals_total = analysis.removals,
        "Sitemap analysis"
    );
}
