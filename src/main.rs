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

use anyhow::Context;
use sitecheck::application::use_cases::site_check_use_case::SiteCheckUseCase;
use sitecheck::config::settings::Settings;
use sitecheck::utils::retry_policy::TokioSleeper;
use sitecheck::utils::telemetry;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// 主函数
///
/// 加载配置、安装 Ctrl-C 处理并执行一次站点检查。
/// 所有规则通过时退出码为 0，否则为 1。
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // 1. Load configuration
    let settings = Settings::new().context("failed to load configuration")?;

    // 2. Initialize logging
    telemetry::init_telemetry(settings.log.json);
    info!(
        environment = %settings.site.active_environment,
        input = %settings.input.path,
        "Starting sitecheck"
    );

    // 3. Shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                warn!("Shutdown signal received, stopping after the current rule");
                let _ = shutdown_tx.send(true);
            }
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }
    });

    // 4. Run
    let use_case = SiteCheckUseCase::new(settings, Arc::new(TokioSleeper));
    let outcome = match use_case.execute(shutdown_rx).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(fatal = err.is_fatal(), "Site check aborted: {}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    for path in &outcome.reports {
        info!(path = %path.display(), "Report available");
    }

    if outcome.run.interrupted {
        warn!("Run was interrupted; results are partial");
        return Ok(ExitCode::FAILURE);
    }

    if outcome.succeeded() {
        info!(rows = outcome.total_rows, "All rules passed");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(failed = outcome.failed_count(), "Some rules failed, review the reports");
        Ok(ExitCode::FAILURE)
    }
}
