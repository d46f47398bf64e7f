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

use crate::config::settings::ProbeSettings;
use crate::domain::models::probe::{ProbeError, ProbeResult};
use crate::engines::traits::{ProbeRequest, UrlProber};
use crate::utils::retry_policy::{RetryPolicy, Sleeper};
use crate::utils::url_utils::resolve_url;
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{redirect, Client};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

/// 单次尝试的原始响应
struct RawResponse {
    status: u16,
    body_len: usize,
    redirect_chain: Vec<u16>,
    final_url: Url,
}

/// 把 reqwest 错误归类为探测错误
fn classify_error(error: reqwest::Error) -> ProbeError {
    if error.is_timeout() {
        ProbeError::Timeout
    } else if error.is_connect() {
        ProbeError::Connection(error.to_string())
    } else if error.is_builder() {
        ProbeError::InvalidUrl(error.to_string())
    } else {
        ProbeError::Request(error.to_string())
    }
}

/// HTTP 探测引擎
///
/// 基于reqwest实现。整个运行共享一个客户端；重定向由引擎逐跳跟随，
/// 以便记录每一跳的状态码。
pub struct ReqwestProbe {
    client: Client,
    retry_delay: Duration,
    min_content_bytes: usize,
    max_redirects: usize,
    sleeper: Arc<dyn Sleeper>,
}

impl ReqwestProbe {
    /// 创建探测引擎
    ///
    /// # 参数
    ///
    /// * `settings` - 探测配置
    /// * `sleeper` - 重试退避使用的延迟执行器
    pub fn new(settings: &ProbeSettings, sleeper: Arc<dyn Sleeper>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            retry_delay: settings.retry_delay(),
            min_content_bytes: settings.min_content_bytes,
            max_redirects: settings.max_redirects,
            sleeper,
        })
    }

    /// 共享的 HTTP 客户端
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// 执行一次请求并逐跳跟随重定向
    async fn fetch_once(&self, url: &str, timeout: Duration) -> Result<RawResponse, ProbeError> {
        let mut current =
            Url::parse(url).map_err(|e| ProbeError::InvalidUrl(format!("{}: {}", url, e)))?;
        let mut redirect_chain = Vec::new();

        loop {
            let response = self
                .client
                .get(current.clone())
                .timeout(timeout)
                .send()
                .await
                .map_err(classify_error)?;

            let status = response.status();
            if status.is_redirection() && redirect_chain.len() < self.max_redirects {
                let next = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|location| resolve_url(&current, location).ok());

                if let Some(next) = next {
                    debug!(from = %current, to = %next, status = status.as_u16(), "Following redirect");
                    redirect_chain.push(status.as_u16());
                    current = next;
                    continue;
                }
            }

            let body = response.bytes().await.map_err(classify_error)?;

            return Ok(RawResponse {
                status: status.as_u16(),
                body_len: body.len(),
                redirect_chain,
                final_url: current,
            });
        }
    }
}

#[async_trait]
impl UrlProber for ReqwestProbe {
    /// 执行HTTP探测
    ///
    /// 只有超时和连接失败会按线性退避重试；200 响应内容小于阈值时记为失败
    async fn probe(&self, request: &ProbeRequest) -> ProbeResult {
        let policy = RetryPolicy::new(request.max_retries, self.retry_delay);
        let start = Instant::now();
        let mut attempt = 0;

        let outcome = loop {
            attempt += 1;
            match self.fetch_once(&request.url, request.timeout).await {
                Ok(raw) => break Ok(raw),
                Err(error) if error.is_retryable() && policy.should_retry(attempt) => {
                    let backoff = policy.calculate_backoff(attempt);
                    debug!(url = %request.url, attempt, ?backoff, %error, "Transient probe failure, retrying");
                    self.sleeper.sleep(backoff).await;
                }
                Err(error) => break Err(error),
            }
        };

        let mut result = ProbeResult {
            requested_url: request.url.clone(),
            final_url: None,
            resolved_status: None,
            elapsed: start.elapsed(),
            redirect_chain: Vec::new(),
            attempts: attempt,
            error: None,
        };

        match outcome {
            Ok(raw) => {
                result.final_url = Some(raw.final_url.to_string());
                result.resolved_status = Some(raw.status);
                result.redirect_chain = raw.redirect_chain;
                // Soft-404 guard
                if raw.status == 200 && raw.body_len < self.min_content_bytes {
                    result.error = Some(ProbeError::ContentTooSmall(raw.body_len));
                }
            }
            Err(error) => {
                result.error = Some(error);
            }
        }

        result
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
