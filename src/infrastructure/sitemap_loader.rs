// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SitemapSettings;
use crate::domain::models::site::SiteProfile;
use crate::domain::models::sitemap_index::{FetchOutcome, SitemapIndex};
use crate::utils::errors::SiteCheckError;
use crate::utils::sitemap_parser::parse_sitemap;
use crate::utils::url_utils::UrlNormalizer;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{info, warn};

/// 站点地图下载器
///
/// 复用探测引擎的 HTTP 客户端
#[derive(Clone)]
pub struct SitemapFetcher {
    client: Client,
}

impl SitemapFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 下载站点地图文档
    ///
    /// 非 200 状态码和传输错误都返回 `SiteCheckError::Fetch`
    pub async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, SiteCheckError> {
        let fetch_error = |reason: String| SiteCheckError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(fetch_error(format!("HTTP {}", status.as_u16())));
        }

        response.text().await.map_err(|e| fetch_error(e.to_string()))
    }
}

/// 站点地图加载器
///
/// 决定站点地图地址、执行生产环境回退，并构建只读的 [`SitemapIndex`]。
/// 获取和解析失败都不会中断运行。
pub struct SitemapLoader {
    fetcher: SitemapFetcher,
    settings: SitemapSettings,
    profile: SiteProfile,
    timeout: Duration,
}

impl SitemapLoader {
    pub fn new(
        fetcher: SitemapFetcher,
        settings: SitemapSettings,
        profile: SiteProfile,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            settings,
            profile,
            timeout,
        }
    }

    /// 当前环境的站点地图URL
    pub fn primary_url(&self) -> String {
        match &self.settings.url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => format!("{}{}", self.profile.base_url(), self.path()),
        }
    }

    /// 生产环境回退URL（仅在启用且当前不是生产环境时存在）
    pub fn fallback_url(&self) -> Option<String> {
        if self.settings.enable_fallback && !self.profile.is_production() {
            Some(format!("{}{}", self.profile.production_base_url(), self.path()))
        } else {
            None
        }
    }

    fn path(&self) -> String {
        let path = self.settings.path.trim();
        if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        }
    }

    /// 加载站点地图索引
    pub async fn load(&self) -> SitemapIndex {
        let normalizer = UrlNormalizer::new(&self.profile);
        let primary = self.primary_url();

        let (source_url, used_fallback, document) =
            match self.fetcher.fetch(&primary, self.timeout).await {
                Ok(document) => (primary, false, document),
                Err(primary_error) => {
                    warn!(url = %primary, error = %primary_error, "Sitemap fetch failed");
                    let Some(fallback) = self.fallback_url() else {
                        return SitemapIndex::empty(
                            normalizer,
                            FetchOutcome {
                                source_url: primary,
                                success: false,
                                error: Some(primary_error.to_string()),
                                ..FetchOutcome::default()
                            },
                        );
                    };

                    info!(url = %fallback, "Trying production sitemap");
                    match self.fetcher.fetch(&fallback, self.timeout).await {
                        Ok(document) => (fallback, true, document),
                        Err(fallback_error) => {
                            warn!(url = %fallback, error = %fallback_error, "Production sitemap fetch failed");
                            return SitemapIndex::empty(
                                normalizer,
                                FetchOutcome {
                                    source_url: fallback,
                                    success: false,
                                    used_fallback: true,
                                    error: Some(fallback_error.to_string()),
                                    ..FetchOutcome::default()
                                },
                            );
                        }
                    }
                }
            };

        let mut outcome = FetchOutcome {
            source_url,
            success: true,
            byte_size: document.len(),
            used_fallback,
            error: None,
        };

        match parse_sitemap(&document) {
            Ok(parsed) => {
                info!(
                    url = %outcome.source_url,
                    bytes = outcome.byte_size,
                    urls = parsed.locations.len(),
                    namespace = ?parsed.matched_namespace,
                    fallback = used_fallback,
                    "Sitemap loaded"
                );
                SitemapIndex::from_locations(parsed.locations, normalizer, outcome)
            }
            Err(error) => {
                warn!(url = %outcome.source_url, %error, "Sitemap could not be parsed");
                outcome.error = Some(error.to_string());
                SitemapIndex::empty(normalizer, outcome)
            }
        }
    }
}
