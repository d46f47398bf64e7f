// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SiteSettings;
use crate::utils::errors::SiteCheckError;

/// 站点环境描述
///
/// 从配置构建一次，包含当前环境、生产环境主机名以及需要折叠的
/// 非生产环境主机名。所有主机名均已转为小写。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteProfile {
    scheme: String,
    active_environment: String,
    active_host: String,
    production_host: String,
    alias_hosts: Vec<String>,
    external_hosts: Vec<String>,
}

impl SiteProfile {
    /// 从站点配置构建
    ///
    /// 当前环境或生产环境未在 `environments` 中定义时返回 `Validation` 错误
    pub fn from_settings(settings: &SiteSettings) -> Result<Self, SiteCheckError> {
        let lookup = |name: &str| {
            settings
                .environments
                .get(name)
                .map(|host| host.trim().to_lowercase())
                .ok_or_else(|| {
                    SiteCheckError::Validation(format!("unknown environment '{}'", name))
                })
        };

        let active_host = lookup(&settings.active_environment)?;
        let production_host = lookup(&settings.production_environment)?;

        let mut alias_hosts: Vec<String> = settings
            .environments
            .values()
            .map(|host| host.trim().to_lowercase())
            .filter(|host| !host.is_empty() && *host != production_host)
            .collect();
        alias_hosts.sort();
        alias_hosts.dedup();

        Ok(Self {
            scheme: settings.scheme.trim().to_lowercase(),
            active_environment: settings.active_environment.clone(),
            active_host,
            production_host,
            alias_hosts,
            external_hosts: settings
                .external_hosts
                .iter()
                .map(|host| host.trim().to_lowercase())
                .collect(),
        })
    }

    /// 直接构建（测试和嵌入使用）
    pub fn new(
        scheme: &str,
        active_environment: &str,
        active_host: &str,
        production_host: &str,
        alias_hosts: &[&str],
        external_hosts: &[&str],
    ) -> Self {
        let production_host = production_host.to_lowercase();
        let mut aliases: Vec<String> = alias_hosts
            .iter()
            .map(|h| h.to_lowercase())
            .chain(std::iter::once(active_host.to_lowercase()))
            .filter(|h| *h != production_host)
            .collect();
        aliases.sort();
        aliases.dedup();

        Self {
            scheme: scheme.to_lowercase(),
            active_environment: active_environment.to_string(),
            active_host: active_host.to_lowercase(),
            production_host,
            alias_hosts: aliases,
            external_hosts: external_hosts.iter().map(|h| h.to_lowercase()).collect(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn active_environment(&self) -> &str {
        &self.active_environment
    }

    pub fn production_host(&self) -> &str {
        &self.production_host
    }

    /// 需要折叠为生产主机名的环境主机名
    pub fn alias_hosts(&self) -> &[String] {
        &self.alias_hosts
    }

    pub fn external_hosts(&self) -> &[String] {
        &self.external_hosts
    }

    /// 当前环境是否为生产环境
    pub fn is_production(&self) -> bool {
        self.active_host == self.production_host
    }

    /// 当前环境的基础URL，例如 `https://qa-www.example.com`
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.active_host)
    }

    /// 生产环境的基础URL
    pub fn production_base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.production_host)
    }

    /// 生产主机名去掉 `www.` 后的顶级域名
    pub fn apex_host(&self) -> &str {
        self.production_host
            .strip_prefix("www.")
            .unwrap_or(&self.production_host)
    }
}
