// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::site::SiteProfile;
use url::{ParseError, Url};

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 去掉主机名前缀后剩余部分是否从主机边界开始
fn at_host_boundary(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with(['/', ':', '?', '#'])
}

/// 若 `url` 以 `host` 开头（大小写不敏感且位于主机边界）则返回剩余部分
pub(crate) fn strip_host<'a>(url: &'a str, host: &str) -> Option<&'a str> {
    let head = url.get(..host.len())?;
    let rest = &url[host.len()..];
    (head.eq_ignore_ascii_case(host) && at_host_boundary(rest)).then_some(rest)
}

pub(crate) fn strip_scheme(url: &str) -> Option<&str> {
    ["https://", "http://"].iter().find_map(|scheme| {
        let head = url.get(..scheme.len())?;
        head.eq_ignore_ascii_case(scheme)
            .then(|| &url[scheme.len()..])
    })
}

/// URL 规范化器
///
/// 用于跨环境比较URL：去掉协议、转小写、把环境主机名折叠为生产主机名，
/// 并按需去掉末尾斜杠。纯函数，无 I/O。
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    production_host: String,
    alias_hosts: Vec<String>,
}

impl UrlNormalizer {
    pub fn new(profile: &SiteProfile) -> Self {
        let mut alias_hosts = profile.alias_hosts().to_vec();
        // longer hosts first so a shorter alias never shadows a longer one
        alias_hosts.sort_by(|a, b| b.len().cmp(&a.len()));
        Self {
            production_host: profile.production_host().to_string(),
            alias_hosts,
        }
    }

    /// 规范化URL
    ///
    /// # 参数
    ///
    /// * `url` - 原始URL
    /// * `preserve_trailing_slash` - 是否保留末尾斜杠
    ///
    /// # 返回值
    ///
    /// 规范化后的字符串；`normalize(normalize(u)) == normalize(u)`
    pub fn normalize(&self, url: &str, preserve_trailing_slash: bool) -> String {
        let mut rest = url.trim();
        while let Some(stripped) = strip_scheme(rest) {
            rest = stripped;
        }

        let mut normalized = rest.to_lowercase();

        if let Some(tail) = self
            .alias_hosts
            .iter()
            .find_map(|alias| strip_host(&normalized, alias))
        {
            normalized = format!("{}{}", self.production_host, tail);
        }

        if !preserve_trailing_slash {
            let trimmed = normalized.trim_end_matches('/').len();
            normalized.truncate(trimmed);
        }

        normalized
    }
}

/// URL 解析器
///
/// 把规则中的URL转换为当前环境下实际请求的完整URL
#[derive(Debug, Clone)]
pub struct UrlResolver {
    profile: SiteProfile,
}

impl UrlResolver {
    pub fn new(profile: SiteProfile) -> Self {
        Self { profile }
    }

    /// 准备请求URL
    ///
    /// 外部子域名和带协议的URL原样使用；显式的生产主机名在非生产环境下
    /// 替换为当前环境主机名；以 `/` 开头的路径拼接到环境基础URL；
    /// 其他值视为相对路径。
    pub fn prepare(&self, url: &str) -> String {
        let url = url.trim();
        if url.is_empty() {
            return String::new();
        }

        if self
            .profile
            .external_hosts()
            .iter()
            .any(|host| strip_host(url, host).is_some())
        {
            return format!("https://{}", url);
        }

        if strip_scheme(url).is_some() {
            return url.to_string();
        }

        if let Some(rest) = strip_host(url, self.profile.production_host()) {
            if self.profile.is_production() {
                return format!("{}://{}", self.profile.scheme(), url);
            }
            return format!("{}{}", self.profile.base_url(), rest);
        }

        if url.starts_with('/') {
            return format!("{}{}", self.profile.base_url(), url);
        }

        format!("{}/{}", self.profile.base_url(), url.trim_start_matches('/'))
    }
}
