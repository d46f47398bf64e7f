// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::url_utils::UrlNormalizer;
use std::collections::HashSet;

/// 站点地图获取结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// 实际使用的站点地图URL
    pub source_url: String,
    /// 是否获取成功
    pub success: bool,
    /// 文档字节数
    pub byte_size: usize,
    /// 是否使用了生产环境回退
    pub used_fallback: bool,
    /// 获取或解析失败的原因
    pub error: Option<String>,
}

/// 站点地图索引
///
/// 每次运行构建一次，之后只读。条目在构建时按两种末尾斜杠策略
/// 分别规范化；获取失败时索引为空，所有查询返回 `false`。
#[derive(Debug, Clone)]
pub struct SitemapIndex {
    normalizer: UrlNormalizer,
    locations: Vec<String>,
    stripped: HashSet<String>,
    preserved: HashSet<String>,
    outcome: FetchOutcome,
}

impl SitemapIndex {
    /// 从解析出的URL构建索引
    pub fn from_locations(
        locations: Vec<String>,
        normalizer: UrlNormalizer,
        outcome: FetchOutcome,
    ) -> Self {
        let stripped = locations
            .iter()
            .map(|url| normalizer.normalize(url, false))
            .collect();
        let preserved = locations
            .iter()
            .map(|url| normalizer.normalize(url, true))
            .collect();
        Self {
            normalizer,
            locations,
            stripped,
            preserved,
            outcome,
        }
    }

    /// 构建空索引（获取或解析失败）
    pub fn empty(normalizer: UrlNormalizer, outcome: FetchOutcome) -> Self {
        Self::from_locations(Vec::new(), normalizer, outcome)
    }

    /// 查询URL是否在站点地图中
    ///
    /// # 参数
    ///
    /// * `url` - 待查询URL（任意协议/大小写/环境前缀）
    /// * `preserve_trailing_slash` - 是否区分末尾斜杠
    pub fn contains(&self, url: &str, preserve_trailing_slash: bool) -> bool {
        self.is_usable() && self.lookup(url, preserve_trailing_slash)
    }

    /// 确认URL不在站点地图中
    ///
    /// 站点地图不可用时无法确认，返回 `false`
    pub fn excludes(&self, url: &str, preserve_trailing_slash: bool) -> bool {
        self.is_usable() && !self.lookup(url, preserve_trailing_slash)
    }

    fn lookup(&self, url: &str, preserve_trailing_slash: bool) -> bool {
        let key = self.normalizer.normalize(url, preserve_trailing_slash);
        if preserve_trailing_slash {
            self.preserved.contains(&key)
        } else {
            self.stripped.contains(&key)
        }
    }

    /// 原始URL列表
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn outcome(&self) -> &FetchOutcome {
        &self.outcome
    }

    /// 获取与解析是否都成功
    pub fn is_usable(&self) -> bool {
        self.outcome.success && self.outcome.error.is_none()
    }
}
