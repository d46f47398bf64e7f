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

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// 应用程序配置设置
///
/// 启动时加载一次，之后以不可变值传入各组件
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 站点与环境配置
    pub site: SiteSettings,
    /// HTTP探测配置
    pub probe: ProbeSettings,
    /// 站点地图配置
    pub sitemap: SitemapSettings,
    /// 输入文件配置
    pub input: InputSettings,
    /// 报告输出配置
    pub output: OutputSettings,
    /// 校验引擎配置
    pub engine: EngineSettings,
    /// 日志配置
    pub log: LogSettings,
}

/// 站点与环境配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSettings {
    /// 协议 (https, 本地测试时为 http)
    pub scheme: String,
    /// 当前测试的环境名
    pub active_environment: String,
    /// 生产环境名
    pub production_environment: String,
    /// 环境名 -> 主机名
    pub environments: BTreeMap<String, String>,
    /// 外部子域名（不做环境替换）
    #[serde(default)]
    pub external_hosts: Vec<String>,
}

/// HTTP探测配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeSettings {
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    /// 最大尝试次数
    pub max_retries: u32,
    /// 重试基础延迟（毫秒）
    pub retry_delay_ms: u64,
    /// 200 响应的最小内容字节数
    pub min_content_bytes: usize,
    /// 最大重定向跳数
    pub max_redirects: usize,
    /// User-Agent
    pub user_agent: String,
}

impl ProbeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// 站点地图配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SitemapSettings {
    /// 相对于环境基础URL的路径
    pub path: String,
    /// 显式指定的站点地图URL（覆盖 path）
    pub url: Option<String>,
    /// 非生产环境失败时是否回退到生产站点地图
    pub enable_fallback: bool,
}

/// 列引用：按0起始下标或按表头名称
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

/// 输入列映射
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub original_url: ColumnRef,
    pub status_code: ColumnRef,
    pub expected_url: ColumnRef,
}

/// 输入文件配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct InputSettings {
    /// CSV 文件路径
    pub path: String,
    /// 列映射
    pub columns: ColumnMapping,
    /// 视为重定向规则的状态码
    pub target_status: u16,
    /// 删除标记
    pub removal_marker: String,
}

/// 报告输出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// 输出目录
    pub dir: String,
    /// 是否写入 CSV 结果
    pub csv: bool,
    /// 是否写入 HTML 报告
    pub html: bool,
}

/// 校验引擎配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// 规则之间的间隔（毫秒）
    pub request_interval_ms: u64,
}

impl EngineSettings {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

/// 日志配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// 是否输出 JSON 格式日志
    pub json: bool,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 和 `SITECHECK__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("SITECHECK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// 从指定文件加载配置（叠加在默认值之上）
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name(path))
            .build()?
            .try_deserialize()
    }

    /// 从 TOML 文本加载配置（叠加在默认值之上）
    pub fn from_file_contents(contents: &str) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            // Site defaults
            .set_default("site.scheme", "https")?
            .set_default("site.active_environment", "qa")?
            .set_default("site.production_environment", "prod")?
            .set_default("site.environments.qa", "qa-www.example.com")?
            .set_default("site.environments.rel", "rel-www.example.com")?
            .set_default("site.environments.prod", "www.example.com")?
            .set_default("site.external_hosts", vec!["help.example.com"])?
            // Probe defaults
            .set_default("probe.timeout_secs", 5)?
            .set_default("probe.max_retries", 3)?
            .set_default("probe.retry_delay_ms", 1000)?
            .set_default("probe.min_content_bytes", 100)?
            .set_default("probe.max_redirects", 10)?
            .set_default(
                "probe.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
            )?
            // Sitemap defaults
            .set_default("sitemap.path", "/sitemap.xml")?
            .set_default("sitemap.enable_fallback", false)?
            // Input defaults
            .set_default("input.path", "in/urls.csv")?
            .set_default("input.columns.original_url", 0)?
            .set_default("input.columns.status_code", 3)?
            .set_default("input.columns.expected_url", 60)?
            .set_default("input.target_status", 301)?
            .set_default("input.removal_marker", "REMOVE")?
            // Output defaults
            .set_default("output.dir", "output")?
            .set_default("output.csv", true)?
            .set_default("output.html", true)?
            // Engine defaults
            .set_default("engine.request_interval_ms", 100)?
            .set_default("log.json", false)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
