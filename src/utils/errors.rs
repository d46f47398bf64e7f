// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 站点检查错误类型
///
/// 站点地图的 `Fetch`/`Parse` 错误在本地恢复（空索引），
/// 输入文件的 `NotFound`/`Validation` 错误在探测开始前终止运行。
#[derive(Error, Debug)]
pub enum SiteCheckError {
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Malformed XML: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Input file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl SiteCheckError {
    /// 是否为致命错误（需在探测前终止）
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SiteCheckError::NotFound(_)
                | SiteCheckError::Validation(_)
                | SiteCheckError::Config(_)
                | SiteCheckError::Client(_)
        )
    }
}
