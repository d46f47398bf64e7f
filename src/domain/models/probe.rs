// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;
use thiserror::Error;

/// 探测错误类型
///
/// 记录在 [`ProbeResult`] 中，不会中断批量校验
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// 请求超时
    #[error("Request timeout")]
    Timeout,
    /// 连接失败
    #[error("Connection error: {0}")]
    Connection(String),
    /// URL 无法解析
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// 其他请求或协议错误
    #[error("Request error: {0}")]
    Request(String),
    /// 200 响应内容过小（疑似软404）
    #[error("Response too small ({0} bytes)")]
    ContentTooSmall(usize),
}

impl ProbeError {
    /// 判断错误是否可重试
    ///
    /// 只有超时和连接失败属于瞬时错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProbeError::Timeout | ProbeError::Connection(_))
    }
}

/// 探测结果
///
/// 生成后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// 实际请求的完整URL
    pub requested_url: String,
    /// 跟随重定向后的最终URL
    pub final_url: Option<String>,
    /// 最终响应状态码
    pub resolved_status: Option<u16>,
    /// 总耗时（包括重试）
    pub elapsed: Duration,
    /// 依次经过的重定向状态码
    pub redirect_chain: Vec<u16>,
    /// 实际尝试次数
    pub attempts: u32,
    pub error: Option<ProbeError>,
}

impl ProbeResult {
    /// 是否以 200 成功返回且无内容问题
    pub fn is_ok_200(&self) -> bool {
        self.resolved_status == Some(200) && self.error.is_none()
    }

    /// 按删除规则分类
    pub fn removal_class(&self) -> RemovalClass {
        match self.resolved_status {
            Some(404) | Some(410) => RemovalClass::Removed,
            Some(301) | Some(302) | Some(303) | Some(307) | Some(308)
                if !self.redirect_chain.is_empty() =>
            {
                RemovalClass::RedirectedAway
            }
            Some(status) => RemovalClass::StillServed(status),
            None => RemovalClass::Unreachable,
        }
    }
}

/// 删除规则的探测分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalClass {
    /// 404 或 410
    Removed,
    /// 重定向离开
    RedirectedAway,
    /// 仍以其他状态码响应
    StillServed(u16),
    /// 无响应
    Unreachable,
}

impl RemovalClass {
    pub fn is_acceptable(&self) -> bool {
        matches!(self, RemovalClass::Removed | RemovalClass::RedirectedAway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: Option<u16>, chain: Vec<u16>) -> ProbeResult {
        ProbeResult {
            requested_url: "https://qa-www.example.com/old".to_string(),
            final_url: None,
            resolved_status: status,
            elapsed: Duration::from_millis(12),
            redirect_chain: chain,
            attempts: 1,
            error: None,
        }
    }

    #[test]
    fn test_removal_classification() {
        assert_eq!(result(Some(404), vec![]).removal_class(), RemovalClass::Removed);
        assert_eq!(result(Some(410), vec![]).removal_class(), RemovalClass::Removed);
        assert_eq!(
            result(Some(301), vec![301]).removal_class(),
            RemovalClass::RedirectedAway
        );
        assert_eq!(
            result(Some(308), vec![]).removal_class(),
            RemovalClass::StillServed(308)
        );
        assert_eq!(
            result(Some(200), vec![301]).removal_class(),
            RemovalClass::StillServed(200)
        );
        assert_eq!(result(None, vec![]).removal_class(), RemovalClass::Unreachable);
        assert!(RemovalClass::RedirectedAway.is_acceptable());
        assert!(!RemovalClass::StillServed(500).is_acceptable());
    }

    #[test]
    fn test_ok_200_requires_clean_result() {
        let mut ok = result(Some(200), vec![]);
        assert!(ok.is_ok_200());
        ok.error = Some(ProbeError::ContentTooSmall(50));
        assert!(!ok.is_ok_200());
        assert!(!result(Some(201), vec![]).is_ok_200());
    }

    #[test]
    fn test_retryable_errors() {
        assert!(ProbeError::Timeout.is_retryable());
        assert!(ProbeError::Connection("refused".into()).is_retryable());
        assert!(!ProbeError::InvalidUrl("::".into()).is_retryable());
        assert!(!ProbeError::Request("protocol".into()).is_retryable());
    }
}
