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

use crate::domain::models::probe::ProbeResult;
use async_trait::async_trait;
use std::time::Duration;

/// 探测请求
#[derive(Debug, Clone)]
pub struct ProbeRequest {
    /// 已准备好的完整URL
    pub url: String,
    /// 单次尝试超时时间
    pub timeout: Duration,
    /// 最大尝试次数
    pub max_retries: u32,
}

/// URL 探测引擎特质
///
/// 探测失败记录在结果中而不是作为错误返回
#[async_trait]
pub trait UrlProber: Send + Sync {
    /// 执行探测
    async fn probe(&self, request: &ProbeRequest) -> ProbeResult;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
