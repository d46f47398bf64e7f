// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 规则提取（rule_extractor）：从 CSV 输入中读取规则
/// - 校验服务（verification_service）：逐条探测规则并结合站点地图给出判定
pub mod rule_extractor;
pub mod verification_service;
