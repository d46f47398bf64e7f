// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 站点环境（site）：当前环境与生产环境的主机名
/// - 规则（rule）：重定向规则和删除规则
/// - 探测结果（probe）：单次HTTP探测的结果和错误
/// - 站点地图索引（sitemap_index）：规范化后的站点地图URL集合
/// - 校验结果（verdict）：规则的最终判定
pub mod probe;
pub mod rule;
pub mod site;
pub mod sitemap_index;
pub mod verdict;
