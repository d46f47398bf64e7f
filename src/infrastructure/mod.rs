// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 负责与外部系统的交互：
/// - 站点地图加载（sitemap_loader）：下载站点地图并构建索引
/// - 报告（report）：写出 CSV 明细和 HTML 报告
pub mod report;
pub mod sitemap_loader;
