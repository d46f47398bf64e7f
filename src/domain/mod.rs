// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：规则、探测结果、站点地图索引和校验结果
/// - 服务（services）：规则提取和校验引擎
///
/// 领域层不依赖于任何外部实现，探测和站点地图获取都通过
/// 注入的接口完成。
pub mod models;
pub mod services;
