// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含站点检查用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含规则、校验结果等核心模型和校验服务
pub mod domain;

/// 引擎模块
///
/// 实现HTTP探测引擎
pub mod engines;

/// 基础设施模块
///
/// 提供站点地图获取和报告输出
pub mod infrastructure;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;
