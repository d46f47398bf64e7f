// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 重定向规则
///
/// 原始URL应以 `declared_status` 重定向到 `expected_url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRule {
    pub original_url: String,
    pub expected_url: String,
    pub declared_status: u16,
}

/// 删除规则
///
/// 原始URL应从站点和站点地图中移除
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalRule {
    pub original_url: String,
    /// 输入行中的状态码（无法解析时为空）
    pub declared_status: Option<u16>,
}

/// 单条规则
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Redirect(RedirectRule),
    Removal(RemovalRule),
}

/// 规则集合
///
/// 保持输入顺序；读取一次后不再修改
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    total_rows: usize,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>, total_rows: usize) -> Self {
        Self { rules, total_rows }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// 读取的数据行数（不含表头）
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn redirects(&self) -> impl Iterator<Item = &RedirectRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Redirect(r) => Some(r),
            Rule::Removal(_) => None,
        })
    }

    pub fn removals(&self) -> impl Iterator<Item = &RemovalRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Removal(r) => Some(r),
            Rule::Redirect(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
