//! 条件名索引
//!
//! 条件名 -> 引用该条件的规则位置。索引只用于减少扫描量，不改变匹配语义：
//! 一条规则若不引用查询中的任何条件名，它的每个条件拿到的实际值都是“缺失”，
//! 结果与对空查询求值相同。构建时预先对空查询求值一次，结果确定为 false 的
//! 规则在这种情况下可以直接跳过；结果为 true 或求值出错的规则仍然照常扫描，
//! 以保证输出顺序和错误顺序不变。

use crate::models::{ConditionSet, ValueSet};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ConditionIndex {
    by_name: HashMap<String, Vec<usize>>,
    /// 对空查询求值确定为 false 的规则
    skippable: Vec<bool>,
}

impl ConditionIndex {
    /// 构建索引
    ///
    /// `rejects_absent` 对每条规则回答“所有实际值缺失时是否确定不匹配”。
    pub fn build<T, F>(rules: &[ValueSet<T>], mut rejects_absent: F) -> Self
    where
        F: FnMut(&ValueSet<T>) -> bool,
    {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut skippable = Vec::with_capacity(rules.len());

        for (position, rule) in rules.iter().enumerate() {
            for (name, _) in rule.conditions() {
                by_name.entry(name.to_string()).or_default().push(position);
            }
            // 无条件规则总是匹配，不能跳过
            skippable.push(!rule.is_unconditional() && rejects_absent(rule));
        }

        Self { by_name, skippable }
    }

    /// 计算本次查询需要扫描的规则
    ///
    /// 返回的掩码与规则列表一一对应，true 表示需要求值。
    pub fn candidates(&self, query: &ConditionSet) -> Vec<bool> {
        let mut mask: Vec<bool> = self.skippable.iter().map(|skip| !skip).collect();

        for name in query.names() {
            if let Some(positions) = self.by_name.get(name) {
                for &position in positions {
                    mask[position] = true;
                }
            }
        }

        mask
    }

    pub fn skippable_count(&self) -> usize {
        self.skippable.iter().filter(|s| **s).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(names: &[&str]) -> ValueSet<usize> {
        names
            .iter()
            .fold(ValueSet::builder(), |b, name| b.condition(*name, [1]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_candidates_union_over_names() {
        let rules = vec![rule(&["a"]), rule(&["a", "b"]), rule(&["c"])];
        let index = ConditionIndex::build(&rules, |_| true);

        let query = ConditionSet::builder().condition("b", 1).condition("z", 1).build();
        assert_eq!(index.candidates(&query), vec![false, true, false]);

        let query = ConditionSet::builder().condition("a", 1).condition("c", 1).build();
        assert_eq!(index.candidates(&query), vec![true, true, true]);
    }

    #[test]
    fn test_candidates_by_query_names() {
        let rules = vec![rule(&["a"]), rule(&["b"]), rule(&[])];
        let index = ConditionIndex::build(&rules, |_| true);

        let query = ConditionSet::builder().condition("a", 1).build();
        // 无条件规则始终是候选
        assert_eq!(index.candidates(&query), vec![true, false, true]);
        assert_eq!(index.skippable_count(), 2);
    }

    #[test]
    fn test_rules_not_rejecting_absence_stay_candidates() {
        let rules = vec![rule(&["a"]), rule(&["b"])];
        let index = ConditionIndex::build(&rules, |r| r.values("a").is_some());

        let query = ConditionSet::builder().build();
        assert_eq!(index.candidates(&query), vec![false, true]);
    }
}
