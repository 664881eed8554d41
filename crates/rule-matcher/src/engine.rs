//! 规则匹配引擎
//!
//! 按注册顺序对每条规则求值：规则的所有条件都满足才算匹配（无条件规则总是匹配），
//! 匹配规则的输出值按注册顺序拼接为结果。任一谓词失败都会中止整次查找，
//! 不返回部分结果。
//!
//! 引擎构建后不可变，查找只读取共享状态，可以在多个线程间并发调用。

use crate::error::Result;
use crate::index::ConditionIndex;
use crate::models::{ConditionSet, ValueSet, Values};
use crate::predicate::Predicate;
use crate::quantifier::Quantifier;
use crate::telemetry;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

/// 单条规则的求值结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RuleStatus {
    Matched,
    /// 第一个未满足的条件
    Rejected { condition: String },
    /// 被索引跳过，结果与求值得到的 false 相同
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    /// 规则注册顺序
    pub position: usize,
    #[serde(flatten)]
    pub status: RuleStatus,
}

/// 带求值追踪的查找结果
#[derive(Debug, Clone, Serialize)]
pub struct LookupReport<T> {
    pub values: Values<T>,
    pub outcomes: Vec<RuleOutcome>,
    pub evaluation_time_us: u64,
}

impl<T> LookupReport<T> {
    pub fn matched_positions(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| o.status == RuleStatus::Matched)
            .map(|o| o.position)
            .collect()
    }
}

/// 引擎统计信息
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStats {
    pub rules_count: usize,
    /// 所有规则引用的不同条件名数量
    pub distinct_conditions: usize,
    pub avg_conditions_per_rule: f64,
}

/// 规则匹配引擎
#[derive(Debug, Clone)]
pub struct Engine<T> {
    rules: Vec<ValueSet<T>>,
    predicate: Predicate,
    quantifier: Quantifier,
    index: Option<ConditionIndex>,
}

impl<T> Engine<T> {
    pub fn builder() -> EngineBuilder<T> {
        EngineBuilder::default()
    }

    pub fn rules(&self) -> &[ValueSet<T>] {
        &self.rules
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn quantifier(&self) -> Quantifier {
        self.quantifier
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 所有规则引用的条件名（去重、排序）
    pub fn condition_names(&self) -> BTreeSet<&str> {
        self.rules
            .iter()
            .flat_map(|rule| rule.conditions().map(|(name, _)| name))
            .collect()
    }

    pub fn stats(&self) -> EngineStats {
        let rules_count = self.rules.len();
        let total: usize = self.rules.iter().map(ValueSet::condition_count).sum();

        EngineStats {
            rules_count,
            distinct_conditions: self.condition_names().len(),
            avg_conditions_per_rule: if rules_count > 0 {
                total as f64 / rules_count as f64
            } else {
                0.0
            },
        }
    }

    /// 对单条规则求值，返回第一个未满足的条件名；全部满足返回 None
    fn reject_reason<'r>(
        &self,
        rule: &'r ValueSet<T>,
        query: &ConditionSet,
    ) -> Result<Option<&'r str>> {
        for (name, values) in rule.conditions() {
            let actual = query.get(name);
            if !self
                .quantifier
                .evaluate(name, &self.predicate, actual, values)?
            {
                return Ok(Some(name));
            }
        }
        Ok(None)
    }

    /// 扫描所有规则，`outcomes` 非空时记录每条规则的结果
    fn scan(
        &self,
        query: &ConditionSet,
        mut outcomes: Option<&mut Vec<RuleOutcome>>,
    ) -> Result<Values<T>>
    where
        T: Clone,
    {
        let candidates = self.index.as_ref().map(|index| index.candidates(query));
        let mut result = Vec::new();

        for (position, rule) in self.rules.iter().enumerate() {
            if candidates.as_ref().is_some_and(|mask| !mask[position]) {
                trace!(position, "索引跳过规则");
                if let Some(outcomes) = outcomes.as_deref_mut() {
                    outcomes.push(RuleOutcome {
                        position,
                        status: RuleStatus::Skipped,
                    });
                }
                continue;
            }

            let status = match self.reject_reason(rule, query)? {
                None => {
                    result.extend_from_slice(rule.outputs());
                    RuleStatus::Matched
                }
                Some(condition) => RuleStatus::Rejected {
                    condition: condition.to_string(),
                },
            };

            if let Some(outcomes) = outcomes.as_deref_mut() {
                outcomes.push(RuleOutcome { position, status });
            }
        }

        Ok(Values::new(result))
    }

    /// 查找所有匹配规则的输出值
    ///
    /// 返回值按规则注册顺序拼接且不去重；第一个谓词错误会中止查找并原样返回。
    #[instrument(level = "debug", skip_all, fields(rules = self.rules.len(), conditions = query.len()))]
    pub fn lookup(&self, query: &ConditionSet) -> Result<Values<T>>
    where
        T: Clone,
    {
        let start = Instant::now();
        let result = self.scan(query, None);

        match &result {
            Ok(values) => {
                debug!(outputs = values.len(), "查找完成");
                telemetry::record_lookup("ok", values.len(), start.elapsed());
            }
            Err(e) => {
                debug!(error = %e, "查找失败");
                telemetry::record_lookup("error", 0, start.elapsed());
            }
        }

        result
    }

    /// 与 `lookup` 相同的扫描，额外记录每条规则的结果和耗时
    pub fn explain(&self, query: &ConditionSet) -> Result<LookupReport<T>>
    where
        T: Clone,
    {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(self.rules.len());

        let values = self.scan(query, Some(&mut outcomes))?;

        Ok(LookupReport {
            values,
            outcomes,
            evaluation_time_us: start.elapsed().as_micros() as u64,
        })
    }
}

/// 引擎构建器
///
/// 先累积规则与配置，`build` 时冻结为不可变引擎。
/// 默认谓词为 `Equals`，默认量词为 `Any`，默认不建索引。
#[derive(Debug)]
pub struct EngineBuilder<T> {
    rules: Vec<ValueSet<T>>,
    predicate: Predicate,
    quantifier: Quantifier,
    indexed: bool,
}

impl<T> Default for EngineBuilder<T> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            predicate: Predicate::default(),
            quantifier: Quantifier::default(),
            indexed: false,
        }
    }
}

impl<T> EngineBuilder<T> {
    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn quantifier(mut self, quantifier: Quantifier) -> Self {
        self.quantifier = quantifier;
        self
    }

    /// 追加一条规则，注册顺序即查找结果中的输出顺序
    pub fn rule(mut self, rule: ValueSet<T>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = ValueSet<T>>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// 是否构建条件名索引
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    pub fn build(self) -> Engine<T> {
        let mut engine = Engine {
            rules: self.rules,
            predicate: self.predicate,
            quantifier: self.quantifier,
            index: None,
        };

        if self.indexed {
            let empty = ConditionSet::default();
            let index = ConditionIndex::build(&engine.rules, |rule| {
                matches!(engine.reject_reason(rule, &empty), Ok(Some(_)))
            });
            debug!(skippable = index.skippable_count(), "条件索引已构建");
            engine.index = Some(index);
        }

        info!(
            rules = engine.rules.len(),
            predicate = %engine.predicate,
            quantifier = %engine.quantifier,
            indexed = engine.index.is_some(),
            "规则匹配引擎已构建"
        );

        engine
    }
}
