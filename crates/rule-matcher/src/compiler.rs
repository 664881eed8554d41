//! 规则编译器
//!
//! 将 JSON 引擎定义解析、校验并编译成不可变的匹配引擎。
//!
//! ```json
//! {
//!   "predicate": { "type": "or", "predicates": [{ "type": "equals" }, { "type": "pattern_matches" }] },
//!   "quantifier": "any",
//!   "index": true,
//!   "rules": [
//!     { "id": "named", "conditions": { "name": [{ "pattern": "ab.*" }] }, "outputs": ["first"] },
//!     { "outputs": ["default"] }
//!   ]
//! }
//! ```

use crate::engine::Engine;
use crate::error::{MatchError, Result};
use crate::models::ValueSet;
use crate::predicate::{Predicate, Projection};
use crate::quantifier::Quantifier;
use crate::value::Value;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

/// 谓词定义
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredicateDefinition {
    #[default]
    Equals,
    EqualsIgnoreCase,
    Contains,
    ContainsIgnoreCase,
    PatternMatches,
    PatternFind,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    And {
        predicates: Vec<PredicateDefinition>,
    },
    Or {
        predicates: Vec<PredicateDefinition>,
    },
    Not {
        predicate: Box<PredicateDefinition>,
    },
    Xor {
        left: Box<PredicateDefinition>,
        right: Box<PredicateDefinition>,
    },
    /// 取规则值（列表）的第 index 个元素再比较
    Element {
        index: usize,
        predicate: Box<PredicateDefinition>,
    },
}

impl From<PredicateDefinition> for Predicate {
    fn from(definition: PredicateDefinition) -> Self {
        match definition {
            PredicateDefinition::Equals => Predicate::Equals,
            PredicateDefinition::EqualsIgnoreCase => Predicate::EqualsIgnoreCase,
            PredicateDefinition::Contains => Predicate::Contains,
            PredicateDefinition::ContainsIgnoreCase => Predicate::ContainsIgnoreCase,
            PredicateDefinition::PatternMatches => Predicate::PatternMatches,
            PredicateDefinition::PatternFind => Predicate::PatternFind,
            PredicateDefinition::GreaterThan => Predicate::GreaterThan,
            PredicateDefinition::GreaterOrEqual => Predicate::GreaterOrEqual,
            PredicateDefinition::LessThan => Predicate::LessThan,
            PredicateDefinition::LessOrEqual => Predicate::LessOrEqual,
            PredicateDefinition::And { predicates } => {
                Predicate::and(predicates.into_iter().map(Predicate::from))
            }
            PredicateDefinition::Or { predicates } => {
                Predicate::or(predicates.into_iter().map(Predicate::from))
            }
            PredicateDefinition::Not { predicate } => Predicate::not((*predicate).into()),
            PredicateDefinition::Xor { left, right } => {
                Predicate::xor((*left).into(), (*right).into())
            }
            PredicateDefinition::Element { index, predicate } => {
                Predicate::project(Projection::element(index), (*predicate).into())
            }
        }
    }
}

/// 量词定义：`"all"`、`"any"` 或 `{"some": {"min": 1, "max": -1}}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantifierDefinition {
    All,
    #[default]
    Any,
    Some { min: i64, max: i64 },
}

impl From<QuantifierDefinition> for Quantifier {
    fn from(definition: QuantifierDefinition) -> Self {
        match definition {
            QuantifierDefinition::All => Quantifier::All,
            QuantifierDefinition::Any => Quantifier::Any,
            QuantifierDefinition::Some { min, max } => Quantifier::some(min, max),
        }
    }
}

/// 单条规则定义
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDefinition<T> {
    #[serde(default)]
    pub id: Option<String>,
    /// 条件名 -> 候选值数组，保持文档中的顺序
    #[serde(default)]
    pub conditions: serde_json::Map<String, serde_json::Value>,
    #[serde(default = "Vec::new")]
    pub outputs: Vec<T>,
}

/// 引擎定义
#[derive(Debug, Clone, Deserialize)]
pub struct EngineDefinition<T> {
    #[serde(default)]
    pub predicate: PredicateDefinition,
    #[serde(default)]
    pub quantifier: QuantifierDefinition,
    #[serde(default)]
    pub index: bool,
    pub rules: Vec<RuleDefinition<T>>,
}

/// 规则编译器
#[derive(Debug, Clone, Default)]
pub struct RuleCompiler {
    /// 覆盖定义文件中的 `index` 设置
    index_override: Option<bool>,
}

impl RuleCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, indexed: Option<bool>) -> Self {
        self.index_override = indexed;
        self
    }

    /// 从 JSON 字符串编译引擎
    pub fn compile_from_json<T: DeserializeOwned>(&self, json: &str) -> Result<Engine<T>> {
        let definition: EngineDefinition<T> = serde_json::from_str(json)?;
        self.compile(definition)
    }

    /// 从文件编译引擎
    pub fn compile_from_path<T: DeserializeOwned>(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Engine<T>> {
        let path = path.as_ref();
        debug!(path = %path.display(), "加载规则定义");
        let json = std::fs::read_to_string(path)?;
        self.compile_from_json(&json)
    }

    /// 编译引擎定义
    pub fn compile<T>(&self, definition: EngineDefinition<T>) -> Result<Engine<T>> {
        let mut rules = Vec::with_capacity(definition.rules.len());
        for (position, rule) in definition.rules.into_iter().enumerate() {
            rules.push(self.compile_rule(position, rule)?);
        }
        info!(rules = rules.len(), "规则定义编译完成");

        Ok(Engine::builder()
            .predicate(definition.predicate.into())
            .quantifier(definition.quantifier.into())
            .indexed(self.index_override.unwrap_or(definition.index))
            .rules(rules)
            .build())
    }

    /// 编译单条规则
    fn compile_rule<T>(&self, position: usize, rule: RuleDefinition<T>) -> Result<ValueSet<T>> {
        let label = rule
            .id
            .clone()
            .unwrap_or_else(|| format!("#{}", position));

        let mut builder = ValueSet::builder().outputs(rule.outputs);

        for (name, values) in rule.conditions {
            let values = self.compile_values(&label, &name, values)?;
            builder = builder.condition(name, values);
        }

        builder
            .build()
            .map_err(|e| annotate(e, &format!("规则 '{}'", label)))
    }

    /// 校验并转换条件的候选值
    fn compile_values(
        &self,
        label: &str,
        name: &str,
        values: serde_json::Value,
    ) -> Result<Vec<Value>> {
        if name.is_empty() {
            return Err(MatchError::Definition(format!(
                "规则 '{}' 的条件名称不能为空",
                label
            )));
        }

        let serde_json::Value::Array(items) = values else {
            return Err(MatchError::Definition(format!(
                "规则 '{}' 的条件 '{}' 需要候选值数组",
                label, name
            )));
        };

        if items.is_empty() {
            return Err(MatchError::Definition(format!(
                "规则 '{}' 的条件 '{}' 的候选值不能为空",
                label, name
            )));
        }

        items
            .into_iter()
            .map(|item| {
                Value::from_json(item)
                    .map_err(|e| annotate(e, &format!("规则 '{}' 的条件 '{}'", label, name)))
            })
            .collect()
    }
}

/// 为定义错误补充出错位置
fn annotate(err: MatchError, location: &str) -> MatchError {
    match err {
        MatchError::Definition(message) => {
            MatchError::Definition(format!("{}: {}", location, message))
        }
        other => other,
    }
}
