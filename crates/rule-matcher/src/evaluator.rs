//! 条件评估器
//!
//! 实现叶子谓词的比较逻辑。所有叶子谓词遵循同一求值顺序：
//! 1. 实际值与规则值都缺失 => 匹配
//! 2. 只有一方缺失 => 不匹配，不做类型校验
//! 3. 先校验规则值类型，再校验实际值类型，最后比较

use crate::error::{MatchError, Result};
use crate::value::{Value, present};
use std::cmp::Ordering;

/// 谓词对值类型的要求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeRequirement {
    /// 任意类型，按结构相等比较
    Any,
    String,
    Pattern,
    /// 整数或浮点数
    Number,
}

impl TypeRequirement {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::String => matches!(value, Value::String(_)),
            Self::Pattern => matches!(value, Value::Pattern(_)),
            Self::Number => matches!(value, Value::Integer(_) | Value::Float(_)),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Pattern => "pattern",
            Self::Number => "number",
        }
    }
}

/// 条件评估器
pub(crate) struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 按统一顺序求值叶子谓词
    ///
    /// # Arguments
    /// * `condition` - 条件名称，仅用于错误信息
    /// * `actual` - 查询中的实际值
    /// * `rule` - 规则中定义的值
    /// * `rule_type` / `actual_type` - 两侧的类型要求
    /// * `compare` - 类型校验通过后的比较逻辑
    pub fn evaluate<F>(
        condition: &str,
        actual: Option<&Value>,
        rule: Option<&Value>,
        rule_type: TypeRequirement,
        actual_type: TypeRequirement,
        compare: F,
    ) -> Result<bool>
    where
        F: FnOnce(&Value, &Value) -> bool,
    {
        let (actual, rule) = match (present(actual), present(rule)) {
            (None, None) => return Ok(true),
            (Some(actual), Some(rule)) => (actual, rule),
            _ => return Ok(false),
        };

        if !rule_type.accepts(rule) {
            return Err(MatchError::wrong_rule_value(
                condition,
                rule_type.name(),
                rule.kind().name(),
            ));
        }

        if !actual_type.accepts(actual) {
            return Err(MatchError::wrong_query_value(
                condition,
                actual_type.name(),
                actual.kind().name(),
            ));
        }

        Ok(compare(actual, rule))
    }

    pub fn equals(condition: &str, actual: Option<&Value>, rule: Option<&Value>) -> Result<bool> {
        Self::evaluate(
            condition,
            actual,
            rule,
            TypeRequirement::Any,
            TypeRequirement::Any,
            |a, r| a == r,
        )
    }

    pub fn equals_ignore_case(
        condition: &str,
        actual: Option<&Value>,
        rule: Option<&Value>,
    ) -> Result<bool> {
        Self::strings(condition, actual, rule, |a, r| a == r || fold_eq(a, r))
    }

    /// 规则值是实际值的子串
    pub fn contains(condition: &str, actual: Option<&Value>, rule: Option<&Value>) -> Result<bool> {
        Self::strings(condition, actual, rule, |a, r| a.contains(r))
    }

    pub fn contains_ignore_case(
        condition: &str,
        actual: Option<&Value>,
        rule: Option<&Value>,
    ) -> Result<bool> {
        Self::strings(condition, actual, rule, |a, r| {
            a.to_lowercase().contains(&r.to_lowercase())
        })
    }

    /// 实际值整串匹配规则中的模式
    pub fn pattern_matches(
        condition: &str,
        actual: Option<&Value>,
        rule: Option<&Value>,
    ) -> Result<bool> {
        Self::patterns(condition, actual, rule, |pattern, s| pattern.matches(s))
    }

    /// 实际值中任意位置出现规则中的模式
    pub fn pattern_find(
        condition: &str,
        actual: Option<&Value>,
        rule: Option<&Value>,
    ) -> Result<bool> {
        Self::patterns(condition, actual, rule, |pattern, s| pattern.find(s))
    }

    /// 数值比较：`actual <op> rule`
    pub fn compare<F>(
        condition: &str,
        actual: Option<&Value>,
        rule: Option<&Value>,
        accept: F,
    ) -> Result<bool>
    where
        F: FnOnce(Ordering) -> bool,
    {
        Self::evaluate(
            condition,
            actual,
            rule,
            TypeRequirement::Number,
            TypeRequirement::Number,
            |a, r| Self::numeric_order(a, r).is_some_and(accept),
        )
    }

    fn strings<F>(
        condition: &str,
        actual: Option<&Value>,
        rule: Option<&Value>,
        cmp: F,
    ) -> Result<bool>
    where
        F: FnOnce(&str, &str) -> bool,
    {
        Self::evaluate(
            condition,
            actual,
            rule,
            TypeRequirement::String,
            TypeRequirement::String,
            |a, r| match (a.as_str(), r.as_str()) {
                (Some(a), Some(r)) => cmp(a, r),
                _ => false,
            },
        )
    }

    fn patterns<F>(
        condition: &str,
        actual: Option<&Value>,
        rule: Option<&Value>,
        cmp: F,
    ) -> Result<bool>
    where
        F: FnOnce(&crate::value::Pattern, &str) -> bool,
    {
        Self::evaluate(
            condition,
            actual,
            rule,
            TypeRequirement::Pattern,
            TypeRequirement::String,
            |a, r| match (r.as_pattern(), a.as_str()) {
                (Some(pattern), Some(s)) => cmp(pattern, s),
                _ => false,
            },
        )
    }

    /// 整数之间精确比较，混合类型统一转为 f64；NaN 不可比较
    fn numeric_order(actual: &Value, rule: &Value) -> Option<Ordering> {
        match (actual, rule) {
            (Value::Integer(a), Value::Integer(r)) => Some(a.cmp(r)),
            _ => actual.as_f64()?.partial_cmp(&rule.as_f64()?),
        }
    }
}

/// 逐字符忽略大小写比较
///
/// 每个字符先转大写再转小写后比较，只取一对一的映射，因此 `İ` 与 `i`
/// 相等，而 `ß` 与 `SS` 这类长度变化的折叠不相等。
fn fold_eq(a: &str, r: &str) -> bool {
    a.chars().count() == r.chars().count()
        && a.chars().zip(r.chars()).all(|(x, y)| {
            x == y || upper(x) == upper(y) || lower(upper(x)) == lower(upper(y))
        })
}

fn upper(c: char) -> char {
    let mut it = c.to_uppercase();
    match (it.next(), it.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

fn lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
