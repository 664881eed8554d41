//! 谓词代数
//!
//! 逐点比较一个实际值与一个规则值的谓词，以及组合它们的逻辑算子。
//! 叶子谓词与组合算子是封闭的枚举，`Custom` 留给调用方扩展。

use crate::error::Result;
use crate::evaluator::ConditionEvaluator;
use crate::value::Value;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// 自定义谓词
///
/// 实现必须是纯函数且线程安全：同一输入总是得到同一结果，
/// 任何失败都应以 `MatchError::EvaluationFailure` 返回。
#[cfg_attr(test, mockall::automock)]
pub trait ConditionPredicate: Send + Sync {
    fn evaluate<'a>(
        &self,
        condition: &str,
        actual: Option<&'a Value>,
        rule: Option<&'a Value>,
    ) -> Result<bool>;
}

/// 作用于规则值的投影函数
///
/// 例如从 `[下界, 上界]` 形式的规则值中取出某一端，再交给内层谓词比较。
#[derive(Clone)]
pub struct Projection {
    name: String,
    func: Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>,
}

impl Projection {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// 取列表规则值的第 `index` 个元素；非列表或越界时视为缺失
    pub fn element(index: usize) -> Self {
        Self::new(format!("element[{}]", index), move |value| {
            value.as_list().and_then(|items| items.get(index)).cloned()
        })
    }

    pub fn apply(&self, value: &Value) -> Option<Value> {
        (self.func)(value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Projection").field(&self.name).finish()
    }
}

/// 谓词
#[derive(Clone, Default)]
pub enum Predicate {
    // 字符串与结构比较
    #[default]
    Equals,
    EqualsIgnoreCase,
    Contains,
    ContainsIgnoreCase,

    // 正则匹配（规则值为已编译模式）
    PatternMatches,
    PatternFind,

    // 数值比较：actual <op> rule
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,

    // 逻辑组合
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Xor(Box<Predicate>, Box<Predicate>),

    /// 先对规则值做投影，再用内层谓词比较
    Project(Projection, Box<Predicate>),

    Custom(Arc<dyn ConditionPredicate>),
}

impl Predicate {
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::And(predicates.into_iter().collect())
    }

    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Or(predicates.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(predicate: Predicate) -> Self {
        Self::Not(Box::new(predicate))
    }

    pub fn xor(left: Predicate, right: Predicate) -> Self {
        Self::Xor(Box::new(left), Box::new(right))
    }

    pub fn project(projection: Projection, predicate: Predicate) -> Self {
        Self::Project(projection, Box::new(predicate))
    }

    pub fn custom(predicate: impl ConditionPredicate + 'static) -> Self {
        Self::Custom(Arc::new(predicate))
    }

    /// 求值
    ///
    /// 组合算子按顺序求值子谓词并短路；子谓词的错误原样向上传播。
    pub fn evaluate(
        &self,
        condition: &str,
        actual: Option<&Value>,
        rule: Option<&Value>,
    ) -> Result<bool> {
        match self {
            Self::Equals => ConditionEvaluator::equals(condition, actual, rule),
            Self::EqualsIgnoreCase => ConditionEvaluator::equals_ignore_case(condition, actual, rule),
            Self::Contains => ConditionEvaluator::contains(condition, actual, rule),
            Self::ContainsIgnoreCase => {
                ConditionEvaluator::contains_ignore_case(condition, actual, rule)
            }
            Self::PatternMatches => ConditionEvaluator::pattern_matches(condition, actual, rule),
            Self::PatternFind => ConditionEvaluator::pattern_find(condition, actual, rule),
            Self::GreaterThan => {
                ConditionEvaluator::compare(condition, actual, rule, |o| o == Ordering::Greater)
            }
            Self::GreaterOrEqual => {
                ConditionEvaluator::compare(condition, actual, rule, |o| o != Ordering::Less)
            }
            Self::LessThan => {
                ConditionEvaluator::compare(condition, actual, rule, |o| o == Ordering::Less)
            }
            Self::LessOrEqual => {
                ConditionEvaluator::compare(condition, actual, rule, |o| o != Ordering::Greater)
            }
            Self::And(predicates) => {
                for predicate in predicates {
                    if !predicate.evaluate(condition, actual, rule)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Or(predicates) => {
                for predicate in predicates {
                    if predicate.evaluate(condition, actual, rule)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Not(predicate) => predicate.evaluate(condition, actual, rule).map(|r| !r),
            Self::Xor(left, right) => {
                let left = left.evaluate(condition, actual, rule)?;
                let right = right.evaluate(condition, actual, rule)?;
                Ok(left != right)
            }
            Self::Project(projection, predicate) => {
                let projected = rule.and_then(|r| projection.apply(r));
                predicate.evaluate(condition, actual, projected.as_ref())
            }
            Self::Custom(predicate) => predicate.evaluate(condition, actual, rule),
        }
    }

    /// 谓词名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::EqualsIgnoreCase => "equals_ignore_case",
            Self::Contains => "contains",
            Self::ContainsIgnoreCase => "contains_ignore_case",
            Self::PatternMatches => "pattern_matches",
            Self::PatternFind => "pattern_find",
            Self::GreaterThan => "greater_than",
            Self::GreaterOrEqual => "greater_or_equal",
            Self::LessThan => "less_than",
            Self::LessOrEqual => "less_or_equal",
            Self::And(_) => "and",
            Self::Or(_) => "or",
            Self::Not(_) => "not",
            Self::Xor(..) => "xor",
            Self::Project(..) => "project",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(items) | Self::Or(items) => {
                write!(f, "{}(", self.name())?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Self::Not(inner) => write!(f, "not({})", inner),
            Self::Xor(left, right) => write!(f, "xor({}, {})", left, right),
            Self::Project(projection, inner) => write!(f, "{}({})", projection.name(), inner),
            _ => f.write_str(self.name()),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate({})", self)
    }
}
