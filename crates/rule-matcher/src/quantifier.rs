//! 元组量词
//!
//! 将逐点谓词提升为“一个实际值 对 一组候选规则值”的比较：
//! 统计匹配的候选值个数，再判断是否落在量词给出的闭区间内。

use crate::error::Result;
use crate::predicate::Predicate;
use crate::value::Value;
use std::fmt;

/// 基数策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantifier {
    /// 每个候选值都必须匹配
    All,
    /// 至少一个候选值匹配
    #[default]
    Any,
    /// 匹配个数落在 [min, max] 内，`None` 表示该侧不设界
    Bounded {
        min: Option<usize>,
        max: Option<usize>,
    },
}

impl Quantifier {
    /// 以有符号边界构造，负数表示不设界
    ///
    /// `some(-1, -1)` 接受任意匹配个数，`some(n, n)` 要求恰好 n 个。
    pub fn some(min: i64, max: i64) -> Self {
        let bound = |b: i64| usize::try_from(b).ok();
        Self::Bounded {
            min: bound(min),
            max: bound(max),
        }
    }

    /// 计算有效区间 `(eff_min, eff_max)`
    pub fn bounds(&self, size: usize) -> (usize, usize) {
        match *self {
            Self::All => (size, size),
            Self::Any => (1, size),
            Self::Bounded { min, max } => (min.unwrap_or(0), max.unwrap_or(size)),
        }
    }

    /// 求值
    ///
    /// 候选值为空时直接返回 false，不调用谓词。谓词按候选值顺序逐个调用，
    /// 任一调用失败立即中止并返回该错误。
    pub fn evaluate(
        &self,
        condition: &str,
        predicate: &Predicate,
        actual: Option<&Value>,
        rule_values: &[Value],
    ) -> Result<bool> {
        if rule_values.is_empty() {
            return Ok(false);
        }

        let mut match_count = 0usize;
        for rule_value in rule_values {
            if predicate.evaluate(condition, actual, Some(rule_value))? {
                match_count += 1;
            }
        }

        let (min, max) = self.bounds(rule_values.len());
        Ok(min <= match_count && match_count <= max)
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |b: Option<usize>| b.map_or_else(|| "*".to_string(), |b| b.to_string());
        match self {
            Self::All => write!(f, "all"),
            Self::Any => write!(f, "any"),
            Self::Bounded { min, max } => write!(f, "some[{}, {}]", side(*min), side(*max)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchError;
    use crate::predicate::MockConditionPredicate;

    fn rule_values() -> Vec<Value> {
        vec![Value::from("valx"), Value::from("valy"), Value::from("valz")]
    }

    fn check(quantifier: Quantifier, actual: &str) -> bool {
        quantifier
            .evaluate(
                "cond",
                &Predicate::Contains,
                Some(&Value::from(actual)),
                &rule_values(),
            )
            .unwrap()
    }

    #[test]
    fn test_boundary_matrix_all_matching() {
        let actual = "xx valx valy valz xxx";

        assert!(!check(Quantifier::some(0, 2), actual));
        assert!(check(Quantifier::some(-1, -1), actual));
        assert!(check(Quantifier::some(3, 3), actual));
        assert!(check(Quantifier::some(2, 3), actual));
        assert!(!check(Quantifier::some(0, 0), actual));
        assert!(check(Quantifier::All, actual));
        assert!(check(Quantifier::Any, actual));
    }

    #[test]
    fn test_boundary_matrix_partial_matching() {
        // 只有 valx 和 valz 出现，匹配数为 2
        let actual = "xx valx valz xxx";

        assert!(check(Quantifier::some(0, 2), actual));
        assert!(check(Quantifier::some(2, -1), actual));
        assert!(!check(Quantifier::some(3, 3), actual));
        assert!(!check(Quantifier::All, actual));
        assert!(check(Quantifier::Any, actual));
    }

    #[test]
    fn test_no_match() {
        let actual = "nothing";

        assert!(!check(Quantifier::Any, actual));
        assert!(!check(Quantifier::All, actual));
        assert!(check(Quantifier::some(0, 0), actual));
        assert!(check(Quantifier::some(-1, 0), actual));
    }

    #[test]
    fn test_all_and_any_as_bounded() {
        for actual in ["xx valx valy valz xxx", "valx", "none"] {
            assert_eq!(check(Quantifier::All, actual), check(Quantifier::some(3, 3), actual));
            assert_eq!(check(Quantifier::Any, actual), check(Quantifier::some(1, -1), actual));
        }
    }

    #[test]
    fn test_empty_rule_values_short_circuit() {
        let mut never = MockConditionPredicate::new();
        never.expect_evaluate().times(0);
        let predicate = Predicate::custom(never);

        for quantifier in [Quantifier::All, Quantifier::Any, Quantifier::some(0, 0)] {
            assert!(!quantifier.evaluate("cond", &predicate, None, &[]).unwrap());
        }
    }

    #[test]
    fn test_predicate_invoked_once_per_value() {
        let mut counting = MockConditionPredicate::new();
        counting.expect_evaluate().times(3).returning(|_, _, _| Ok(true));
        let predicate = Predicate::custom(counting);

        assert!(Quantifier::All
            .evaluate("cond", &predicate, Some(&Value::from("a")), &rule_values())
            .unwrap());
    }

    #[test]
    fn test_failure_aborts_count() {
        let mut failing = MockConditionPredicate::new();
        failing
            .expect_evaluate()
            .times(1)
            .returning(|_, _, _| Err(MatchError::evaluation("boom")));
        let predicate = Predicate::custom(failing);

        let result = Quantifier::Any.evaluate("cond", &predicate, None, &rule_values());
        assert!(matches!(result, Err(MatchError::EvaluationFailure { .. })));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(Quantifier::All.bounds(4), (4, 4));
        assert_eq!(Quantifier::Any.bounds(4), (1, 4));
        assert_eq!(Quantifier::some(-5, 2).bounds(4), (0, 2));
        assert_eq!(Quantifier::some(1, -1).bounds(4), (1, 4));
    }

    #[test]
    fn test_display() {
        assert_eq!(Quantifier::some(2, -1).to_string(), "some[2, *]");
        assert_eq!(Quantifier::All.to_string(), "all");
    }
}
