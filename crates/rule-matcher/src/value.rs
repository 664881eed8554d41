//! 条件值模型
//!
//! 查询中的实际值和规则中的候选值共用同一个封闭的值类型。
//! 引擎本身从不解释这些值，只有谓词会按类型比较它们。

use crate::error::{MatchError, Result};
use regex::Regex;
use regex_automata::{Anchored, Input, MatchKind, meta};
use std::fmt;

/// 已编译的正则表达式
///
/// 按源文本判等，这样规则值集合里重复的模式可以按集合语义去重。
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    /// 整串匹配用：锚定起点、取最长匹配，不改写源文本
    full: meta::Regex,
}

impl Pattern {
    /// 编译正则表达式
    pub fn new(source: &str) -> Result<Self> {
        let invalid = |e: &dyn fmt::Display| {
            MatchError::Definition(format!("无效的正则表达式 '{}': {}", source, e))
        };

        let regex = Regex::new(source).map_err(|e| invalid(&e))?;
        let full = meta::Regex::builder()
            .configure(meta::Regex::config().match_kind(MatchKind::All))
            .build(source)
            .map_err(|e| invalid(&e))?;
        Ok(Self { regex, full })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// 整串匹配
    pub fn matches(&self, haystack: &str) -> bool {
        let input = Input::new(haystack).anchored(Anchored::Yes);
        self.full
            .search_half(&input)
            .is_some_and(|end| end.offset() == haystack.len())
    }

    /// 在任意位置找到匹配即可
    pub fn find(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// 值的运行时类型，出现在类型错误信息中
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    Pattern,
    List,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Pattern => "pattern",
            Self::List => "list",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 条件值
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 空值，与缺失等价
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Pattern(Pattern),
    List(Vec<Value>),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::Float(_) => ValueKind::Float,
            Self::String(_) => ValueKind::String,
            Self::Pattern(_) => ValueKind::Pattern,
            Self::List(_) => ValueKind::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            Self::Pattern(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// 数值视图：整数和浮点数统一为 f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// 编译正则表达式并包装为模式值
    pub fn pattern(source: &str) -> Result<Self> {
        Pattern::new(source).map(Self::Pattern)
    }

    /// 从 JSON 转换
    ///
    /// 形如 `{"pattern": "..."}` 的对象会被编译为模式值，其他对象不受支持。
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        use serde_json::Value as Json;

        match json {
            Json::Null => Ok(Self::Null),
            Json::Bool(b) => Ok(Self::Boolean(b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(MatchError::Definition(format!("无法表示的数值: {}", n)))
                }
            }
            Json::String(s) => Ok(Self::String(s)),
            Json::Array(items) => items
                .into_iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            Json::Object(mut obj) => match (obj.len(), obj.remove("pattern")) {
                (1, Some(Json::String(source))) => Self::pattern(&source),
                _ => Err(MatchError::Definition(
                    "对象值仅支持 {\"pattern\": \"<regex>\"} 形式".to_string(),
                )),
            },
        }
    }
}

/// 将 `Some(Value::Null)` 视为缺失
pub(crate) fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Pattern(p) => write!(f, "/{}/", p.as_str()),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Pattern> for Value {
    fn from(p: Pattern) -> Self {
        Self::Pattern(p)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pattern_equality_by_source() {
        let a = Value::pattern("val[xyz]").unwrap();
        let b = Value::pattern("val[xyz]").unwrap();
        let c = Value::pattern("val.").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_pattern_full_match_and_find() {
        let p = Pattern::new("val[xyz]").unwrap();

        assert!(p.matches("valx"));
        assert!(!p.matches("xx valx"));
        assert!(p.find("xx valx"));
        assert!(!p.find("nothing here"));
    }

    #[test]
    fn test_pattern_full_match_with_alternation() {
        // 最左匹配只覆盖前缀时仍需判断整串能否匹配
        let p = Pattern::new("a|ab").unwrap();
        assert!(p.matches("ab"));
        assert!(p.matches("a"));
        assert!(!p.matches("abc"));
    }

    #[test]
    fn test_pattern_full_match_verbose_comment() {
        // 行尾注释不能吞掉整串匹配的锚点
        let p = Pattern::new("(?x)a b # trailing comment").unwrap();
        assert!(p.matches("ab"));
        assert!(!p.matches("abc"));
        assert!(!p.matches("xab"));
        assert!(p.find("xabc"));
    }

    #[test]
    fn test_pattern_full_match_longest_branch() {
        let p = Pattern::new(r"\d+|\d+px").unwrap();
        assert!(p.matches("12px"));
        assert!(p.matches("12"));
        assert!(!p.matches("12p"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Pattern::new("[invalid").unwrap_err();
        assert!(err.to_string().contains("无效的正则表达式"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::from(5).kind().name(), "integer");
        assert_eq!(Value::from("x").kind().name(), "string");
        assert_eq!(Value::pattern("x").unwrap().kind().name(), "pattern");
        assert_eq!(Value::Null.kind().to_string(), "null");
    }

    #[test]
    fn test_from_json() {
        let value = Value::from_json(json!([1, 2.5, "a", true, null])).unwrap();
        assert_eq!(
            value,
            Value::List(vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::from("a"),
                Value::Boolean(true),
                Value::Null,
            ])
        );

        let pattern = Value::from_json(json!({"pattern": "^a+$"})).unwrap();
        assert_eq!(pattern.as_pattern().map(Pattern::as_str), Some("^a+$"));

        assert!(Value::from_json(json!({"other": 1})).is_err());
        assert!(Value::from_json(json!({"pattern": 1})).is_err());
    }

    #[test]
    fn test_present_treats_null_as_absent() {
        assert!(present(Some(&Value::Null)).is_none());
        assert!(present(None).is_none());
        assert_eq!(present(Some(&Value::from(1))), Some(&Value::from(1)));
    }

    #[test]
    fn test_display() {
        let value = Value::from(vec![Value::from(1), Value::from("a")]);
        assert_eq!(value.to_string(), "[1, \"a\"]");
    }
}
