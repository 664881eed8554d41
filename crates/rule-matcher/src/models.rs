//! 规则匹配领域模型
//!
//! - `ConditionSet`：查询，条件名 -> 单个实际值
//! - `ValueSet`：规则，条件名 -> 有序候选值集合，外加输出值列表
//! - `Values`：一次查找的结果，按规则注册顺序拼接的输出值
//!
//! 三者都通过对应的 Builder 一次性构建，构建后不可变。

use crate::error::{MatchError, Result};
use crate::value::Value;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// 查询条件集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSet {
    conditions: HashMap<String, Value>,
}

impl ConditionSet {
    pub fn builder() -> ConditionSetBuilder {
        ConditionSetBuilder::default()
    }

    /// 获取条件的实际值，缺失返回 None
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.conditions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.conditions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// 从 JSON 对象创建，例如 `{"cond": 2, "name": "abc"}`
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(MatchError::Definition("查询必须是 JSON 对象".to_string()));
        };

        let mut builder = Self::builder();
        for (name, value) in map {
            builder = builder.condition(name, Value::from_json(value)?);
        }
        Ok(builder.build())
    }
}

/// 查询构建器
#[derive(Debug, Default)]
pub struct ConditionSetBuilder {
    conditions: HashMap<String, Value>,
}

impl ConditionSetBuilder {
    /// 设置条件值，同名条件后设置的覆盖先设置的
    pub fn condition(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> ConditionSet {
        ConditionSet {
            conditions: self.conditions,
        }
    }
}

/// 规则：每个条件的候选值集合及匹配后的输出值
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSet<T> {
    /// 条件按插入顺序保存，候选值非空且已去重
    conditions: Vec<(String, Vec<Value>)>,
    outputs: Vec<T>,
}

impl<T> ValueSet<T> {
    pub fn builder() -> ValueSetBuilder<T> {
        ValueSetBuilder::default()
    }

    /// 按插入顺序遍历条件及其候选值
    pub fn conditions(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.conditions
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn values(&self, name: &str) -> Option<&[Value]> {
        self.conditions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn condition_count(&self) -> usize {
        self.conditions.len()
    }

    /// 没有任何条件的规则对所有查询都匹配
    pub fn is_unconditional(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn outputs(&self) -> &[T] {
        &self.outputs
    }
}

/// 规则构建器
#[derive(Debug)]
pub struct ValueSetBuilder<T> {
    conditions: Vec<(String, Vec<Value>)>,
    outputs: Vec<T>,
}

impl<T> Default for ValueSetBuilder<T> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            outputs: Vec::new(),
        }
    }
}

impl<T> ValueSetBuilder<T> {
    /// 为条件追加候选值
    ///
    /// 同名条件多次调用时候选值合并；重复值按集合语义只保留首次出现。
    pub fn condition<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.into();
        let position = match self.conditions.iter().position(|(n, _)| *n == name) {
            Some(position) => position,
            None => {
                self.conditions.push((name, Vec::new()));
                self.conditions.len() - 1
            }
        };

        let set = &mut self.conditions[position].1;
        for value in values {
            let value = value.into();
            if !set.contains(&value) {
                set.push(value);
            }
        }
        self
    }

    pub fn output(mut self, output: T) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn outputs(mut self, outputs: impl IntoIterator<Item = T>) -> Self {
        self.outputs.extend(outputs);
        self
    }

    /// 构建规则
    ///
    /// 条件名为空或候选值为空时返回 `MatchError::Definition`。
    pub fn build(self) -> Result<ValueSet<T>> {
        for (name, values) in &self.conditions {
            if name.is_empty() {
                return Err(MatchError::Definition("条件名称不能为空".to_string()));
            }
            if values.is_empty() {
                return Err(MatchError::Definition(format!(
                    "条件 '{}' 的候选值不能为空",
                    name
                )));
            }
        }

        Ok(ValueSet {
            conditions: self.conditions,
            outputs: self.outputs,
        })
    }
}

/// 对单个输出值执行的回调
pub trait Action<T> {
    fn apply(&self, value: &T);
}

impl<T, F> Action<T> for F
where
    F: Fn(&T),
{
    fn apply(&self, value: &T) {
        self(value)
    }
}

/// 查找结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Values<T> {
    items: Vec<T>,
}

impl<T> Values<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// 依次对每个输出值执行回调
    pub fn apply(&self, action: &impl Action<T>) {
        for item in &self.items {
            action.apply(item);
        }
    }

    /// 按比较器排序，相等元素保持原有顺序
    pub fn sort_by<F>(mut self, comparator: F) -> Self
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.items.sort_by(comparator);
        self
    }
}

impl<T> Default for Values<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> IntoIterator for Values<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Values<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn test_condition_set_builder() {
        let query = ConditionSet::builder()
            .condition("cond", 2)
            .condition("name", "abc")
            .condition("cond", 3)
            .build();

        assert_eq!(query.len(), 2);
        assert_eq!(query.get("cond"), Some(&Value::from(3)));
        assert!(query.get("missing").is_none());
    }

    #[test]
    fn test_condition_set_from_json() {
        let query = ConditionSet::from_json(json!({"cond": 2, "tags": ["a"], "flag": null})).unwrap();

        assert_eq!(query.get("cond"), Some(&Value::from(2)));
        assert_eq!(query.get("tags"), Some(&Value::from(vec!["a"])));
        assert_eq!(query.get("flag"), Some(&Value::Null));

        assert!(ConditionSet::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_value_set_preserves_order_and_deduplicates() {
        let rule: ValueSet<&str> = ValueSet::builder()
            .condition("b", [3, 1, 3])
            .condition("a", [1])
            .condition("b", [2, 1])
            .output("out")
            .build()
            .unwrap();

        let names: Vec<&str> = rule.conditions().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(
            rule.values("b").unwrap(),
            &[Value::from(3), Value::from(1), Value::from(2)]
        );
        assert_eq!(rule.outputs(), &["out"]);
    }

    #[test]
    fn test_value_set_rejects_empty_values() {
        let result: Result<ValueSet<i32>> = ValueSet::builder()
            .condition("cond", Vec::<Value>::new())
            .build();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("候选值不能为空"));
    }

    #[test]
    fn test_value_set_rejects_empty_name() {
        let result: Result<ValueSet<i32>> = ValueSet::builder().condition("", [1]).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_unconditional_rule() {
        let rule: ValueSet<&str> = ValueSet::builder().output("default").build().unwrap();
        assert!(rule.is_unconditional());
        assert_eq!(rule.condition_count(), 0);
    }

    #[test]
    fn test_values_apply_and_sort() {
        let values = Values::new(vec![3, 1, 2]);

        let seen = RefCell::new(Vec::new());
        values.apply(&|v: &i32| seen.borrow_mut().push(*v));
        assert_eq!(seen.into_inner(), vec![3, 1, 2]);

        let sorted = values.sort_by(|a, b| a.cmp(b));
        assert_eq!(sorted.into_vec(), vec![1, 2, 3]);
    }
}
