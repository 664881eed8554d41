//! 规则匹配引擎
//!
//! 根据查询条件集合，找出所有条件都满足的规则并返回它们的输出值：
//! - 可组合的逐点谓词（相等、包含、正则、数值比较及其逻辑组合）
//! - 元组量词（all / any / some[min, max]）
//! - 按注册顺序扫描的不可变引擎，可选条件名索引
//! - JSON 引擎定义编译

pub mod compiler;
pub mod engine;
pub mod error;
mod evaluator;
pub mod index;
pub mod models;
pub mod predicate;
pub mod quantifier;
pub mod telemetry;
pub mod value;

pub use compiler::{EngineDefinition, PredicateDefinition, QuantifierDefinition, RuleCompiler};
pub use engine::{Engine, EngineBuilder, EngineStats, LookupReport, RuleOutcome, RuleStatus};
pub use error::{BoxError, MatchError, Result};
pub use models::{Action, ConditionSet, ConditionSetBuilder, ValueSet, ValueSetBuilder, Values};
pub use predicate::{ConditionPredicate, Predicate, Projection};
pub use quantifier::Quantifier;
pub use value::{Pattern, Value, ValueKind};
