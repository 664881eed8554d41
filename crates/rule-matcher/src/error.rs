//! 规则匹配引擎错误类型
//!
//! 谓词求值、规则定义编译和查找过程中可能出现的全部错误。
//! 查找过程中遇到的第一个错误会中止整次查找并原样返回给调用方。

use thiserror::Error;

/// 用户自定义谓词可携带的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum MatchError {
    /// 规则中定义的值类型不满足谓词要求（先于查询值检查）
    #[error("Condition with name {condition} has a wrong class, expected {expected}, but was {actual}")]
    WrongRuleValueType {
        condition: String,
        expected: String,
        actual: String,
    },

    /// 查询提供的实际值类型不满足谓词要求（规则值检查通过后才检查）
    #[error("Condition with name {condition} has a wrong class, expected {expected}, but was {actual}")]
    WrongQueryValueType {
        condition: String,
        expected: String,
        actual: String,
    },

    /// 谓词计算过程中的其他失败，例如自定义比较逻辑抛出的错误
    #[error("谓词求值失败: {}", .message.as_deref().unwrap_or("未知原因"))]
    EvaluationFailure {
        message: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("规则定义无效: {0}")]
    Definition(String),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("读取规则定义失败: {0}")]
    Io(#[from] std::io::Error),
}

impl MatchError {
    /// 规则值类型错误
    pub fn wrong_rule_value(
        condition: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::WrongRuleValueType {
            condition: condition.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// 查询值类型错误
    pub fn wrong_query_value(
        condition: &str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::WrongQueryValueType {
            condition: condition.to_string(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// 仅携带消息的求值失败
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::EvaluationFailure {
            message: Some(message.into()),
            source: None,
        }
    }

    /// 包装底层错误的求值失败
    pub fn evaluation_caused_by(message: Option<String>, source: impl Into<BoxError>) -> Self {
        Self::EvaluationFailure {
            message,
            source: Some(source.into()),
        }
    }

    /// 是否为类型契约错误（规则值或查询值）
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            Self::WrongRuleValueType { .. } | Self::WrongQueryValueType { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
