//! 合并引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则名称重复: {0}")]
    DuplicateRuleName(String),

    #[error("规则 '{rule}' 重复绑定合并属性: {attribute}")]
    DuplicateCombiner { rule: String, attribute: String },

    #[error("无效的 as 取值: {0}（必须是 all、any、first 或 last）")]
    InvalidSameMode(String),

    #[error("无效的 from 取值: {0}（必须是 first 或 last）")]
    InvalidReference(String),

    #[error("合并器 {combiner} 缺少必填参数: {option}")]
    MissingOption { combiner: String, option: String },

    #[error("only 与 except 只能指定其一")]
    ConflictingOptions,

    #[error("未知的合并器: {0}")]
    UnknownCombiner(String),

    #[error("规则解析失败: {0}")]
    ParseError(String),

    #[error("类型不匹配: 期望 {expected}, 实际 {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("规则执行失败: {0}")]
    ExecutionError(String),

    #[error("JSON 序列化错误: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl RuleError {
    pub(crate) fn type_mismatch(expected: &str, actual: &serde_json::Value) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            actual: type_name(actual).to_string(),
        }
    }
}

/// 获取值的类型名称
pub(crate) fn type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
