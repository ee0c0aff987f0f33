//! 规则编译器
//!
//! 将 JSON 规则定义解析并编译成不可变的 [`Rule`] 与 [`Grouper`]。
//! 所有配置错误都在编译阶段返回，早于任何记录的处理。

use crate::combiner::{Combiner, CombinerBinding};
use crate::error::{Result, RuleError};
use crate::grouper::Grouper;
use crate::predicate::{ReferencePoint, SameMode};
use crate::record::Record;
use crate::rule::{Rule, RuleBuilder};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, instrument};

/// 分组器定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrouperDefinition {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

fn default_enabled() -> bool {
    true
}

/// 规则定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    #[serde(default)]
    pub predicates: Vec<PredicateDefinition>,
    /// 空列表表示锁定到本规则
    #[serde(default)]
    pub lock: Option<Vec<String>>,
    /// 空列表表示解锁本规则
    #[serde(default)]
    pub unlock: Option<Vec<String>>,
    #[serde(default)]
    pub combine: Vec<CombineDefinition>,
}

/// 谓词定义
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PredicateDefinition {
    AttrIn {
        attr: String,
        values: Vec<Value>,
    },
    Key {
        values: Vec<Value>,
        #[serde(rename = "as", default = "default_same_mode")]
        mode: String,
    },
    Same {
        keys: Vec<String>,
        #[serde(rename = "as", default = "default_same_mode")]
        mode: String,
    },
    TimeDelta {
        seconds: i64,
        #[serde(default = "default_reference")]
        from: String,
        #[serde(default = "default_time_attr")]
        attr: String,
    },
    BatchKey {
        values: Vec<Value>,
    },
    AttrMatches {
        attr: String,
        pattern: String,
    },
}

fn default_same_mode() -> String {
    "all".to_string()
}

fn default_reference() -> String {
    "first".to_string()
}

fn default_time_attr() -> String {
    "created_at".to_string()
}

/// 合并器绑定定义
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombineDefinition {
    pub attrs: Vec<String>,
    #[serde(default = "default_combiner")]
    pub with: String,
    #[serde(default)]
    pub options: Map<String, Value>,
    #[serde(default = "default_compact")]
    pub compact: bool,
}

fn default_combiner() -> String {
    "array".to_string()
}

fn default_compact() -> bool {
    true
}

/// 编译单条规则定义
#[instrument(skip(definition), fields(rule_name = %definition.name))]
pub fn compile_rule<R: Record + 'static>(definition: &RuleDefinition) -> Result<Rule<R>> {
    let mut builder = RuleBuilder::new(definition.name.clone());

    for predicate in &definition.predicates {
        builder = match predicate {
            PredicateDefinition::AttrIn { attr, values } => {
                builder.attr_in(attr.clone(), values.iter().cloned())
            }
            PredicateDefinition::Key { values, mode } => {
                builder.key_as(values.iter().cloned(), mode.parse::<SameMode>()?)
            }
            PredicateDefinition::Same { keys, mode } => {
                builder.same_as(keys.iter().cloned(), mode.parse::<SameMode>()?)
            }
            PredicateDefinition::TimeDelta {
                seconds,
                from,
                attr,
            } => {
                let delta = TimeDelta::try_seconds(*seconds).ok_or_else(|| {
                    RuleError::ParseError(format!("time_delta 秒数超出范围: {}", seconds))
                })?;
                builder.time_delta_from(delta, from.parse::<ReferencePoint>()?, attr.clone())
            }
            PredicateDefinition::BatchKey { values } => builder.batch_key(values.iter().cloned()),
            PredicateDefinition::AttrMatches { attr, pattern } => {
                builder.attr_matches(attr.clone(), pattern)
            }
        };
    }

    if let Some(names) = &definition.lock {
        builder = builder.lock(names.iter().cloned());
    }
    if let Some(names) = &definition.unlock {
        builder = builder.unlock(names.iter().cloned());
    }

    for combine in &definition.combine {
        let combiner = Combiner::from_name(&combine.with, &combine.options)?;
        for attr in &combine.attrs {
            let mut binding = CombinerBinding::new(attr.clone(), combiner.clone());
            if !combine.compact {
                binding = binding.without_compaction();
            }
            builder = builder.combine_binding(binding);
        }
    }

    builder.build()
}

/// 编译分组器定义
#[instrument(skip(definition), fields(rules = definition.rules.len()))]
pub fn compile_grouper<R: Record + 'static>(definition: &GrouperDefinition) -> Result<Grouper<R>> {
    let rules = definition
        .rules
        .iter()
        .map(compile_rule::<R>)
        .collect::<Result<Vec<_>>>()?;

    let grouper = Grouper::new(rules, definition.enabled)?;
    info!(enabled = grouper.is_enabled(), "分组器已编译");
    Ok(grouper)
}

/// 从 JSON 字符串编译分组器
pub fn compile_from_json<R: Record + 'static>(json: &str) -> Result<Grouper<R>> {
    let definition: GrouperDefinition = serde_json::from_str(json)?;
    compile_grouper(&definition)
}
