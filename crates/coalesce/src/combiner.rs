//! 合并器库
//!
//! 每个合并器把同一属性在批次各成员上的取值列表归约为一个值。
//! 输入列表默认已剔除缺少该属性的成员（见 [`CombinerBinding::compact`]）。

use crate::error::{Result, RuleError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 自定义归约函数
pub type ReduceFn = Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

/// 键筛选谓词
pub type KeyPredicateFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

// ==================== 归约函数 ====================

/// 原样返回取值列表
pub fn none(values: &[Value]) -> Value {
    Value::Array(values.to_vec())
}

/// 收集为数组，可选去重（保留首次出现顺序）与单元素解包
pub fn array(values: &[Value], unique: bool, singular: bool) -> Value {
    let mut collected: Vec<Value> = Vec::with_capacity(values.len());
    for value in values {
        if unique && collected.contains(value) {
            continue;
        }
        collected.push(value.clone());
    }

    if singular && collected.len() == 1 {
        collected.remove(0)
    } else {
        Value::Array(collected)
    }
}

/// 按点号分段合并事件键
///
/// `["ticket.accept", "ticket.close"]` => `"ticket.accept_close"`，
/// 每一段内排序去重后以 `_` 连接。
pub fn smart_key(values: &[Value]) -> Result<Value> {
    let parts = values
        .iter()
        .map(|value| {
            value
                .as_str()
                .map(|s| s.split('.').collect::<Vec<_>>())
                .ok_or_else(|| RuleError::type_mismatch("string", value))
        })
        .collect::<Result<Vec<_>>>()?;

    let len = parts.iter().map(Vec::len).max().unwrap_or(0);

    let segments: Vec<String> = (0..len)
        .map(|seg| {
            let mut to_combine: Vec<&str> = parts.iter().filter_map(|p| p.get(seg).copied()).collect();
            to_combine.sort_unstable();
            to_combine.dedup();
            to_combine.join("_")
        })
        .collect();

    Ok(Value::String(segments.join(".")))
}

/// 哈希合并顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeOrder {
    /// 先出现的键优先，后续只补充缺失的键
    #[default]
    LeftWins,
    /// 后出现的值覆盖先前的值
    RightWins,
}

/// 从左到右折叠合并对象
pub fn hash_merge(values: &[Value], order: MergeOrder) -> Result<Value> {
    let mut merged = Map::new();

    for value in values {
        let map = value
            .as_object()
            .ok_or_else(|| RuleError::type_mismatch("object", value))?;

        for (k, v) in map {
            match order {
                MergeOrder::LeftWins => {
                    merged.entry(k.clone()).or_insert_with(|| v.clone());
                }
                MergeOrder::RightWins => {
                    merged.insert(k.clone(), v.clone());
                }
            }
        }
    }

    Ok(Value::Object(merged))
}

pub fn first(values: &[Value]) -> Value {
    values.first().cloned().unwrap_or(Value::Null)
}

pub fn last(values: &[Value]) -> Value {
    values.last().cloned().unwrap_or(Value::Null)
}

/// 越界时返回 `null`
pub fn nth(values: &[Value], index: usize) -> Value {
    values.get(index).cloned().unwrap_or(Value::Null)
}

/// 忽略输入，返回字面值的副本
pub fn literal(_values: &[Value], value: &Value) -> Value {
    value.clone()
}

/// 按键合并对象数组
///
/// 不足两个对象时原样返回。否则对每个键收集各对象上的取值，
/// 被 only/except 选中的键用 `combiner` 归约，其余键用 `other` 归约。
pub fn hash_merge_array(values: &[Value], options: &HashMergeArrayOptions) -> Result<Value> {
    if values.len() < 2 {
        return Ok(Value::Array(values.to_vec()));
    }

    let mut collected: BTreeMap<&str, Vec<Value>> = BTreeMap::new();
    for value in values {
        let map = value
            .as_object()
            .ok_or_else(|| RuleError::type_mismatch("object", value))?;

        for (k, v) in map {
            collected.entry(k.as_str()).or_default().push(v.clone());
        }
    }

    let mut result = Map::new();
    for (key, list) in collected {
        let reduced = if options.selects(key) {
            options.combiner.reduce(&list)?
        } else {
            options.other.reduce(&list)?
        };
        result.insert(key.to_string(), reduced);
    }

    Ok(Value::Object(result))
}

// ==================== 具名合并器 ====================

/// 键集合：字面键列表或键谓词
#[derive(Clone)]
pub enum KeySelector {
    Keys(Vec<String>),
    Predicate(KeyPredicateFn),
}

impl KeySelector {
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Keys(keys.into_iter().map(Into::into).collect())
    }

    pub fn predicate(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(f))
    }

    fn contains(&self, key: &str) -> bool {
        match self {
            Self::Keys(keys) => keys.iter().any(|k| k == key),
            Self::Predicate(f) => f(key),
        }
    }
}

impl fmt::Debug for KeySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keys(keys) => f.debug_tuple("Keys").field(keys).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// `hash_merge_array` 参数
#[derive(Debug, Clone)]
pub struct HashMergeArrayOptions {
    pub only: Option<KeySelector>,
    pub except: Option<KeySelector>,
    /// 选中键的归约方式
    pub combiner: Combiner,
    /// 其余键的归约方式
    pub other: Combiner,
}

impl Default for HashMergeArrayOptions {
    fn default() -> Self {
        Self {
            only: None,
            except: None,
            combiner: Combiner::array(),
            other: Combiner::First,
        }
    }
}

impl HashMergeArrayOptions {
    fn selects(&self, key: &str) -> bool {
        if let Some(only) = &self.only {
            return only.contains(key);
        }
        if let Some(except) = &self.except {
            return !except.contains(key);
        }
        true
    }
}

/// 内置合并器及其参数
///
/// 必填参数以 `Option` 保存，由 [`Combiner::validate`] 在规则构建时检查。
#[derive(Debug, Clone)]
pub enum Combiner {
    None,
    Array { unique: bool, singular: bool },
    SmartKey,
    HashMerge { order: MergeOrder },
    First,
    Last,
    Nth { index: Option<usize> },
    Literal { value: Option<Value> },
    HashMergeArray(Box<HashMergeArrayOptions>),
}

impl Default for Combiner {
    fn default() -> Self {
        Self::array()
    }
}

impl Combiner {
    pub fn array() -> Self {
        Self::Array {
            unique: false,
            singular: false,
        }
    }

    /// 仅对 `Array` 生效
    pub fn unique(mut self) -> Self {
        if let Self::Array { unique, .. } = &mut self {
            *unique = true;
        }
        self
    }

    /// 仅对 `Array` 生效
    pub fn singular(mut self) -> Self {
        if let Self::Array { singular, .. } = &mut self {
            *singular = true;
        }
        self
    }

    pub fn hash_merge(order: MergeOrder) -> Self {
        Self::HashMerge { order }
    }

    pub fn nth(index: usize) -> Self {
        Self::Nth { index: Some(index) }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal {
            value: Some(value.into()),
        }
    }

    pub fn hash_merge_array(options: HashMergeArrayOptions) -> Self {
        Self::HashMergeArray(Box::new(options))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Array { .. } => "array",
            Self::SmartKey => "smart_key",
            Self::HashMerge { .. } => "hash_merge",
            Self::First => "first",
            Self::Last => "last",
            Self::Nth { .. } => "nth",
            Self::Literal { .. } => "literal",
            Self::HashMergeArray(_) => "hash_merge_array",
        }
    }

    /// 检查必填参数与互斥参数
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Nth { index: None } => Err(self.missing("index")),
            Self::Literal { value: None } => Err(self.missing("value")),
            Self::HashMergeArray(options) => {
                if options.only.is_some() && options.except.is_some() {
                    return Err(RuleError::ConflictingOptions);
                }
                options.combiner.validate()?;
                options.other.validate()
            }
            _ => Ok(()),
        }
    }

    pub fn reduce(&self, values: &[Value]) -> Result<Value> {
        match self {
            Self::None => Ok(none(values)),
            Self::Array { unique, singular } => Ok(array(values, *unique, *singular)),
            Self::SmartKey => smart_key(values),
            Self::HashMerge { order } => hash_merge(values, *order),
            Self::First => Ok(first(values)),
            Self::Last => Ok(last(values)),
            Self::Nth { index } => {
                let index = index.ok_or_else(|| self.missing("index"))?;
                Ok(nth(values, index))
            }
            Self::Literal { value } => {
                let value = value.as_ref().ok_or_else(|| self.missing("value"))?;
                Ok(literal(values, value))
            }
            Self::HashMergeArray(options) => hash_merge_array(values, options),
        }
    }

    /// 按名称与 JSON 参数构建合并器（声明式规则使用）
    pub fn from_name(name: &str, options: &Map<String, Value>) -> Result<Self> {
        let allowed: &[&str] = match name {
            "none" | "smart_key" | "first" | "last" => &[],
            "array" => &["unique", "singular"],
            "hash_merge" => &["method"],
            "nth" => &["index"],
            "literal" => &["value"],
            "hash_merge_array" => &[
                "only",
                "except",
                "combiner",
                "combiner_options",
                "other",
                "other_options",
            ],
            _ => return Err(RuleError::UnknownCombiner(name.to_string())),
        };

        if let Some(key) = options.keys().find(|k| !allowed.contains(&k.as_str())) {
            return Err(RuleError::ParseError(format!(
                "合并器 {} 不支持参数 '{}'",
                name, key
            )));
        }

        let combiner = match name {
            "none" => Self::None,
            "smart_key" => Self::SmartKey,
            "first" => Self::First,
            "last" => Self::Last,
            "array" => Self::Array {
                unique: bool_option(options, "unique")?,
                singular: bool_option(options, "singular")?,
            },
            "hash_merge" => {
                let order = match options.get("method").map(|v| (v, v.as_str())) {
                    None | Some((_, Some("reverse_merge"))) => MergeOrder::LeftWins,
                    Some((_, Some("merge"))) => MergeOrder::RightWins,
                    Some((_, Some(other))) => {
                        return Err(RuleError::ParseError(format!(
                            "hash_merge 的 method 必须是 reverse_merge 或 merge，当前为 '{}'",
                            other
                        )));
                    }
                    Some((v, None)) => return Err(RuleError::type_mismatch("string", v)),
                };
                Self::HashMerge { order }
            }
            "nth" => {
                let index = match options.get("index") {
                    None | Some(Value::Null) => None,
                    Some(v) => {
                        let index = v
                            .as_u64()
                            .ok_or_else(|| RuleError::type_mismatch("unsigned integer", v))?;
                        let index = usize::try_from(index).map_err(|_| {
                            RuleError::ParseError(format!("nth 的 index 超出范围: {}", index))
                        })?;
                        Some(index)
                    }
                };
                Self::Nth { index }
            }
            "literal" => Self::Literal {
                value: options.get("value").cloned(),
            },
            "hash_merge_array" => {
                let nested = |key: &str, options_key: &str, default: Combiner| -> Result<Combiner> {
                    match options.get(key) {
                        None => Ok(default),
                        Some(Value::String(inner)) => {
                            let empty = Map::new();
                            let inner_options = match options.get(options_key) {
                                None => &empty,
                                Some(Value::Object(map)) => map,
                                Some(v) => return Err(RuleError::type_mismatch("object", v)),
                            };
                            Self::from_name(inner, inner_options)
                        }
                        Some(v) => Err(RuleError::type_mismatch("string", v)),
                    }
                };

                Self::hash_merge_array(HashMergeArrayOptions {
                    only: key_selector_option(options, "only")?,
                    except: key_selector_option(options, "except")?,
                    combiner: nested("combiner", "combiner_options", Combiner::array())?,
                    other: nested("other", "other_options", Combiner::First)?,
                })
            }
            other => return Err(RuleError::UnknownCombiner(other.to_string())),
        };

        combiner.validate()?;
        Ok(combiner)
    }

    fn missing(&self, option: &str) -> RuleError {
        RuleError::MissingOption {
            combiner: self.name().to_string(),
            option: option.to_string(),
        }
    }
}

fn bool_option(options: &Map<String, Value>, key: &str) -> Result<bool> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(v) => Err(RuleError::type_mismatch("boolean", v)),
    }
}

/// 接受单个字符串或字符串数组
fn key_selector_option(options: &Map<String, Value>, key: &str) -> Result<Option<KeySelector>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(KeySelector::keys([s.as_str()]))),
        Some(Value::Array(items)) => {
            let keys = items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| RuleError::type_mismatch("string", item))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(KeySelector::Keys(keys)))
        }
        Some(v) => Err(RuleError::type_mismatch("string or array", v)),
    }
}

// ==================== 绑定 ====================

/// 归约方式：具名合并器或自定义函数
#[derive(Clone)]
pub enum Reducer {
    Named(Combiner),
    Custom(ReduceFn),
}

impl Reducer {
    pub fn custom(f: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Named(combiner) => combiner.validate(),
            Self::Custom(_) => Ok(()),
        }
    }

    pub fn reduce(&self, values: &[Value]) -> Result<Value> {
        match self {
            Self::Named(combiner) => combiner.reduce(values),
            Self::Custom(f) => f(values),
        }
    }
}

impl From<Combiner> for Reducer {
    fn from(combiner: Combiner) -> Self {
        Self::Named(combiner)
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(combiner) => f.debug_tuple("Named").field(combiner).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// 属性与归约方式的绑定
#[derive(Debug, Clone)]
pub struct CombinerBinding {
    pub attribute: String,
    pub reducer: Reducer,
    /// 为 false 时，缺少该属性的成员以 `null` 参与归约
    pub compact: bool,
}

impl CombinerBinding {
    pub fn new(attribute: impl Into<String>, reducer: impl Into<Reducer>) -> Self {
        Self {
            attribute: attribute.into(),
            reducer: reducer.into(),
            compact: true,
        }
    }

    pub fn without_compaction(mut self) -> Self {
        self.compact = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list(value: Value) -> Vec<Value> {
        match value {
            Value::Array(items) => items,
            other => vec![other],
        }
    }

    #[test]
    fn test_smart_key() {
        assert_eq!(
            smart_key(&list(json!(["ticket.accept", "ticket.close"]))).unwrap(),
            json!("ticket.accept_close")
        );
        assert_eq!(
            smart_key(&list(json!(["ticket.create", "comment.create"]))).unwrap(),
            json!("comment_ticket.create")
        );
    }

    #[test]
    fn test_smart_key_uneven_segments() {
        assert_eq!(
            smart_key(&list(json!(["ticket", "ticket.close.late"]))).unwrap(),
            json!("ticket.close.late")
        );
        assert_eq!(smart_key(&[]).unwrap(), json!(""));
    }

    #[test]
    fn test_smart_key_rejects_non_strings() {
        let result = smart_key(&list(json!(["ticket.create", 7])));
        assert!(matches!(result, Err(RuleError::TypeMismatch { .. })));
    }

    #[test]
    fn test_position() {
        let values = list(json!(["Mike", "Kayla", "Tucson"]));
        assert_eq!(first(&values), json!("Mike"));
        assert_eq!(last(&values), json!("Tucson"));
        assert_eq!(nth(&values, 1), json!("Kayla"));
        assert_eq!(nth(&values, 9), Value::Null);
        assert_eq!(first(&[]), Value::Null);
    }

    #[test]
    fn test_array() {
        let values = list(json!(["Mike", "Tucson", "Mike"]));
        assert_eq!(array(&values, false, false), json!(["Mike", "Tucson", "Mike"]));
        assert_eq!(array(&values, true, false), json!(["Mike", "Tucson"]));

        assert_eq!(array(&list(json!(["Mike"])), false, true), json!("Mike"));
        assert_eq!(array(&list(json!(["Mike"])), false, false), json!(["Mike"]));
        assert_eq!(array(&list(json!(["Mike", "Mike"])), true, true), json!("Mike"));
    }

    #[test]
    fn test_hash_merge() {
        let values = vec![
            json!({"name": "Mike", "age": 91, "pet": "Tucson"}),
            json!({"name": "Bob", "age": 19, "car": "Dodge"}),
        ];

        let result = hash_merge(&values, MergeOrder::LeftWins).unwrap();
        assert_eq!(result["name"], json!("Mike"));
        assert_eq!(result["age"], json!(91));
        assert_eq!(result["pet"], json!("Tucson"));
        assert_eq!(result["car"], json!("Dodge"));

        let result = hash_merge(&values, MergeOrder::RightWins).unwrap();
        assert_eq!(result["name"], json!("Bob"));
        assert_eq!(result["age"], json!(19));
        assert_eq!(result["pet"], json!("Tucson"));
        assert_eq!(result["car"], json!("Dodge"));
    }

    #[test]
    fn test_hash_merge_array() {
        let values = vec![
            json!({"name": "Mike", "pet": "Tucson"}),
            json!({"name": "Bob", "pet": "Izzie"}),
        ];

        let result = hash_merge_array(&values, &HashMergeArrayOptions::default()).unwrap();
        assert_eq!(
            result,
            json!({"name": ["Mike", "Bob"], "pet": ["Tucson", "Izzie"]})
        );
    }

    #[test]
    fn test_hash_merge_array_only_and_other() {
        let values = vec![
            json!({"name": "Mike", "pet": "Tucson"}),
            json!({"name": "Bob", "pet": "Trollface"}),
        ];

        let options = HashMergeArrayOptions {
            only: Some(KeySelector::keys(["pet"])),
            ..Default::default()
        };
        let result = hash_merge_array(&values, &options).unwrap();
        assert_eq!(result["name"], json!("Mike"));
        assert_eq!(result["pet"], json!(["Tucson", "Trollface"]));

        let options = HashMergeArrayOptions {
            only: Some(KeySelector::keys(["pet"])),
            other: Combiner::Last,
            ..Default::default()
        };
        let result = hash_merge_array(&values, &options).unwrap();
        assert_eq!(result["name"], json!("Bob"));
    }

    #[test]
    fn test_hash_merge_array_except_predicate() {
        let values = vec![
            json!({"name": "Mike", "pet": "Tucson"}),
            json!({"name": "Mike", "pet": "Izzie", "car": "Dodge"}),
        ];

        let options = HashMergeArrayOptions {
            except: Some(KeySelector::predicate(|k| k == "name")),
            combiner: Combiner::array().unique().singular(),
            ..Default::default()
        };
        let result = hash_merge_array(&values, &options).unwrap();
        assert_eq!(result["name"], json!("Mike"));
        assert_eq!(result["pet"], json!(["Tucson", "Izzie"]));
        assert_eq!(result["car"], json!("Dodge"));
    }

    #[test]
    fn test_hash_merge_array_single_value_unchanged() {
        let values = vec![json!({"name": "Mike"})];
        let result = hash_merge_array(&values, &HashMergeArrayOptions::default()).unwrap();
        assert_eq!(result, json!([{"name": "Mike"}]));
    }

    #[test]
    fn test_literal() {
        let values = list(json!(["I", "am", "awesome"]));
        assert_eq!(Combiner::literal("x").reduce(&values).unwrap(), json!("x"));
        assert_eq!(Combiner::literal(json!([])).reduce(&values).unwrap(), json!([]));
    }

    #[test]
    fn test_validate_required_options() {
        assert!(matches!(
            Combiner::Nth { index: None }.validate(),
            Err(RuleError::MissingOption { .. })
        ));
        assert!(matches!(
            Combiner::Literal { value: None }.validate(),
            Err(RuleError::MissingOption { .. })
        ));

        let conflicting = Combiner::hash_merge_array(HashMergeArrayOptions {
            only: Some(KeySelector::keys(["a"])),
            except: Some(KeySelector::keys(["b"])),
            ..Default::default()
        });
        assert!(matches!(
            conflicting.validate(),
            Err(RuleError::ConflictingOptions)
        ));
    }

    #[test]
    fn test_from_name() {
        let options = json!({"unique": true});
        let combiner = Combiner::from_name("array", options.as_object().unwrap()).unwrap();
        assert_eq!(
            combiner.reduce(&list(json!(["Mike", "Tucson", "Tucson"]))).unwrap(),
            json!(["Mike", "Tucson"])
        );

        let combiner = Combiner::from_name("smart_key", &Map::new()).unwrap();
        assert_eq!(
            combiner.reduce(&list(json!(["ticket.create", "ticket.close"]))).unwrap(),
            json!("ticket.close_create")
        );

        let options = json!({"method": "merge"});
        let combiner = Combiner::from_name("hash_merge", options.as_object().unwrap()).unwrap();
        assert!(matches!(
            combiner,
            Combiner::HashMerge {
                order: MergeOrder::RightWins
            }
        ));
    }

    #[test]
    fn test_from_name_errors() {
        assert!(matches!(
            Combiner::from_name("nth", &Map::new()),
            Err(RuleError::MissingOption { .. })
        ));
        assert!(matches!(
            Combiner::from_name("literal", &Map::new()),
            Err(RuleError::MissingOption { .. })
        ));
        assert!(matches!(
            Combiner::from_name("median", &Map::new()),
            Err(RuleError::UnknownCombiner(_))
        ));

        let options = json!({"only": "pet", "except": ["name"]});
        assert!(matches!(
            Combiner::from_name("hash_merge_array", options.as_object().unwrap()),
            Err(RuleError::ConflictingOptions)
        ));

        let options = json!({"uniq": true});
        assert!(matches!(
            Combiner::from_name("array", options.as_object().unwrap()),
            Err(RuleError::ParseError(_))
        ));
    }

    #[test]
    fn test_from_name_nth_index() {
        let options = json!({"index": 1});
        let combiner = Combiner::from_name("nth", options.as_object().unwrap()).unwrap();
        assert_eq!(combiner.reduce(&[json!("a"), json!("b")]).unwrap(), json!("b"));

        let options = json!({"index": -1});
        assert!(matches!(
            Combiner::from_name("nth", options.as_object().unwrap()),
            Err(RuleError::TypeMismatch { .. })
        ));
    }

    #[cfg(target_pointer_width = "32")]
    #[test]
    fn test_from_name_nth_index_out_of_range() {
        let options = json!({"index": u64::MAX});
        assert!(matches!(
            Combiner::from_name("nth", options.as_object().unwrap()),
            Err(RuleError::ParseError(_))
        ));
    }

    #[test]
    fn test_from_name_nested_hash_merge_array() {
        let options = json!({
            "only": ["pet"],
            "combiner": "array",
            "combiner_options": {"unique": true},
            "other": "last"
        });
        let combiner = Combiner::from_name("hash_merge_array", options.as_object().unwrap()).unwrap();

        let values = vec![
            json!({"name": "Mike", "pet": "Tucson"}),
            json!({"name": "Bob", "pet": "Tucson"}),
        ];
        assert_eq!(
            combiner.reduce(&values).unwrap(),
            json!({"name": "Bob", "pet": ["Tucson"]})
        );
    }

    #[test]
    fn test_custom_reducer() {
        let reducer = Reducer::custom(|values| {
            let mut reversed = values.to_vec();
            reversed.reverse();
            Ok(Value::Array(reversed))
        });

        assert_eq!(
            reducer.reduce(&list(json!(["A", "B"]))).unwrap(),
            json!(["B", "A"])
        );
    }
}
