//! 规则谓词
//!
//! 谓词接收 `(批次, 候选记录)`，返回候选能否并入批次。
//! 候选或成员缺少相关属性时谓词为 false，不视为错误。

use crate::batch::Batch;
use crate::error::{Result, RuleError};
use crate::record::Record;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// 谓词函数
pub type PredicateFn<R> = Arc<dyn Fn(&Batch<R>, &R) -> Result<bool> + Send + Sync>;

/// `same` 的比较方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameMode {
    /// 与批次中每个成员相等
    #[default]
    All,
    /// 与批次中任一成员相等
    Any,
    /// 与第一个成员相等
    First,
    /// 与最后一个成员相等
    Last,
}

impl FromStr for SameMode {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "any" => Ok(Self::Any),
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            other => Err(RuleError::InvalidSameMode(other.to_string())),
        }
    }
}

impl fmt::Display for SameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::Any => "any",
            Self::First => "first",
            Self::Last => "last",
        };
        write!(f, "{}", s)
    }
}

/// `time_delta` 的参照成员
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePoint {
    /// 与批次第一个成员比较（固定窗口）
    #[default]
    First,
    /// 与批次最后一个成员比较（滑动窗口）
    Last,
}

impl FromStr for ReferencePoint {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            other => Err(RuleError::InvalidReference(other.to_string())),
        }
    }
}

/// 候选拥有 `attr` 且取值在 `values` 中
pub fn attr_in<R: Record + 'static>(attr: String, values: Vec<Value>) -> PredicateFn<R> {
    Arc::new(move |_batch: &Batch<R>, candidate: &R| -> Result<bool> {
        Ok(candidate
            .get(&attr)
            .is_some_and(|value| values.contains(value)))
    })
}

/// 按 `mode` 比较候选与批次成员在 `key` 上的取值
pub fn same<R: Record + 'static>(key: String, mode: SameMode) -> PredicateFn<R> {
    Arc::new(move |batch: &Batch<R>, candidate: &R| -> Result<bool> {
        let Some(expected) = candidate.get(&key) else {
            return Ok(false);
        };
        let eq = |object: &R| object.get(&key) == Some(expected);

        Ok(match mode {
            SameMode::All => batch.objects().iter().all(eq),
            SameMode::Any => batch.objects().iter().any(eq),
            SameMode::First => eq(batch.first()),
            SameMode::Last => eq(batch.last()),
        })
    })
}

/// 候选时间戳与参照成员时间戳之差不超过 `delta`
pub fn time_delta<R: Record + 'static>(
    delta: TimeDelta,
    from: ReferencePoint,
    attr: String,
) -> PredicateFn<R> {
    Arc::new(move |batch: &Batch<R>, candidate: &R| -> Result<bool> {
        let reference = match from {
            ReferencePoint::First => batch.first(),
            ReferencePoint::Last => batch.last(),
        };

        let (Some(candidate_ts), Some(reference_ts)) = (candidate.get(&attr), reference.get(&attr))
        else {
            return Ok(false);
        };

        Ok(timestamp(candidate_ts)? - timestamp(reference_ts)? <= delta)
    })
}

/// 批次原型的 `key` 属性在 `values` 中
pub fn batch_key<R: Record + 'static>(values: Vec<Value>) -> PredicateFn<R> {
    Arc::new(move |batch: &Batch<R>, _candidate: &R| -> Result<bool> {
        Ok(batch
            .prototype()
            .get("key")
            .is_some_and(|key| values.contains(key)))
    })
}

/// 候选的字符串属性匹配正则表达式
pub fn attr_matches<R: Record + 'static>(attr: String, pattern: Regex) -> PredicateFn<R> {
    Arc::new(move |_batch: &Batch<R>, candidate: &R| -> Result<bool> {
        Ok(candidate
            .get(&attr)
            .and_then(Value::as_str)
            .is_some_and(|s| pattern.is_match(s)))
    })
}

/// 解析时间戳：RFC 3339 字符串、纯日期字符串或 Unix 秒数
pub fn timestamp(value: &Value) -> Result<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Ok(dt.with_timezone(&Utc));
            }

            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Ok(date.and_time(NaiveTime::default()).and_utc());
            }

            Err(RuleError::ParseError(format!("无法解析日期时间: '{}'", s)))
        }
        Value::Number(n) => {
            let parsed = if let Some(secs) = n.as_i64() {
                DateTime::<Utc>::from_timestamp(secs, 0)
            } else {
                n.as_f64().and_then(|secs| {
                    DateTime::<Utc>::from_timestamp(secs.floor() as i64, (secs.fract().abs() * 1e9) as u32)
                })
            };

            parsed.ok_or_else(|| RuleError::ParseError(format!("时间戳超出范围: {}", n)))
        }
        other => Err(RuleError::type_mismatch("timestamp", other)),
    }
}
