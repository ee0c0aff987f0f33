//! 合并规则
//!
//! 规则由一组谓词（全部满足才匹配）、锁定/解锁指令与合并器绑定构成，
//! 通过 [`RuleBuilder`] 构建后不可变。

use crate::batch::Batch;
use crate::combiner::{CombinerBinding, Reducer};
use crate::error::{Result, RuleError};
use crate::predicate::{self, PredicateFn, ReferencePoint, SameMode};
use crate::record::Record;
use chrono::TimeDelta;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct Rule<R> {
    name: String,
    predicates: Vec<PredicateFn<R>>,
    locks: Vec<String>,
    unlocks: Vec<String>,
    combiners: Vec<CombinerBinding>,
}

impl<R> Clone for Rule<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            predicates: self.predicates.clone(),
            locks: self.locks.clone(),
            unlocks: self.unlocks.clone(),
            combiners: self.combiners.clone(),
        }
    }
}

impl<R> fmt::Debug for Rule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("predicates", &self.predicates.len())
            .field("locks", &self.locks)
            .field("unlocks", &self.unlocks)
            .field("combiners", &self.combiners)
            .finish()
    }
}

impl<R: Record + 'static> Rule<R> {
    pub fn builder(name: impl Into<String>) -> RuleBuilder<R> {
        RuleBuilder::new(name)
    }
}

impl<R: Record> Rule<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    pub fn locks(&self) -> &[String] {
        &self.locks
    }

    pub fn unlocks(&self) -> &[String] {
        &self.unlocks
    }

    pub fn combiners(&self) -> &[CombinerBinding] {
        &self.combiners
    }

    /// 候选能否由本规则并入批次
    ///
    /// 批次已锁定且锁集合不含本规则时直接返回 false，否则按声明顺序
    /// 短路求值所有谓词。
    pub fn matches(&self, batch: &Batch<R>, candidate: &R) -> Result<bool> {
        if batch.is_locked() && !batch.locks().contains(&self.name) {
            return Ok(false);
        }

        for predicate in &self.predicates {
            if !predicate(batch, candidate)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// 将候选并入批次
    ///
    /// 锁定、解锁与合并器激活在每个批次中只生效一次；候选本身每次都会追加。
    pub fn apply(&self, batch: &mut Batch<R>, candidate: R) {
        if batch.mark_matched(&self.name) {
            for name in &self.locks {
                batch.lock(name.clone());
            }
            for name in &self.unlocks {
                batch.unlock(name);
            }
            for binding in &self.combiners {
                batch.add_combiner(binding.clone());
            }

            debug!(rule = %self.name, locks = ?batch.locks(), "规则首次生效");
        }

        batch.add_object(candidate);
    }
}

/// 规则构建器
///
/// 配置错误在 [`RuleBuilder::build`] 时统一返回。
pub struct RuleBuilder<R> {
    name: String,
    predicates: Vec<PredicateFn<R>>,
    locks: Vec<String>,
    unlocks: Vec<String>,
    combiners: Vec<CombinerBinding>,
    error: Option<RuleError>,
}

impl<R: Record + 'static> RuleBuilder<R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            predicates: Vec::new(),
            locks: Vec::new(),
            unlocks: Vec::new(),
            combiners: Vec::new(),
            error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 自定义谓词，与其他谓词按 AND 组合
    pub fn predicate(
        self,
        f: impl Fn(&Batch<R>, &R) -> Result<bool> + Send + Sync + 'static,
    ) -> Self {
        self.push_predicate(Arc::new(f))
    }

    pub fn attr_in<I, V>(self, attr: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push_predicate(predicate::attr_in(attr.into(), values))
    }

    /// `attr_in("key", values)` 加上 `same_as(["key"], SameMode::All)`
    pub fn key<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.key_as(values, SameMode::All)
    }

    pub fn key_as<I, V>(self, values: I, mode: SameMode) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.attr_in("key", values).same_as(["key"], mode)
    }

    pub fn same<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.same_as(keys, SameMode::All)
    }

    /// 每个键生成一个谓词
    pub fn same_as<I, S>(mut self, keys: I, mode: SameMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            self = self.push_predicate(predicate::same(key.into(), mode));
        }
        self
    }

    /// 与批次第一个成员的 `created_at` 比较
    pub fn time_delta(self, delta: TimeDelta) -> Self {
        self.time_delta_from(delta, ReferencePoint::First, "created_at")
    }

    pub fn time_delta_from(
        self,
        delta: TimeDelta,
        from: ReferencePoint,
        attr: impl Into<String>,
    ) -> Self {
        self.push_predicate(predicate::time_delta(delta, from, attr.into()))
    }

    pub fn batch_key<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push_predicate(predicate::batch_key(values))
    }

    pub fn attr_matches(mut self, attr: impl Into<String>, pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(regex) => self.push_predicate(predicate::attr_matches(attr.into(), regex)),
            Err(e) => {
                let err = RuleError::ParseError(format!("正则表达式无效 '{}': {}", pattern, e));
                self.fail(err);
                self
            }
        }
    }

    /// 锁定到指定规则；名称为空时锁定到本规则。锁定是累加的。
    pub fn lock<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = self.names_or_self(names);
        self.locks.extend(names);
        self
    }

    pub fn lock_self(self) -> Self {
        self.lock(std::iter::empty::<String>())
    }

    /// 解锁指定规则；名称为空时解锁本规则
    pub fn unlock<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = self.names_or_self(names);
        self.unlocks.extend(names);
        self
    }

    pub fn unlock_self(self) -> Self {
        self.unlock(std::iter::empty::<String>())
    }

    /// 为每个属性注册一个合并器绑定
    pub fn combine<I, S>(mut self, attrs: I, reducer: impl Into<Reducer>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let reducer = reducer.into();
        for attr in attrs {
            self = self.combine_binding(CombinerBinding::new(attr, reducer.clone()));
        }
        self
    }

    /// 注册单个绑定（可关闭缺失值过滤）
    pub fn combine_binding(mut self, binding: CombinerBinding) -> Self {
        if self
            .combiners
            .iter()
            .any(|existing| existing.attribute == binding.attribute)
        {
            let err = RuleError::DuplicateCombiner {
                rule: self.name.clone(),
                attribute: binding.attribute,
            };
            self.fail(err);
            return self;
        }

        self.combiners.push(binding);
        self
    }

    pub fn build(self) -> Result<Rule<R>> {
        if let Some(err) = self.error {
            return Err(err);
        }

        for binding in &self.combiners {
            binding.reducer.validate()?;
        }

        Ok(Rule {
            name: self.name,
            predicates: self.predicates,
            locks: self.locks,
            unlocks: self.unlocks,
            combiners: self.combiners,
        })
    }

    fn push_predicate(mut self, predicate: PredicateFn<R>) -> Self {
        self.predicates.push(predicate);
        self
    }

    fn names_or_self<I, S>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            vec![self.name.clone()]
        } else {
            names
        }
    }

    /// 只保留第一个配置错误
    fn fail(&mut self, err: RuleError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
