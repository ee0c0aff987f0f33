//! 分组驱动器
//!
//! 逐条拉取输入记录，按声明顺序用规则测试当前批次；首个匹配的规则把候选
//! 并入批次，无规则匹配时结束当前批次并以候选开启新批次。输出是惰性的，
//! 每个结束的批次产出一个替身记录。

use crate::batch::Batch;
use crate::error::{Result, RuleError};
use crate::record::Record;
use crate::rule::Rule;
use crate::standin::Standin;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::{debug, trace};

/// 批次初始化钩子，每开启一个批次调用一次
pub type ConfigureFn<R> = Arc<dyn Fn(&mut Batch<R>) + Send + Sync>;

pub struct Grouper<R> {
    rules: Vec<Rule<R>>,
    enabled: bool,
    configure: Option<ConfigureFn<R>>,
}

impl<R> Clone for Grouper<R> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            enabled: self.enabled,
            configure: self.configure.clone(),
        }
    }
}

impl<R> fmt::Debug for Grouper<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grouper")
            .field("rules", &self.rules)
            .field("enabled", &self.enabled)
            .field("configure", &self.configure.is_some())
            .finish()
    }
}

impl<R: Record> Grouper<R> {
    /// 规则名称必须唯一
    pub fn new(rules: Vec<Rule<R>>, enabled: bool) -> Result<Self> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if !seen.insert(rule.name()) {
                return Err(RuleError::DuplicateRuleName(rule.name().to_string()));
            }
        }

        Ok(Self {
            rules,
            enabled,
            configure: None,
        })
    }

    pub fn builder() -> GrouperBuilder<R> {
        GrouperBuilder::default()
    }

    pub fn rules(&self) -> &[Rule<R>] {
        &self.rules
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// 设置批次初始化钩子，可用于预置锁或合并器
    pub fn configure_batch(&mut self, f: impl Fn(&mut Batch<R>) + Send + Sync + 'static) {
        self.configure = Some(Arc::new(f));
    }

    /// 对输入序列分组，返回惰性输出迭代器
    ///
    /// 每次调用的可变状态都只属于返回的迭代器，同一个分组器可以同时驱动多个序列。
    pub fn each<I>(&self, input: I) -> Coalesce<'_, R, I::IntoIter>
    where
        I: IntoIterator<Item = R>,
    {
        Coalesce {
            rules: &self.rules,
            enabled: self.enabled,
            configure: self.configure.as_deref(),
            input: input.into_iter(),
            batch: None,
            done: false,
        }
    }

    /// 一次性收集全部输出
    pub fn group<I>(&self, input: I) -> Result<Vec<Emitted<R>>>
    where
        I: IntoIterator<Item = R>,
    {
        self.each(input).collect()
    }
}

/// 分组器构建器
pub struct GrouperBuilder<R> {
    rules: Vec<Rule<R>>,
    enabled: bool,
    configure: Option<ConfigureFn<R>>,
}

impl<R> Default for GrouperBuilder<R> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            enabled: true,
            configure: None,
        }
    }
}

impl<R: Record> GrouperBuilder<R> {
    pub fn rule(mut self, rule: Rule<R>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn configure_batch(mut self, f: impl Fn(&mut Batch<R>) + Send + Sync + 'static) -> Self {
        self.configure = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Result<Grouper<R>> {
        let mut grouper = Grouper::new(self.rules, self.enabled)?;
        grouper.configure = self.configure;
        Ok(grouper)
    }
}

/// 分组器输出
///
/// 分组器禁用时原样输出输入记录，启用时每个元素都是替身记录。
#[derive(Debug)]
pub enum Emitted<R> {
    Record(R),
    Standin(Standin<R>),
}

impl<R: Record> Emitted<R> {
    pub fn is_standin(&self) -> bool {
        matches!(self, Self::Standin(_))
    }

    pub fn as_standin(&self) -> Option<&Standin<R>> {
        match self {
            Self::Standin(standin) => Some(standin),
            Self::Record(_) => None,
        }
    }

    pub fn into_standin(self) -> Option<Standin<R>> {
        match self {
            Self::Standin(standin) => Some(standin),
            Self::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&R> {
        match self {
            Self::Record(record) => Some(record),
            Self::Standin(_) => None,
        }
    }
}

impl<R: Record> Record for Emitted<R> {
    fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Record(record) => record.get(name),
            Self::Standin(standin) => standin.get(name),
        }
    }

    fn has(&self, name: &str) -> bool {
        match self {
            Self::Record(record) => record.has(name),
            Self::Standin(standin) => standin.has(name),
        }
    }
}

impl Emitted<Value> {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Record(record) => record.clone(),
            Self::Standin(standin) => standin.to_json(),
        }
    }
}

/// 惰性分组迭代器
///
/// 状态只有两种：无批次（尚未读到记录）与累积中（持有一个批次）。
/// 谓词或合并器出错时产出该错误，之后不再产出任何元素。
pub struct Coalesce<'a, R, I> {
    rules: &'a [Rule<R>],
    enabled: bool,
    configure: Option<&'a (dyn Fn(&mut Batch<R>) + Send + Sync)>,
    input: I,
    batch: Option<Batch<R>>,
    done: bool,
}

impl<R: Record, I: Iterator<Item = R>> Coalesce<'_, R, I> {
    fn finish(&mut self, batch: Batch<R>) -> Result<Emitted<R>> {
        let result = batch.finalize().map(Emitted::Standin);
        if result.is_err() {
            self.done = true;
        }
        result
    }

    fn open(&self, prototype: R) -> Batch<R> {
        let mut batch = Batch::new(prototype);
        if let Some(configure) = self.configure {
            configure(&mut batch);
        }
        batch
    }

    fn abort(&mut self, err: RuleError) -> Option<Result<Emitted<R>>> {
        self.done = true;
        self.batch = None;
        Some(Err(err))
    }
}

/// 按声明顺序返回第一个匹配的规则
fn first_match<'r, R: Record>(
    rules: &'r [Rule<R>],
    batch: &Batch<R>,
    candidate: &R,
) -> Result<Option<&'r Rule<R>>> {
    for rule in rules {
        if rule.matches(batch, candidate)? {
            return Ok(Some(rule));
        }
    }
    Ok(None)
}

impl<R: Record, I: Iterator<Item = R>> Iterator for Coalesce<'_, R, I> {
    type Item = Result<Emitted<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.enabled {
            let next = self.input.next();
            if next.is_none() {
                self.done = true;
            }
            return next.map(|record| Ok(Emitted::Record(record)));
        }

        let rules = self.rules;
        loop {
            let Some(candidate) = self.input.next() else {
                self.done = true;
                let batch = self.batch.take()?;
                return Some(self.finish(batch));
            };

            let Some(batch) = self.batch.as_mut() else {
                debug!("开启新批次");
                let opened = self.open(candidate);
                self.batch = Some(opened);
                continue;
            };

            match first_match(rules, batch, &candidate) {
                Ok(Some(rule)) => {
                    trace!(rule = %rule.name(), objects = batch.len() + 1, "候选并入批次");
                    rule.apply(batch, candidate);
                }
                Ok(None) => {
                    debug!("无规则匹配，结束当前批次并开启新批次");
                    let opened = self.open(candidate);
                    let finished = self.batch.replace(opened);
                    if let Some(finished) = finished {
                        return Some(self.finish(finished));
                    }
                }
                Err(err) => return self.abort(err),
            }
        }
    }
}

impl<R: Record, I: Iterator<Item = R>> FusedIterator for Coalesce<'_, R, I> {}
