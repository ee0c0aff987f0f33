//! 批次累加器
//!
//! 一个批次对应一个进行中的分组：原型记录、已接纳的记录、当前锁集合、
//! 已激活的合并器绑定，以及已生效过的规则名称。

use crate::combiner::CombinerBinding;
use crate::error::Result;
use crate::record::Record;
use crate::standin::Standin;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug)]
pub struct Batch<R> {
    /// 第一个元素即原型，永不为空
    objects: Vec<R>,
    /// 为空表示所有规则均可参与匹配
    locks: BTreeSet<String>,
    /// 按属性去重，只增不减
    active_combiners: Vec<CombinerBinding>,
    /// 按首次匹配顺序记录
    matched_rules: Vec<String>,
}

impl<R: Record> Batch<R> {
    pub fn new(prototype: R) -> Self {
        Self {
            objects: vec![prototype],
            locks: BTreeSet::new(),
            active_combiners: Vec::new(),
            matched_rules: Vec::new(),
        }
    }

    pub fn prototype(&self) -> &R {
        &self.objects[0]
    }

    pub fn first(&self) -> &R {
        self.prototype()
    }

    pub fn last(&self) -> &R {
        // objects 至少包含原型
        &self.objects[self.objects.len() - 1]
    }

    pub fn objects(&self) -> &[R] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// 批次至少包含原型，恒为 false
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn add_object(&mut self, object: R) {
        self.objects.push(object);
    }

    pub fn locks(&self) -> &BTreeSet<String> {
        &self.locks
    }

    pub fn is_locked(&self) -> bool {
        !self.locks.is_empty()
    }

    pub fn lock(&mut self, rule_name: impl Into<String>) {
        self.locks.insert(rule_name.into());
    }

    pub fn unlock(&mut self, rule_name: &str) {
        self.locks.remove(rule_name);
    }

    pub fn active_combiners(&self) -> &[CombinerBinding] {
        &self.active_combiners
    }

    /// 激活合并器绑定；同一属性先注册者生效，返回是否新增
    pub fn add_combiner(&mut self, binding: CombinerBinding) -> bool {
        if self
            .active_combiners
            .iter()
            .any(|active| active.attribute == binding.attribute)
        {
            return false;
        }
        self.active_combiners.push(binding);
        true
    }

    pub fn matched_rules(&self) -> &[String] {
        &self.matched_rules
    }

    pub fn has_matched(&self, rule_name: &str) -> bool {
        self.matched_rules.iter().any(|name| name == rule_name)
    }

    /// 记录规则已生效，返回是否为首次
    pub(crate) fn mark_matched(&mut self, rule_name: &str) -> bool {
        if self.has_matched(rule_name) {
            return false;
        }
        self.matched_rules.push(rule_name.to_string());
        true
    }

    /// 结束批次，按已激活的合并器归约各属性并生成替身记录
    pub fn finalize(self) -> Result<Standin<R>> {
        let mut combined = Map::new();

        for binding in &self.active_combiners {
            let values: Vec<Value> = if binding.compact {
                self.objects
                    .iter()
                    .filter_map(|object| object.get(&binding.attribute).cloned())
                    .collect()
            } else {
                self.objects
                    .iter()
                    .map(|object| object.get(&binding.attribute).cloned().unwrap_or(Value::Null))
                    .collect()
            };

            let reduced = binding.reducer.reduce(&values)?;
            combined.insert(binding.attribute.clone(), reduced);
        }

        debug!(
            objects = self.objects.len(),
            matched_rules = ?self.matched_rules,
            combined = ?combined.keys().collect::<Vec<_>>(),
            "批次已结束"
        );

        Ok(Standin::new(self, combined))
    }
}
