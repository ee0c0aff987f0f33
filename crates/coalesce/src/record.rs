//! 记录访问能力
//!
//! 引擎不关心记录的存储模型，只通过 [`Record`] 读取具名属性。
//! 属性缺失不是错误：`has` 用于判断存在性，`get` 返回 `None`。

use serde_json::{Map, Value};

/// 具名属性访问接口
pub trait Record {
    /// 读取属性值，属性不存在时返回 `None`
    fn get(&self, name: &str) -> Option<&Value>;

    /// 属性是否存在（值为 `null` 也视为存在）
    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl Record for Map<String, Value> {
    fn get(&self, name: &str) -> Option<&Value> {
        Map::get(self, name)
    }

    fn has(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

/// 只有 JSON 对象拥有属性，其他类型的值一律视为无属性
impl Record for Value {
    fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(name),
            _ => None,
        }
    }
}

impl<T: Record + ?Sized> Record for &T {
    fn get(&self, name: &str) -> Option<&Value> {
        (**self).get(name)
    }

    fn has(&self, name: &str) -> bool {
        (**self).has(name)
    }
}

impl<T: Record + ?Sized> Record for Box<T> {
    fn get(&self, name: &str) -> Option<&Value> {
        (**self).get(name)
    }

    fn has(&self, name: &str) -> bool {
        (**self).has(name)
    }
}
