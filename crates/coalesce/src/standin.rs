//! 替身记录
//!
//! 包装批次原型，读取属性时优先返回合并结果，否则回落到原型本身。
//! 原型不会被复制，下游持久层依赖的标识字段因此得以保留。

use crate::batch::Batch;
use crate::record::Record;
use serde_json::{Map, Value};

#[derive(Debug)]
pub struct Standin<R> {
    batch: Batch<R>,
    combined: Map<String, Value>,
}

impl<R: Record> Standin<R> {
    pub(crate) fn new(batch: Batch<R>, combined: Map<String, Value>) -> Self {
        Self { batch, combined }
    }

    pub fn prototype(&self) -> &R {
        self.batch.prototype()
    }

    /// 是否存在任何合并属性
    pub fn is_combined(&self) -> bool {
        !self.combined.is_empty()
    }

    /// 指定属性是否由合并器产生
    pub fn is_combined_attr(&self, attr: &str) -> bool {
        self.combined.contains_key(attr)
    }

    pub fn combined_attributes(&self) -> &Map<String, Value> {
        &self.combined
    }

    /// 所属批次，用于诊断（例如查看匹配过的规则）
    pub fn batch(&self) -> &Batch<R> {
        &self.batch
    }

    /// 拆出批次与合并结果
    pub fn into_parts(self) -> (Batch<R>, Map<String, Value>) {
        (self.batch, self.combined)
    }
}

impl<R: Record> Record for Standin<R> {
    fn get(&self, name: &str) -> Option<&Value> {
        self.combined
            .get(name)
            .or_else(|| self.batch.prototype().get(name))
    }

    fn has(&self, name: &str) -> bool {
        self.combined.contains_key(name) || self.batch.prototype().has(name)
    }
}

impl Standin<Value> {
    /// 渲染为 JSON：原型对象叠加合并属性
    pub fn to_json(&self) -> Value {
        let mut rendered = match self.prototype() {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        for (k, v) in &self.combined {
            rendered.insert(k.clone(), v.clone());
        }

        Value::Object(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combiner::{Combiner, CombinerBinding};
    use serde_json::json;

    /// 克隆时会清空 id 与时间戳的记录，模拟某些 ORM 的行为
    #[derive(Debug)]
    struct OrmLikeRecord {
        attributes: Map<String, Value>,
    }

    impl Clone for OrmLikeRecord {
        fn clone(&self) -> Self {
            let mut attributes = self.attributes.clone();
            attributes.remove("id");
            attributes.remove("created_at");
            Self { attributes }
        }
    }

    impl Record for OrmLikeRecord {
        fn get(&self, name: &str) -> Option<&Value> {
            self.attributes.get(name)
        }
    }

    #[test]
    fn test_standin_preserves_prototype() {
        let attributes = json!({"id": 5, "created_at": "2024-01-15T10:00:00Z", "name": "Bob"});
        let record = OrmLikeRecord {
            attributes: attributes.as_object().unwrap().clone(),
        };
        assert!(!record.clone().has("id"));

        let standin = Batch::new(record).finalize().unwrap();

        assert_eq!(standin.get("id"), Some(&json!(5)));
        assert_eq!(standin.get("created_at"), Some(&json!("2024-01-15T10:00:00Z")));
        assert!(!standin.is_combined());
    }

    #[test]
    fn test_read_through() {
        let mut batch = Batch::new(json!({"key": "ticket.close", "ticket": 1, "owner": "Mike"}));
        batch.add_object(json!({"key": "ticket.comment", "ticket": 1, "owner": "Mike"}));
        batch.add_combiner(CombinerBinding::new("key", Combiner::SmartKey));
        batch.add_combiner(CombinerBinding::new("owner", Combiner::array()));

        let standin = batch.finalize().unwrap();

        assert!(standin.is_combined());
        assert!(standin.is_combined_attr("key"));
        assert!(standin.is_combined_attr("owner"));
        assert!(!standin.is_combined_attr("ticket"));

        assert_eq!(standin.get("key"), Some(&json!("ticket.close_comment")));
        assert_eq!(standin.get("owner"), Some(&json!(["Mike", "Mike"])));
        assert_eq!(standin.get("ticket"), Some(&json!(1)));
        assert!(!standin.has("missing"));
        assert_eq!(standin.batch().len(), 2);
    }

    #[test]
    fn test_to_json_overlays_combined() {
        let mut batch = Batch::new(json!({"id": 1, "recipient": "Joe"}));
        batch.add_object(json!({"id": 1, "recipient": "Matt"}));
        batch.add_combiner(CombinerBinding::new("recipient", Combiner::array()));

        let standin = batch.finalize().unwrap();
        assert_eq!(
            standin.to_json(),
            json!({"id": 1, "recipient": ["Joe", "Matt"]})
        );
        assert_eq!(standin.prototype(), &json!({"id": 1, "recipient": "Joe"}));
    }
}
