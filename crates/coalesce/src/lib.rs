//! 事件流合并引擎
//!
//! 按声明的规则把有序事件流中相邻且相关的记录合并为一条记录：
//! - 规则定义（谓词、锁定、合并器绑定）与 JSON 编译
//! - 批次累加与合并器归约
//! - 惰性单遍分组驱动
//! - 替身记录输出

pub mod batch;
pub mod combiner;
pub mod compiler;
pub mod error;
pub mod grouper;
pub mod predicate;
pub mod record;
pub mod rule;
pub mod standin;

pub use batch::Batch;
pub use combiner::{Combiner, CombinerBinding, HashMergeArrayOptions, KeySelector, MergeOrder, Reducer};
pub use compiler::{
    compile_from_json, compile_grouper, compile_rule, CombineDefinition, GrouperDefinition,
    PredicateDefinition, RuleDefinition,
};
pub use error::{Result, RuleError};
pub use grouper::{Coalesce, ConfigureFn, Emitted, Grouper, GrouperBuilder};
pub use predicate::{ReferencePoint, SameMode};
pub use record::Record;
pub use rule::{Rule, RuleBuilder};
pub use standin::Standin;
